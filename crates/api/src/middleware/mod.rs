//! HTTP middleware and extractors for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//!
//! Authentication and ownership are enforced per route through extractors
//! rather than layers.

pub mod auth;
pub mod ownership;
pub mod request_id;

pub use auth::{AuthRejection, RequireAuth};
pub use ownership::{OwnedProduct, ProductPath, UserPath};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
