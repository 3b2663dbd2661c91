//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! All routes below are nested under `/api`.
//!
//! ```text
//! GET    /                       - Welcome message
//! GET    /protected              - Token probe (auth)
//!
//! # Auth
//! POST   /auth/login             - Exchange credentials for a bearer token
//!
//! # Products
//! GET    /products               - All products
//! POST   /products               - Create a product (auth)
//! GET    /products/{id}          - Product detail
//! PUT    /products/{id}          - Update a product (auth + owner)
//! DELETE /products/{id}          - Delete a product (auth + owner)
//! GET    /products/user/{user_id} - Products of one bakery
//! PUT    /products/user/status   - Mark down stale products (auth)
//! ```

pub mod auth;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(auth::login))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/user/status", put(products::discount))
        .route("/user/{user_id}", get(products::by_user))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/protected", get(home::protected))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
}
