//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::{ProductStore, UserStore};
use crate::services::auth::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configured stores and the token service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    products: Arc<dyn ProductStore>,
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration, read for the token settings
    /// * `products` - Product store implementation
    /// * `users` - User store implementation
    #[must_use]
    pub fn new(
        config: &ApiConfig,
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_hours);

        Self {
            inner: Arc::new(AppStateInner {
                products,
                users,
                tokens,
            }),
        }
    }

    /// Get the product store.
    #[must_use]
    pub fn products(&self) -> &dyn ProductStore {
        self.inner.products.as_ref()
    }

    /// Get the user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get the bearer token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
