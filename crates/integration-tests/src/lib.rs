//! Integration tests for BakeAPI.
//!
//! The tests drive the full axum router in-process over the in-memory store,
//! so no database or network listener is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bakeapi-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_api` - Login, token verification, index
//! - `products_api` - Product CRUD and ownership
//! - `discount_api` - Bulk unsold markdown
//! - `health` - Health checks, request IDs, store faults

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use bakeapi_api::config::{ApiConfig, StoreBackend};
use bakeapi_api::db::{MemoryStore, ProductStore, UserStore};
use bakeapi_api::models::{CurrentUser, NewProduct, Product, User};
use bakeapi_api::services::auth::hash_password;
use bakeapi_api::state::AppState;
use bakeapi_core::{Email, Price, ProductStatus};

/// Signing secret used by every test context.
pub const TEST_JWT_SECRET: &str = "q7Vf2LmZ9xR4tW8kN3bH6jD1sG5cY0pA";

/// Build an API configuration for the in-memory store.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        store: StoreBackend::Memory,
        database_url: None,
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        token_ttl_hours: 24,
        seed_file: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// The `error` field of a JSON error body.
    #[must_use]
    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap().to_owned()
    }

    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

/// A router wired to a fresh in-memory store.
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Create a context with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(&test_config(), store.clone(), store.clone());
        let app = bakeapi_api::app(state.clone());
        Self { app, state, store }
    }

    /// Create a context whose products live in `products`; users stay in memory.
    #[must_use]
    pub fn with_product_store(products: Arc<dyn ProductStore>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(&test_config(), products, store.clone());
        let app = bakeapi_api::app(state.clone());
        Self { app, state, store }
    }

    /// Insert a user with a placeholder hash; they cannot log in.
    pub async fn user(&self, email: &str) -> User {
        self.store
            .create_user(&Email::parse(email).unwrap(), "not-a-hash", Some("Test Bakery"))
            .await
            .unwrap()
    }

    /// Insert a user who can log in with `password`.
    pub async fn user_with_password(&self, email: &str, password: &str) -> User {
        let hash = hash_password(password).unwrap();
        self.store
            .create_user(&Email::parse(email).unwrap(), &hash, Some("Test Bakery"))
            .await
            .unwrap()
    }

    /// Issue a valid bearer token for `user`.
    #[must_use]
    pub fn token(&self, user: &User) -> String {
        self.state.tokens().issue(&CurrentUser::from(user)).unwrap()
    }

    /// Insert a product listed `age_hours` ago.
    pub async fn product(
        &self,
        owner: &User,
        name: &str,
        price: &str,
        status: ProductStatus,
        age_hours: i64,
    ) -> Product {
        let input = NewProduct::new(
            Some(name.to_owned()),
            Some(Price::new(price.parse::<Decimal>().unwrap()).unwrap()),
            Some(status),
        )
        .unwrap();
        self.store
            .insert(owner.id, &input, Utc::now() - Duration::hours(age_hours))
            .await
            .unwrap()
    }

    /// Send a request through the router.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send_request(builder.body(body).unwrap()).await
    }

    /// Send a prepared request through the router.
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET without authentication.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, None).await
    }
}
