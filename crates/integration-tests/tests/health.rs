//! Integration tests for health checks, request IDs, fallbacks, and store faults.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::json;

use bakeapi_api::db::{ProductStore, RepositoryError};
use bakeapi_api::models::{NewProduct, Product, ProductChanges};
use bakeapi_core::{Price, ProductId, UserId};
use bakeapi_integration_tests::TestContext;

/// A product store whose backing database is gone.
struct ClosedStore;

fn closed() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolClosed)
}

#[async_trait]
impl ProductStore for ClosedStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Err(closed())
    }

    async fn get(&self, _id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Err(closed())
    }

    async fn list_by_owner(&self, _owner: UserId) -> Result<Vec<Product>, RepositoryError> {
        Err(closed())
    }

    async fn insert(
        &self,
        _owner: UserId,
        _product: &NewProduct,
        _created_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError> {
        Err(closed())
    }

    async fn update(
        &self,
        _id: ProductId,
        _changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        Err(closed())
    }

    async fn delete(&self, _id: ProductId) -> Result<bool, RepositoryError> {
        Err(closed())
    }

    async fn list_discount_eligible(
        &self,
        _owner: UserId,
        _cutoff: DateTime<Utc>,
    ) -> Result<Vec<Product>, RepositoryError> {
        Err(closed())
    }

    async fn mark_unsold(&self, _id: ProductId, _price: Price) -> Result<bool, RepositoryError> {
        Err(closed())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(closed())
    }
}

fn closed_context() -> TestContext {
    TestContext::with_product_store(Arc::new(ClosedStore))
}

// =============================================================================
// Health Checks
// =============================================================================

#[tokio::test]
async fn test_liveness() {
    let ctx = TestContext::new();

    let res = ctx.get("/health").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "ok");
}

#[tokio::test]
async fn test_readiness() {
    let ctx = TestContext::new();
    assert_eq!(ctx.get("/health/ready").await.status, StatusCode::OK);

    let ctx = closed_context();
    assert_eq!(
        ctx.get("/health/ready").await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

// =============================================================================
// Request IDs and Fallback
// =============================================================================

#[tokio::test]
async fn test_responses_carry_request_id() {
    let ctx = TestContext::new();

    let ok = ctx.get("/api").await;
    let missing = ctx.get("/api/products/42").await;

    assert!(ok.headers.contains_key("x-request-id"));
    assert!(missing.headers.contains_key("x-request-id"));
    assert_ne!(
        ok.headers["x-request-id"],
        missing.headers["x-request-id"]
    );
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let ctx = TestContext::new();

    let res = ctx.get("/api/bakeries").await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Not found");
}

#[tokio::test]
async fn test_unsupported_method_is_json_405() {
    let ctx = TestContext::new();

    let cases = [
        (Method::GET, "/api/products/user/status"),
        (Method::PATCH, "/api/products/1"),
        (Method::DELETE, "/api/products"),
        (Method::POST, "/health"),
    ];

    for (method, uri) in cases {
        let res = ctx.send(method.clone(), uri, None, None).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(
            res.headers["content-type"], "application/json",
            "{method} {uri}"
        );
        assert_eq!(res.error(), "Method not allowed", "{method} {uri}");
    }
}

// =============================================================================
// Store Faults
// =============================================================================

#[tokio::test]
async fn test_store_fault_is_reported_verbatim() {
    let ctx = closed_context();

    let res = ctx.get("/api/products").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.error(), sqlx::Error::PoolClosed.to_string());
}

#[tokio::test]
async fn test_store_fault_during_discount() {
    let ctx = closed_context();
    let paul = ctx.user("paul@example.com").await;
    let token = ctx.token(&paul);

    let res = ctx
        .send(
            Method::PUT,
            "/api/products/user/status",
            Some(&token),
            Some(json!({ "reductionRate": 25 })),
        )
        .await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.json()["error"].is_string());
}
