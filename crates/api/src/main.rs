//! BakeAPI - Bakery marketplace HTTP API.
//!
//! This binary serves the JSON API on port 3000 by default.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - Bearer tokens (HS256 JWT) for authentication
//! - `PostgreSQL` via sqlx, or an in-memory store selected with
//!   `BAKEAPI_STORE=memory`
//!
//! # Migrations
//!
//! Migrations are NOT run on startup. Run them explicitly via:
//! `cargo run -p bakeapi-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use bakeapi_api::config::{ApiConfig, StoreBackend};
use bakeapi_api::db::{self, MemoryStore, PgStore, ProductStore, UserStore};
use bakeapi_api::fixtures;
use bakeapi_api::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ApiConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Open the configured store, returning it behind both store traits.
async fn open_store(
    config: &ApiConfig,
) -> Result<(Arc<dyn ProductStore>, Arc<dyn UserStore>), Box<dyn std::error::Error>> {
    match config.store {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_ref()
                .ok_or("BAKEAPI_DATABASE_URL not set")?;
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");

            let store = Arc::new(PgStore::new(pool));
            let products: Arc<dyn ProductStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            Ok((products, users))
        }
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            if let Some(path) = &config.seed_file {
                fixtures::load_file(store.as_ref(), store.as_ref(), path).await?;
            }
            tracing::warn!("Using in-memory store, data is lost on restart");

            let products: Arc<dyn ProductStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            Ok((products, users))
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ApiConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bakeapi_api=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let (products, users) = open_store(&config)
        .await
        .expect("Failed to open product store");

    let state = AppState::new(&config, products, users);

    let app = bakeapi_api::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("bakeapi listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
