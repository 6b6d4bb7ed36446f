//! Threadline application composition root
//!
//! Chooses the storage backend and composes the domain routers into a single application.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions};
use threadline_common::{Config, StorageBackend};
use threadline_conversations::{
    ConversationStore, ConversationsState, InMemoryConversationStore, PgConversationStore,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Embedded SQL migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Build the configured conversation store
pub async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn ConversationStore>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data will not survive a restart");
            Ok(Arc::new(InMemoryConversationStore::new()))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow!("DATABASE_URL is required for the postgres backend"))?;

            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .map_err(|e| anyhow!("Database connection failed: {}", e))?;

            info!("Database connection established");

            if config.run_migrations {
                MIGRATOR.run(&pool).await?;
                info!("Database migrations applied");
            }

            Ok(Arc::new(PgConversationStore::new(pool)))
        }
    }
}

/// Create the main application router with all routes
pub fn create_app(state: ConversationsState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(|| async { concat!("Threadline API v", env!("CARGO_PKG_VERSION")) }))
        .merge(threadline_conversations::routes().with_state(state))
}

/// CORS layer from a comma-separated origin list, or `*` for any origin
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Request body size limit
pub fn body_limit_layer() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_BODY_BYTES)
}

/// Health check endpoint
#[mutants::skip] // Static response
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
