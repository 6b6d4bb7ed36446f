//! Threadline API - AWS Lambda Runtime

use lambda_http::{run, Error};
use tower_http::trace::TraceLayer;
use tracing::info;

use threadline_app::{body_limit_layer, build_cors_layer, build_store, create_app};
use threadline_common::config::Config;
use threadline_conversations::ConversationsState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    info!("Initializing Threadline API Lambda");

    let config =
        Config::from_env().map_err(|e| Error::from(format!("Configuration error: {}", e)))?;

    let store = build_store(&config)
        .await
        .map_err(|e| Error::from(format!("Storage initialization error: {}", e)))?;

    let app = create_app(ConversationsState::new(store))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_allowed_origins))
        .layer(body_limit_layer());

    info!("Threadline API Lambda ready to serve requests");

    run(app).await
}
