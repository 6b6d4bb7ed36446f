// Threadline API - Local Development Server

use std::net::SocketAddr;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use threadline_app::{body_limit_layer, build_cors_layer, build_store, create_app};
use threadline_common::config::Config;
use threadline_conversations::ConversationsState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .pretty()
        .init();

    info!("Starting Threadline API local development server");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(backend = ?config.storage_backend, "Configuration loaded successfully");

    let store = build_store(&config).await.map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        e
    })?;

    let app = create_app(ConversationsState::new(store)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors_layer(&config.cors_allowed_origins))
            .layer(body_limit_layer())
            .into_inner(),
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("Server starting on http://{}", addr);
    info!("Health check available at http://{}/health", addr);
    info!("Webhook endpoint available at http://{}/webhook", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
