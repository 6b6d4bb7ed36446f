//! Route definitions for Conversations domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{conversations, webhook};
use super::middleware::ConversationsState;

/// Read routes for conversations
///
/// Each path is also served with a trailing slash, which the dashboard client uses.
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations/", get(conversations::list_conversations))
        .route("/conversations/{id}", get(conversations::get_conversation))
        .route("/conversations/{id}/", get(conversations::get_conversation))
}

/// Webhook ingress route
fn webhook_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/webhook", post(webhook::receive_webhook))
        .route("/webhook/", post(webhook::receive_webhook))
}

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(conversation_routes())
        .merge(webhook_routes())
}
