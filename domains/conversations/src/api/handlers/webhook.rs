//! Webhook ingress handler

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use threadline_common::{Result, ValidatedJson};
use tracing::info;
use uuid::Uuid;

use crate::api::middleware::ConversationsState;
use crate::domain::events::{WebhookEnvelope, WebhookEvent};

/// Response for a handled webhook event
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: String,
    pub id: Uuid,
}

/// Receive one webhook delivery and apply it
///
/// Creates answer 201, a close answers 200.
pub async fn receive_webhook(
    State(state): State<ConversationsState>,
    ValidatedJson(envelope): ValidatedJson<WebhookEnvelope>,
) -> Result<(StatusCode, Json<WebhookResponse>)> {
    let event = WebhookEvent::try_from(envelope)?;

    info!(event_type = %event.event_type(), event_timestamp = %event.timestamp(), "Webhook event received");

    let outcome = state.dispatcher().dispatch(event).await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(WebhookResponse {
            message: outcome.message,
            id: outcome.id,
        }),
    ))
}
