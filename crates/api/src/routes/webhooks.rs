//! Stripe webhook endpoint
//!
//! POST /webhooks/stripe — receives provider-signed events. The handler
//! needs the raw body (not parsed JSON) for signature verification, so
//! it extracts `Bytes` rather than `Json`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use subsite_billing::WebhookOutcome;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Minimal acknowledgement body returned to Stripe
#[derive(Debug, Serialize)]
pub struct WebhookReceipt {
    pub received: bool,
    #[serde(flatten)]
    pub outcome: WebhookOutcome,
}

/// Handle an incoming Stripe webhook event
///
/// Verification failures reject the request before any processing; a
/// rejected event is never logged as processed. Processing failures
/// surface as 500 so Stripe redelivers.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookReceipt>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingSignature)?;

    let payload = std::str::from_utf8(&body).map_err(|_| ApiError::InvalidBody)?;

    let event = state.webhooks.verify_event(payload, signature)?;

    tracing::info!(
        event_type = %event.type_,
        event_id = %event.id,
        "Received Stripe webhook"
    );

    let outcome = state.webhooks.handle_event(event).await?;

    Ok(Json(WebhookReceipt {
        received: true,
        outcome,
    }))
}
