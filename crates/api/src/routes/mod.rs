//! HTTP routes

pub mod health;
pub mod webhooks;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Non-POST methods on the webhook path get 405 from axum's
        // method router.
        .route("/webhooks/stripe", post(webhooks::stripe_webhook))
        .route("/health", get(health::health_check))
        .with_state(state)
}
