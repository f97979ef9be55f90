//! API error types and HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use subsite_billing::BillingError;

/// Errors surfaced by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing or unreadable stripe-signature header")]
    MissingSignature,

    #[error("request body is not valid UTF-8")]
    InvalidBody,

    #[error(transparent)]
    Billing(#[from] BillingError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status for this error
    ///
    /// Client errors (bad signature, malformed request) get 4xx and are
    /// never retried. Processing failures get 500 so Stripe's standard
    /// webhook retry semantics kick in.
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingSignature | ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::Billing(BillingError::WebhookSignatureInvalid) => StatusCode::BAD_REQUEST,
            ApiError::Billing(BillingError::WebhookEventNotSupported(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Billing(_) | ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Webhook processing failed");
        } else {
            tracing::warn!(error = %self, "Webhook request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
