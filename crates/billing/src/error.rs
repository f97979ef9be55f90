//! Billing error types

use thiserror::Error;

/// Errors produced while verifying or processing billing events
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),

    #[error("webhook signature verification failed")]
    WebhookSignatureInvalid,

    #[error("unsupported webhook payload: {0}")]
    WebhookEventNotSupported(String),

    /// An update/cancel event referenced a subscription with no tenant row.
    /// Indicates state divergence between Stripe and the tenant store.
    #[error("no tenant found for subscription {0}")]
    TenantNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for BillingError {
    fn from(err: sqlx::Error) -> Self {
        BillingError::Database(err.to_string())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
