//! Application state

use sqlx::PgPool;
use std::sync::Arc;

use subsite_billing::{StripeClient, StripeConfig, WebhookHandler};

use crate::config::Config;

/// Shared application state
///
/// Clients are constructed once at startup and injected here; handlers
/// never reach for process-global singletons.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    /// Webhook handler holding the Stripe client and tenant store
    pub webhooks: Arc<WebhookHandler>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, stripe_config: StripeConfig) -> Self {
        let stripe = StripeClient::new(stripe_config);
        let webhooks = Arc::new(WebhookHandler::new(stripe, pool.clone()));

        Self {
            pool,
            config,
            webhooks,
        }
    }
}
