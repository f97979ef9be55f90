//! Stripe client configuration

use stripe::Client;

use crate::error::{BillingError, BillingResult};
use crate::plan::PlanTier;

/// Configuration for Stripe billing
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Stripe secret API key
    pub secret_key: String,
    /// Stripe webhook signing secret
    pub webhook_secret: String,
    /// Price IDs for each plan tier
    pub price_ids: PriceIds,
}

/// Stripe price IDs for plan tiers
#[derive(Debug, Clone)]
pub struct PriceIds {
    pub professional: String,
    /// Optional: some deployments let Starter checkouts go through Stripe too
    pub starter: Option<String>,
}

impl StripeConfig {
    /// Create config from environment variables
    pub fn from_env() -> BillingResult<Self> {
        Ok(Self {
            secret_key: std::env::var("STRIPE_SECRET_KEY")
                .map_err(|_| BillingError::Config("STRIPE_SECRET_KEY not set".to_string()))?,
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
                .map_err(|_| BillingError::Config("STRIPE_WEBHOOK_SECRET not set".to_string()))?,
            price_ids: PriceIds {
                professional: std::env::var("STRIPE_PRICE_PROFESSIONAL").map_err(|_| {
                    BillingError::Config("STRIPE_PRICE_PROFESSIONAL not set".to_string())
                })?,
                starter: std::env::var("STRIPE_PRICE_STARTER").ok(),
            },
        })
    }

    /// Resolve a plan tier from a Stripe price ID
    ///
    /// Unmapped (or absent) price IDs resolve to the lowest tier rather
    /// than failing: a tenant with an unknown price still gets provisioned.
    pub fn plan_for_price_id(&self, price_id: Option<&str>) -> PlanTier {
        match price_id {
            Some(id) if id == self.price_ids.professional => PlanTier::Professional,
            Some(id) if self.price_ids.starter.as_deref() == Some(id) => PlanTier::Starter,
            _ => PlanTier::Starter,
        }
    }
}

/// Stripe billing client
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

impl StripeClient {
    /// Create a new Stripe client from config
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::new(&config.secret_key);
        Self { client, config }
    }

    /// Create a new Stripe client from environment variables
    pub fn from_env() -> BillingResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Get the inner Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the config
    pub fn config(&self) -> &StripeConfig {
        &self.config
    }
}
