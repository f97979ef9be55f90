// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Subsite Billing Module
//!
//! Handles Stripe integration for tenant provisioning: webhook events
//! drive the tenant lifecycle state machine and seed new tenants with
//! default content.
//!
//! ## Features
//!
//! - **Webhook verification**: Stripe signature check with a manual
//!   HMAC fallback for newer API versions
//! - **Tenant provisioning**: `checkout.session.completed` creates a
//!   tenant and seeds default FAQs (best-effort)
//! - **Lifecycle sync**: subscription updates mirror plan/status onto
//!   the tenant; deletions cancel it
//! - **Idempotency**: duplicate deliveries converge on the same state

pub mod client;
pub mod error;
pub mod plan;
pub mod seed;
pub mod subdomain;
pub mod tenant;
pub mod webhooks;


// Client
pub use client::{PriceIds, StripeClient, StripeConfig};

// Error
pub use error::{BillingError, BillingResult};

// Plan
pub use plan::PlanTier;

// Seed
pub use seed::seed_default_faqs;

// Subdomain
pub use subdomain::generate_subdomain;

// Tenant
pub use tenant::{NewTenant, Tenant, TenantStatus, TenantStore};

// Webhooks
pub use webhooks::{WebhookHandler, WebhookOutcome};
