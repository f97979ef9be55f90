//! Stripe webhook handling
//!
//! Translates verified Stripe events into tenant lifecycle transitions:
//!
//! - `checkout.session.completed` → provision a tenant (status `active`)
//!   and seed its default content
//! - `customer.subscription.updated` → mirror plan and status onto the
//!   tenant (`active` iff Stripe reports `active`, else `suspended`)
//! - `customer.subscription.deleted` → mark the tenant `cancelled`
//!
//! Delivery is at-least-once and unordered, so every handler is
//! idempotent and last-write-wins on provider-reported fields. A
//! redelivered checkout event lands on the unique constraint for
//! `stripe_subscription_id` and resolves to a no-op.

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use sqlx::PgPool;
use stripe::{
    CheckoutSession, Customer, CustomerId, Event, EventObject, EventType, Subscription,
    SubscriptionId, SubscriptionStatus, Webhook,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::client::StripeClient;
use crate::error::{BillingError, BillingResult};
use crate::plan::PlanTier;
use crate::seed::seed_default_faqs;
use crate::subdomain::generate_subdomain;
use crate::tenant::{NewTenant, TenantStatus, TenantStore};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a webhook signature timestamp
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Company name used when neither checkout metadata nor the Stripe
/// customer carry one
const UNKNOWN_COMPANY: &str = "Unknown Company";

/// What processing a verified event did to the tenant store
///
/// `TenantProvisionedWithoutDefaults` makes the degraded-but-successful
/// case explicit: the tenant row exists and the event is acknowledged,
/// only the content seeding failed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Tenant created and default content seeded
    TenantProvisioned {
        tenant_id: Uuid,
        subdomain: String,
        plan: PlanTier,
    },
    /// Tenant created but default content seeding failed
    TenantProvisionedWithoutDefaults {
        tenant_id: Uuid,
        subdomain: String,
        plan: PlanTier,
        seed_error: String,
    },
    /// Duplicate checkout delivery; the tenant already existed
    AlreadyProvisioned { subscription_id: String },
    /// Existing tenant's plan/status mirrored from the subscription
    SubscriptionSynced {
        subscription_id: String,
        plan: PlanTier,
        status: TenantStatus,
    },
    /// Existing tenant marked cancelled
    TenantCancelled { subscription_id: String },
    /// Event type has no handler; acknowledged and skipped
    Ignored { event_type: String },
}

/// Webhook handler for Stripe events
///
/// Holds the clients it needs instead of reaching for globals, so tests
/// can construct it against doubles.
pub struct WebhookHandler {
    stripe: StripeClient,
    store: TenantStore,
}

impl WebhookHandler {
    pub fn new(stripe: StripeClient, pool: PgPool) -> Self {
        let store = TenantStore::new(pool);
        Self { stripe, store }
    }

    pub fn store(&self) -> &TenantStore {
        &self.store
    }

    /// Verify and parse a Stripe webhook event
    ///
    /// Uses manual signature verification as a fallback to work around
    /// async-stripe version incompatibility with newer Stripe API
    /// versions.
    pub fn verify_event(&self, payload: &str, signature: &str) -> BillingResult<Event> {
        let webhook_secret = &self.stripe.config().webhook_secret;

        match Webhook::construct_event(payload, signature, webhook_secret) {
            Ok(event) => return Ok(event),
            Err(e) => {
                tracing::warn!(
                    stripe_error = %e,
                    "Standard webhook parsing failed, trying manual verification"
                );
            }
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        verify_signature_at(payload, signature, webhook_secret, now)?;

        // Signature checked out; the standard path must have failed on the
        // event JSON itself. Parse leniently with serde.
        let event: Event = serde_json::from_str(payload).map_err(|e| {
            tracing::error!(parse_error = %e, "Failed to parse webhook event JSON");
            BillingError::WebhookSignatureInvalid
        })?;

        tracing::info!(
            event_type = %event.type_,
            event_id = %event.id,
            "Manual webhook verification succeeded"
        );

        Ok(event)
    }

    /// Handle a verified Stripe event
    ///
    /// Safe to invoke more than once for the same event. Failures are
    /// scoped to this event and propagate to the HTTP layer; nothing here
    /// is fatal to the process.
    pub async fn handle_event(&self, event: Event) -> BillingResult<WebhookOutcome> {
        tracing::info!(
            event_type = %event.type_,
            event_id = %event.id,
            "Processing Stripe webhook event"
        );

        match event.type_ {
            EventType::CheckoutSessionCompleted => self.handle_checkout_completed(event).await,
            EventType::CustomerSubscriptionUpdated => self.handle_subscription_updated(event).await,
            EventType::CustomerSubscriptionDeleted => self.handle_subscription_deleted(event).await,
            _ => {
                // Log so we can track which events we're not handling;
                // acknowledge so Stripe doesn't retry them.
                tracing::info!(
                    event_type = %event.type_,
                    event_id = %event.id,
                    "Received unhandled Stripe event type - no handler configured"
                );
                Ok(WebhookOutcome::Ignored {
                    event_type: event.type_.to_string(),
                })
            }
        }
    }

    /// checkout.session.completed → create the tenant and seed defaults
    ///
    /// The session payload only carries identifiers, so this round-trips
    /// to Stripe for the full customer and subscription objects.
    async fn handle_checkout_completed(&self, event: Event) -> BillingResult<WebhookOutcome> {
        let session = match event.data.object {
            EventObject::CheckoutSession(session) => session,
            _ => {
                return Err(BillingError::WebhookEventNotSupported(
                    "Expected CheckoutSession".to_string(),
                ))
            }
        };

        let customer_id = expandable_customer_id(&session).ok_or_else(|| {
            BillingError::Internal("Checkout session has no customer".to_string())
        })?;
        let subscription_id = expandable_subscription_id(&session).ok_or_else(|| {
            BillingError::Internal("Checkout session has no subscription".to_string())
        })?;

        let parsed_customer_id: CustomerId = customer_id.parse().map_err(|e| {
            BillingError::Internal(format!("Invalid customer ID {}: {}", customer_id, e))
        })?;
        let parsed_subscription_id: SubscriptionId = subscription_id.parse().map_err(|e| {
            BillingError::Internal(format!("Invalid subscription ID {}: {}", subscription_id, e))
        })?;

        let customer = Customer::retrieve(self.stripe.inner(), &parsed_customer_id, &[]).await?;
        let subscription =
            Subscription::retrieve(self.stripe.inner(), &parsed_subscription_id, &[]).await?;

        let metadata = session.metadata.as_ref();
        let company_name = metadata
            .and_then(|m| m.get("company_name").cloned())
            .or_else(|| customer.name.clone())
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());
        let subdomain = metadata
            .and_then(|m| m.get("subdomain").cloned())
            .unwrap_or_else(|| generate_subdomain(&company_name));
        let plan = self
            .stripe
            .config()
            .plan_for_price_id(subscription_price_id(&subscription));

        let new_tenant = NewTenant {
            stripe_customer_id: customer.id.to_string(),
            stripe_subscription_id: subscription.id.to_string(),
            company_name,
            subdomain,
            email: customer.email.clone(),
            plan,
        };

        let tenant = match self.store.insert(&new_tenant).await? {
            Some(tenant) => tenant,
            None => {
                return Ok(WebhookOutcome::AlreadyProvisioned {
                    subscription_id: subscription.id.to_string(),
                })
            }
        };

        tracing::info!(
            tenant_id = %tenant.id,
            subdomain = %tenant.subdomain,
            plan = %tenant.plan,
            subscription_id = %subscription.id,
            "Tenant provisioned via checkout"
        );

        // Best-effort: the tenant must exist even if defaults are missing.
        if let Err(e) = seed_default_faqs(self.store.pool(), tenant.id).await {
            tracing::warn!(
                tenant_id = %tenant.id,
                error = %e,
                "Failed to seed default FAQs - tenant remains provisioned"
            );
            return Ok(WebhookOutcome::TenantProvisionedWithoutDefaults {
                tenant_id: tenant.id,
                subdomain: tenant.subdomain,
                plan: tenant.plan,
                seed_error: e.to_string(),
            });
        }

        Ok(WebhookOutcome::TenantProvisioned {
            tenant_id: tenant.id,
            subdomain: tenant.subdomain,
            plan: tenant.plan,
        })
    }

    /// customer.subscription.updated → mirror plan and status
    async fn handle_subscription_updated(&self, event: Event) -> BillingResult<WebhookOutcome> {
        let subscription = extract_subscription(event)?;

        // Price is embedded in the event payload; no extra round trip.
        let plan = self
            .stripe
            .config()
            .plan_for_price_id(subscription_price_id(&subscription));
        let status = tenant_status_for(subscription.status);

        self.store
            .update_subscription(subscription.id.as_str(), plan, status)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    subscription_id = %subscription.id,
                    event_type = "customer.subscription.updated",
                    error = %e,
                    "Failed to sync subscription to tenant"
                );
            })?;

        tracing::info!(
            subscription_id = %subscription.id,
            plan = %plan,
            status = %status,
            "Tenant synced from subscription update"
        );

        Ok(WebhookOutcome::SubscriptionSynced {
            subscription_id: subscription.id.to_string(),
            plan,
            status,
        })
    }

    /// customer.subscription.deleted → cancel the tenant
    async fn handle_subscription_deleted(&self, event: Event) -> BillingResult<WebhookOutcome> {
        let subscription = extract_subscription(event)?;

        self.store
            .cancel(subscription.id.as_str())
            .await
            .inspect_err(|e| {
                tracing::error!(
                    subscription_id = %subscription.id,
                    event_type = "customer.subscription.deleted",
                    error = %e,
                    "Failed to cancel tenant"
                );
            })?;

        tracing::info!(
            subscription_id = %subscription.id,
            "Tenant cancelled (subscription deleted)"
        );

        Ok(WebhookOutcome::TenantCancelled {
            subscription_id: subscription.id.to_string(),
        })
    }
}

/// Manually verify a Stripe signature header against a payload
///
/// Parses the `t=timestamp,v1=signature` header format, enforces the
/// timestamp tolerance, and compares the hex HMAC-SHA256 of
/// `"{timestamp}.{payload}"`.
pub(crate) fn verify_signature_at(
    payload: &str,
    signature: &str,
    webhook_secret: &str,
    now: i64,
) -> BillingResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut v1_signature: Option<String> = None;

    for part in signature.split(',') {
        let kv: Vec<&str> = part.splitn(2, '=').collect();
        if kv.len() == 2 {
            match kv[0] {
                "t" => timestamp = kv[1].parse().ok(),
                "v1" => v1_signature = Some(kv[1].to_string()),
                _ => {}
            }
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        tracing::error!("Missing timestamp in signature header");
        BillingError::WebhookSignatureInvalid
    })?;

    let v1_signature = v1_signature.ok_or_else(|| {
        tracing::error!("Missing v1 signature in signature header");
        BillingError::WebhookSignatureInvalid
    })?;

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        tracing::error!(
            timestamp = timestamp,
            now = now,
            "Webhook timestamp outside tolerance"
        );
        return Err(BillingError::WebhookSignatureInvalid);
    }

    // The secret starts with "whsec_" which prefixes the signing key
    let secret_key = webhook_secret
        .strip_prefix("whsec_")
        .unwrap_or(webhook_secret);
    let signed_payload = format!("{}.{}", timestamp, payload);

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes()).map_err(|_| {
        tracing::error!("Invalid webhook secret key");
        BillingError::WebhookSignatureInvalid
    })?;
    mac.update(signed_payload.as_bytes());
    let computed = hex::encode(mac.finalize().into_bytes());

    if computed != v1_signature {
        tracing::error!("Webhook signature mismatch");
        return Err(BillingError::WebhookSignatureInvalid);
    }

    Ok(())
}

/// Map a Stripe subscription status onto a tenant status
///
/// Anything Stripe doesn't report as `active` suspends the tenant;
/// cancellation only happens via subscription deletion.
fn tenant_status_for(status: SubscriptionStatus) -> TenantStatus {
    match status {
        SubscriptionStatus::Active => TenantStatus::Active,
        _ => TenantStatus::Suspended,
    }
}

/// Price ID from the first subscription item, if present
fn subscription_price_id(subscription: &Subscription) -> Option<&str> {
    subscription
        .items
        .data
        .first()
        .and_then(|item| item.price.as_ref())
        .map(|price| price.id.as_str())
}

fn extract_subscription(event: Event) -> BillingResult<Subscription> {
    match event.data.object {
        EventObject::Subscription(subscription) => Ok(subscription),
        _ => Err(BillingError::WebhookEventNotSupported(
            "Expected Subscription".to_string(),
        )),
    }
}

fn expandable_customer_id(session: &CheckoutSession) -> Option<String> {
    match &session.customer {
        Some(stripe::Expandable::Id(id)) => Some(id.to_string()),
        Some(stripe::Expandable::Object(c)) => Some(c.id.to_string()),
        None => None,
    }
}

fn expandable_subscription_id(session: &CheckoutSession) -> Option<String> {
    match &session.subscription {
        Some(stripe::Expandable::Id(id)) => Some(id.to_string()),
        Some(stripe::Expandable::Object(s)) => Some(s.id.to_string()),
        None => None,
    }
}
