//! Tenant records and the tenant store
//!
//! The tenant store is the only writer of tenant status/plan fields.
//! Stripe remains the source of truth for subscription state; rows here
//! just mirror it. Tenants are never hard-deleted — cancellation is a
//! status transition.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};
use crate::plan::PlanTier;

/// Lifecycle status of a tenant
///
/// The unprovisioned state is the absence of a row. `Cancelled` is
/// terminal: no handler transitions out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Cancelled,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A provisioned tenant row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub company_name: String,
    pub subdomain: String,
    pub email: Option<String>,
    pub plan: PlanTier,
    pub status: TenantStatus,
    pub created_at: OffsetDateTime,
}

/// Fields for creating a tenant at checkout completion
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub company_name: String,
    pub subdomain: String,
    pub email: Option<String>,
    pub plan: PlanTier,
}

/// Unique constraint enforcing one tenant row per billing subscription
const SUBSCRIPTION_ID_CONSTRAINT: &str = "tenants_stripe_subscription_id_key";

/// Data access for tenant rows
///
/// Relies on the store's unique constraint on `stripe_subscription_id`
/// for idempotent creation and on single-statement atomicity for updates.
#[derive(Clone)]
pub struct TenantStore {
    pool: PgPool,
}

impl TenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a new tenant with status `active`, returning the created row
    ///
    /// Returns `Ok(None)` only when the insert hits the subscription-ID
    /// unique constraint: a redelivered checkout event must be a no-op,
    /// not an error. Any other violation (a subdomain collision) is an
    /// error, so the caller fails the delivery and the retry gets a
    /// fresh random suffix.
    pub async fn insert(&self, new_tenant: &NewTenant) -> BillingResult<Option<Tenant>> {
        let result = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (
                id, stripe_customer_id, stripe_subscription_id,
                company_name, subdomain, email, plan, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', NOW(), NOW())
            RETURNING id, stripe_customer_id, stripe_subscription_id,
                      company_name, subdomain, email, plan, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_tenant.stripe_customer_id)
        .bind(&new_tenant.stripe_subscription_id)
        .bind(&new_tenant.company_name)
        .bind(&new_tenant.subdomain)
        .bind(new_tenant.email.as_deref())
        .bind(new_tenant.plan)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(tenant) => Ok(Some(tenant)),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(SUBSCRIPTION_ID_CONSTRAINT) =>
            {
                tracing::info!(
                    subscription_id = %new_tenant.stripe_subscription_id,
                    subdomain = %new_tenant.subdomain,
                    "Tenant insert hit subscription unique constraint - treating as duplicate delivery"
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Update plan and status on the tenant matched by subscription ID
    ///
    /// Zero matched rows means Stripe knows a subscription we never
    /// provisioned - a reportable divergence, not a silent no-op.
    pub async fn update_subscription(
        &self,
        stripe_subscription_id: &str,
        plan: PlanTier,
        status: TenantStatus,
    ) -> BillingResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET plan = $1, status = $2, updated_at = NOW()
            WHERE stripe_subscription_id = $3
            "#,
        )
        .bind(plan)
        .bind(status)
        .bind(stripe_subscription_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BillingError::TenantNotFound(
                stripe_subscription_id.to_string(),
            ));
        }

        Ok(())
    }

    /// Mark the tenant matched by subscription ID as cancelled
    pub async fn cancel(&self, stripe_subscription_id: &str) -> BillingResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET status = 'cancelled', updated_at = NOW()
            WHERE stripe_subscription_id = $1
            "#,
        )
        .bind(stripe_subscription_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BillingError::TenantNotFound(
                stripe_subscription_id.to_string(),
            ));
        }

        Ok(())
    }
}
