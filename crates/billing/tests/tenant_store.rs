// Test file - these are expected patterns in test code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Tenant store integration tests
//!
//! Each test runs against a disposable database provisioned by
//! `#[sqlx::test]`. Migration tooling is out of scope, so the schema is
//! created inline with the same constraint names a plain `UNIQUE` column
//! definition would produce.

use sqlx::PgPool;

use subsite_billing::{
    seed_default_faqs, BillingError, NewTenant, PlanTier, Tenant, TenantStatus, TenantStore,
};

async fn create_schema(pool: &PgPool) {
    sqlx::query(
        r#"
        CREATE TABLE tenants (
            id UUID PRIMARY KEY,
            stripe_customer_id TEXT NOT NULL,
            stripe_subscription_id TEXT NOT NULL
                CONSTRAINT tenants_stripe_subscription_id_key UNIQUE,
            company_name TEXT NOT NULL,
            subdomain TEXT NOT NULL
                CONSTRAINT tenants_subdomain_key UNIQUE,
            email TEXT,
            plan TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .expect("create tenants table");

    sqlx::query(
        r#"
        CREATE TABLE tenant_faqs (
            id UUID PRIMARY KEY,
            tenant_id UUID NOT NULL REFERENCES tenants (id),
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .expect("create tenant_faqs table");
}

fn new_tenant(subscription_id: &str, subdomain: &str) -> NewTenant {
    NewTenant {
        stripe_customer_id: "cus_test".to_string(),
        stripe_subscription_id: subscription_id.to_string(),
        company_name: "Acme Repair".to_string(),
        subdomain: subdomain.to_string(),
        email: Some("owner@acme.example".to_string()),
        plan: PlanTier::Professional,
    }
}

async fn tenant_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
        .fetch_one(pool)
        .await
        .expect("count tenants");
    count
}

async fn fetch_tenant(pool: &PgPool, subscription_id: &str) -> Tenant {
    sqlx::query_as::<_, Tenant>(
        r#"
        SELECT id, stripe_customer_id, stripe_subscription_id,
               company_name, subdomain, email, plan, status, created_at
        FROM tenants
        WHERE stripe_subscription_id = $1
        "#,
    )
    .bind(subscription_id)
    .fetch_one(pool)
    .await
    .expect("fetch tenant")
}

#[sqlx::test]
async fn checkout_insert_creates_exactly_one_active_row(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    let created = store
        .insert(&new_tenant("sub_fresh", "acmerepairx7q"))
        .await
        .expect("insert")
        .expect("row created");

    assert_eq!(created.stripe_subscription_id, "sub_fresh");
    assert_eq!(created.subdomain, "acmerepairx7q");
    assert_eq!(created.plan, PlanTier::Professional);
    assert_eq!(created.status, TenantStatus::Active);
    assert_eq!(tenant_count(&pool).await, 1);
}

#[sqlx::test]
async fn redelivered_checkout_insert_is_a_no_op(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    store
        .insert(&new_tenant("sub_dup", "acmerepairx7q"))
        .await
        .expect("first insert")
        .expect("row created");

    // Same subscription, different random suffix, as a redelivery would be.
    let second = store
        .insert(&new_tenant("sub_dup", "acmerepairp2k"))
        .await
        .expect("duplicate insert is not an error");

    assert!(second.is_none());
    assert_eq!(tenant_count(&pool).await, 1);

    let row = fetch_tenant(&pool, "sub_dup").await;
    assert_eq!(row.subdomain, "acmerepairx7q");
}

#[sqlx::test]
async fn subdomain_collision_is_an_error_not_a_duplicate(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    store
        .insert(&new_tenant("sub_first", "sharedname"))
        .await
        .expect("first insert")
        .expect("row created");

    // A different customer landing on the same subdomain must fail the
    // delivery (500 upstream) so the retry regenerates the suffix. It
    // must not be mistaken for a duplicate and silently acknowledged.
    let collision = store.insert(&new_tenant("sub_second", "sharedname")).await;

    assert!(matches!(collision, Err(BillingError::Database(_))));
    assert_eq!(tenant_count(&pool).await, 1);
}

#[sqlx::test]
async fn subscription_update_mirrors_plan_and_status(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    store
        .insert(&new_tenant("sub_live", "acmerepairx7q"))
        .await
        .expect("insert")
        .expect("row created");

    store
        .update_subscription("sub_live", PlanTier::Starter, TenantStatus::Suspended)
        .await
        .expect("update");

    let row = fetch_tenant(&pool, "sub_live").await;
    assert_eq!(row.plan, PlanTier::Starter);
    assert_eq!(row.status, TenantStatus::Suspended);
}

#[sqlx::test]
async fn update_for_unknown_subscription_reports_divergence(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    let result = store
        .update_subscription("sub_ghost", PlanTier::Starter, TenantStatus::Suspended)
        .await;

    assert!(matches!(result, Err(BillingError::TenantNotFound(sub)) if sub == "sub_ghost"));
}

#[sqlx::test]
async fn cancel_is_terminal_from_any_prior_status(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    store
        .insert(&new_tenant("sub_done", "acmerepairx7q"))
        .await
        .expect("insert")
        .expect("row created");
    store
        .update_subscription("sub_done", PlanTier::Professional, TenantStatus::Suspended)
        .await
        .expect("suspend");

    store.cancel("sub_done").await.expect("cancel");

    let row = fetch_tenant(&pool, "sub_done").await;
    assert_eq!(row.status, TenantStatus::Cancelled);
}

#[sqlx::test]
async fn cancel_for_unknown_subscription_reports_divergence(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    let result = store.cancel("sub_ghost").await;

    assert!(matches!(result, Err(BillingError::TenantNotFound(sub)) if sub == "sub_ghost"));
}

#[sqlx::test]
async fn seeding_installs_the_default_faqs(pool: PgPool) {
    create_schema(&pool).await;
    let store = TenantStore::new(pool.clone());

    let tenant = store
        .insert(&new_tenant("sub_seeded", "acmerepairx7q"))
        .await
        .expect("insert")
        .expect("row created");

    seed_default_faqs(&pool, tenant.id).await.expect("seed");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenant_faqs WHERE tenant_id = $1")
        .bind(tenant.id)
        .fetch_one(&pool)
        .await
        .expect("count faqs");
    assert_eq!(count, 3);
}
