//! Default content seeding for new tenants
//!
//! Every freshly provisioned tenant gets a starter set of FAQ entries so
//! its site isn't empty on first login. Seeding runs after the tenant row
//! has committed and is best-effort: callers log a failure and move on,
//! they never roll back the tenant.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::BillingResult;

/// A default FAQ entry seeded at onboarding
struct DefaultFaq {
    question: &'static str,
    answer: &'static str,
    category: &'static str,
}

const DEFAULT_FAQS: &[DefaultFaq] = &[
    DefaultFaq {
        question: "What are your business hours?",
        answer: "We're open Monday through Friday, 9 AM to 6 PM. \
                 Please contact us to schedule an appointment.",
        category: "general",
    },
    DefaultFaq {
        question: "How can I schedule an appointment?",
        answer: "You can call or text us to schedule an appointment. \
                 We'll find a convenient time that works for you.",
        category: "scheduling",
    },
    DefaultFaq {
        question: "What services do you offer?",
        answer: "We offer comprehensive repair and maintenance services. \
                 Contact us to discuss your specific needs.",
        category: "services",
    },
];

/// Insert the default FAQ set for a tenant
///
/// The batch runs in one transaction so a tenant ends up with either all
/// defaults or none.
pub async fn seed_default_faqs(pool: &PgPool, tenant_id: Uuid) -> BillingResult<()> {
    let mut tx = pool.begin().await?;

    for faq in DEFAULT_FAQS {
        sqlx::query(
            r#"
            INSERT INTO tenant_faqs (id, tenant_id, question, answer, category, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(faq.question)
        .bind(faq.answer)
        .bind(faq.category)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        tenant_id = %tenant_id,
        count = DEFAULT_FAQS.len(),
        "Seeded default FAQs for tenant"
    );

    Ok(())
}
