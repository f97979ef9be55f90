//! Plan tiers
//!
//! Tier hierarchy: Starter ($29) → Professional ($99). The tier a tenant
//! lands on is derived from the Stripe price on its subscription; prices
//! we don't recognize fall back to Starter.

use serde::{Deserialize, Serialize};

/// Subscription plan tier for a tenant
///
/// Ordering matters: `Starter` is the lowest tier and the fallback for
/// unmapped price IDs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Starter,
    Professional,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Starter => "starter",
            PlanTier::Professional => "professional",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_is_lowest_tier() {
        assert!(PlanTier::Starter < PlanTier::Professional);
    }

    #[test]
    fn tier_labels_are_lowercase() {
        assert_eq!(PlanTier::Starter.as_str(), "starter");
        assert_eq!(PlanTier::Professional.as_str(), "professional");
    }
}
