//! Subscription tiers and their pricing plans.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscription tier offered to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Starter,
    Pro,
    Enterprise,
}

impl SubscriptionTier {
    /// All tiers, cheapest first.
    pub const ALL: [SubscriptionTier; 3] = [
        SubscriptionTier::Starter,
        SubscriptionTier::Pro,
        SubscriptionTier::Enterprise,
    ];

    /// Wire name of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Starter => "starter",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }

    /// Static pricing plan for this tier.
    pub fn plan(&self) -> PricingPlan {
        PricingPlan::for_tier(*self)
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing interval of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Month,
    Year,
}

/// Pricing plan attached to a tier.
///
/// | Tier | Price | Interval | Features |
/// |------|-------|----------|----------|
/// | Starter | 4900 | month | 10GB data, 5 pipelines, Email support |
/// | Pro | 19900 | month | 100GB data, Unlimited pipelines, Priority support |
/// | Enterprise | 49900 | month | Unlimited data, Custom integrations, Dedicated support |
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingPlan {
    pub tier: SubscriptionTier,
    pub name: &'static str,
    /// Price in minor currency units (cents).
    pub price: i64,
    pub interval: BillingInterval,
    pub features: &'static [&'static str],
}

impl PricingPlan {
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Starter => Self {
                tier,
                name: "Starter",
                price: 4900,
                interval: BillingInterval::Month,
                features: &["10GB data", "5 pipelines", "Email support"],
            },
            SubscriptionTier::Pro => Self {
                tier,
                name: "Pro",
                price: 19900,
                interval: BillingInterval::Month,
                features: &["100GB data", "Unlimited pipelines", "Priority support"],
            },
            SubscriptionTier::Enterprise => Self {
                tier,
                name: "Enterprise",
                price: 49900,
                interval: BillingInterval::Month,
                features: &["Unlimited data", "Custom integrations", "Dedicated support"],
            },
        }
    }
}

/// Maps tiers to provider price references.
///
/// Tiers without an explicit price id fall back to `price_<tier>`.
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    overrides: HashMap<SubscriptionTier, String>,
}

impl PriceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `price_id` for `tier`. Blank ids are ignored.
    pub fn with_price(mut self, tier: SubscriptionTier, price_id: impl Into<String>) -> Self {
        let price_id = price_id.into();
        if !price_id.trim().is_empty() {
            self.overrides.insert(tier, price_id);
        }
        self
    }

    /// Provider price reference for a tier.
    pub fn price_id(&self, tier: SubscriptionTier) -> String {
        self.overrides
            .get(&tier)
            .cloned()
            .unwrap_or_else(|| format!("price_{}", tier.as_str()))
    }
}
