//! UpdateSubscriptionHandler - Command handler for moving a subscription to another tier.
//!
//! Not exposed over HTTP; plan changes go through the billing portal.

use std::sync::Arc;

use crate::domain::billing::{PriceCatalog, SubscriptionTier};
use crate::ports::{PaymentProvider, Subscription, UpdateSubscriptionRequest};

use super::BillingError;

/// Command to change a subscription's tier.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptionCommand {
    pub subscription_id: String,
    pub new_tier: SubscriptionTier,
}

/// Result of a successful tier change.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for upgrading or downgrading subscriptions.
///
/// Retrieves the subscription to find its first item, then replaces that
/// item's price with prorations.
pub struct UpdateSubscriptionHandler {
    provider: Arc<dyn PaymentProvider>,
    prices: PriceCatalog,
}

impl UpdateSubscriptionHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>, prices: PriceCatalog) -> Self {
        Self { provider, prices }
    }

    pub async fn handle(
        &self,
        cmd: UpdateSubscriptionCommand,
    ) -> Result<UpdateSubscriptionResult, BillingError> {
        let current = self.provider.get_subscription(&cmd.subscription_id).await?;

        let item_id = current
            .item_id
            .ok_or_else(|| BillingError::NoSubscriptionItem(cmd.subscription_id.clone()))?;

        let subscription = self
            .provider
            .update_subscription(UpdateSubscriptionRequest {
                subscription_id: cmd.subscription_id,
                item_id,
                price_id: self.prices.price_id(cmd.new_tier),
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Subscription update failed");
                e
            })?;

        tracing::info!(
            subscription_id = %subscription.id,
            tier = %cmd.new_tier,
            "Subscription tier changed"
        );
        Ok(UpdateSubscriptionResult { subscription })
    }
}
