//! CreateSubscriptionHandler - Command handler for starting a subscription.

use std::sync::Arc;

use crate::domain::billing::{PriceCatalog, PricingPlan, SubscriptionTier};
use crate::ports::{CreateSubscriptionRequest, PaymentProvider, Subscription};

use super::BillingError;

/// Command to subscribe a customer to a tier.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub customer_id: String,
    pub tier: SubscriptionTier,
    /// Trial length in days. `None` or zero starts billing immediately.
    pub trial_days: Option<u32>,
}

/// Result of successful subscription creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    /// Plan the subscription was created for.
    pub plan: PricingPlan,
}

/// Handler for creating subscriptions.
///
/// Resolves the tier to a Stripe price through the [`PriceCatalog`] and
/// creates the subscription in `default_incomplete` mode, so the caller
/// receives the first invoice's client secret to confirm payment.
pub struct CreateSubscriptionHandler {
    provider: Arc<dyn PaymentProvider>,
    prices: PriceCatalog,
}

impl CreateSubscriptionHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>, prices: PriceCatalog) -> Self {
        Self { provider, prices }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, BillingError> {
        let request = CreateSubscriptionRequest {
            price_id: self.prices.price_id(cmd.tier),
            customer_id: cmd.customer_id,
            trial_days: cmd.trial_days.filter(|days| *days > 0),
        };

        let subscription = self.provider.create_subscription(request).await.map_err(|e| {
            tracing::error!(tier = %cmd.tier, error = %e, "Subscription creation failed");
            e
        })?;

        let plan = cmd.tier.plan();
        tracing::info!(
            subscription_id = %subscription.id,
            customer_id = %subscription.customer_id,
            tier = %cmd.tier,
            price = plan.price,
            status = %subscription.status,
            "Subscription created"
        );
        Ok(CreateSubscriptionResult { subscription, plan })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::ports::{PaymentError, SubscriptionStatus};

    fn command(tier: SubscriptionTier, trial_days: Option<u32>) -> CreateSubscriptionCommand {
        CreateSubscriptionCommand {
            customer_id: "cus_123".to_string(),
            tier,
            trial_days,
        }
    }

    #[tokio::test]
    async fn derives_price_from_tier() {
        let mock = MockPaymentProvider::new();
        let handler = CreateSubscriptionHandler::new(Arc::new(mock.clone()), PriceCatalog::new());

        let result = handler
            .handle(command(SubscriptionTier::Pro, None))
            .await
            .unwrap();

        assert_eq!(result.subscription.price_id.as_deref(), Some("price_pro"));
        assert_eq!(result.plan.price, 19900);
        assert!(result.subscription.client_secret.is_some());
        assert_eq!(mock.calls()[0].args[1], "price_pro");
    }

    #[tokio::test]
    async fn uses_configured_price_override() {
        let mock = MockPaymentProvider::new();
        let prices =
            PriceCatalog::new().with_price(SubscriptionTier::Enterprise, "price_1EntMonthly");
        let handler = CreateSubscriptionHandler::new(Arc::new(mock.clone()), prices);

        handler
            .handle(command(SubscriptionTier::Enterprise, None))
            .await
            .unwrap();

        assert_eq!(mock.calls()[0].args[1], "price_1EntMonthly");
    }

    #[tokio::test]
    async fn trial_days_start_a_trial() {
        let mock = MockPaymentProvider::new();
        let handler = CreateSubscriptionHandler::new(Arc::new(mock), PriceCatalog::new());

        let result = handler
            .handle(command(SubscriptionTier::Starter, Some(14)))
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Trialing);
        assert!(result.subscription.client_secret.is_none());
    }

    #[tokio::test]
    async fn zero_trial_days_sends_no_trial() {
        let mock = MockPaymentProvider::new();
        let handler = CreateSubscriptionHandler::new(Arc::new(mock.clone()), PriceCatalog::new());

        handler
            .handle(command(SubscriptionTier::Starter, Some(0)))
            .await
            .unwrap();

        assert_eq!(mock.calls()[0].args[2], "");
    }

    #[tokio::test]
    async fn provider_failure_is_returned() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::invalid_request("No such customer: 'cus_123'"));
        let handler = CreateSubscriptionHandler::new(Arc::new(mock), PriceCatalog::new());

        let result = handler.handle(command(SubscriptionTier::Pro, None)).await;

        assert!(matches!(result, Err(BillingError::Provider(_))));
    }
}
