//! CancelSubscriptionHandler - Command handler for cancelling subscriptions.

use std::sync::Arc;

use crate::ports::{PaymentProvider, Subscription};

use super::BillingError;

/// Command to cancel a subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subscription_id: String,
    /// End now instead of at the close of the billing period.
    pub immediate: bool,
}

/// Result of successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for cancelling subscriptions.
///
/// A soft cancel only flags the subscription to end with its period; it
/// stays active and reports no `canceled_at` until Stripe ends it.
/// An immediate cancel deletes the subscription and reports a terminal status.
pub struct CancelSubscriptionHandler {
    provider: Arc<dyn PaymentProvider>,
}

impl CancelSubscriptionHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, BillingError> {
        let subscription = self
            .provider
            .cancel_subscription(&cmd.subscription_id, cmd.immediate)
            .await
            .map_err(|e| {
                tracing::error!(
                    subscription_id = %cmd.subscription_id,
                    error = %e,
                    "Subscription cancellation failed"
                );
                e
            })?;

        Ok(CancelSubscriptionResult { subscription })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::ports::SubscriptionStatus;

    fn handler(mock: &MockPaymentProvider) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn soft_cancel_keeps_subscription_active() {
        let mock = MockPaymentProvider::with_active_subscription("cus_123", "sub_123");

        let result = handler(&mock)
            .handle(CancelSubscriptionCommand {
                subscription_id: "sub_123".to_string(),
                immediate: false,
            })
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Active);
        assert!(result.subscription.cancel_at_period_end);
        assert!(result.subscription.canceled_at.is_none());
    }

    #[tokio::test]
    async fn immediate_cancel_reports_terminal_status() {
        let mock = MockPaymentProvider::with_active_subscription("cus_123", "sub_123");

        let result = handler(&mock)
            .handle(CancelSubscriptionCommand {
                subscription_id: "sub_123".to_string(),
                immediate: true,
            })
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Canceled);
        assert!(result.subscription.canceled_at.is_some());
    }

    #[tokio::test]
    async fn unknown_subscription_fails() {
        let mock = MockPaymentProvider::new();

        let result = handler(&mock)
            .handle(CancelSubscriptionCommand {
                subscription_id: "sub_missing".to_string(),
                immediate: false,
            })
            .await;

        assert!(matches!(result, Err(BillingError::Provider(_))));
    }
}
