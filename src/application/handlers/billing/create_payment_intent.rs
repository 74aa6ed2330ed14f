//! CreatePaymentIntentHandler - Command handler for one-off payments.

use std::sync::Arc;

use crate::ports::{CreatePaymentIntentRequest, PaymentIntent, PaymentProvider};

use super::BillingError;

/// Currency used when the caller does not specify one.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Command to create a payment intent.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentCommand {
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: Option<String>,
    pub customer_id: Option<String>,
}

/// Result of successful payment intent creation.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentResult {
    pub payment_intent: PaymentIntent,
}

/// Handler for creating payment intents with automatic payment methods.
pub struct CreatePaymentIntentHandler {
    provider: Arc<dyn PaymentProvider>,
}

impl CreatePaymentIntentHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentIntentCommand,
    ) -> Result<CreatePaymentIntentResult, BillingError> {
        let currency = cmd
            .currency
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let request = CreatePaymentIntentRequest {
            amount: cmd.amount,
            currency,
            customer_id: cmd.customer_id,
        };

        let payment_intent = self
            .provider
            .create_payment_intent(request)
            .await
            .map_err(|e| {
                tracing::error!(amount = cmd.amount, error = %e, "Payment intent creation failed");
                e
            })?;

        tracing::info!(
            payment_intent_id = %payment_intent.id,
            amount = payment_intent.amount,
            currency = %payment_intent.currency,
            "Payment intent created"
        );
        Ok(CreatePaymentIntentResult { payment_intent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::ports::PaymentError;

    #[tokio::test]
    async fn defaults_currency_to_usd() {
        let mock = MockPaymentProvider::new();
        let handler = CreatePaymentIntentHandler::new(Arc::new(mock));

        let result = handler
            .handle(CreatePaymentIntentCommand {
                amount: 4900,
                currency: None,
                customer_id: None,
            })
            .await
            .unwrap();

        assert_eq!(result.payment_intent.currency, "usd");
        assert_eq!(result.payment_intent.amount, 4900);
        assert!(result.payment_intent.client_secret.is_some());
    }

    #[tokio::test]
    async fn normalizes_currency_and_passes_customer() {
        let mock = MockPaymentProvider::new();
        let handler = CreatePaymentIntentHandler::new(Arc::new(mock.clone()));

        handler
            .handle(CreatePaymentIntentCommand {
                amount: 1000,
                currency: Some("EUR".to_string()),
                customer_id: Some("cus_123".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(mock.calls()[0].args, vec!["1000", "eur", "cus_123"]);
    }

    #[tokio::test]
    async fn card_decline_is_returned() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::card_declined("Your card was declined."));
        let handler = CreatePaymentIntentHandler::new(Arc::new(mock));

        let err = handler
            .handle(CreatePaymentIntentCommand {
                amount: 4900,
                currency: None,
                customer_id: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "card_declined");
    }
}
