//! CreatePortalSessionHandler - Command handler for billing portal access.

use std::sync::Arc;

use crate::ports::{PaymentProvider, PortalSession};

use super::BillingError;

/// Command to open a billing portal session.
#[derive(Debug, Clone)]
pub struct CreatePortalSessionCommand {
    pub customer_id: String,
    /// Where the portal sends the customer when they are done.
    pub return_url: String,
}

#[derive(Debug, Clone)]
pub struct CreatePortalSessionResult {
    pub session: PortalSession,
}

/// Handler for creating Stripe billing portal sessions.
pub struct CreatePortalSessionHandler {
    provider: Arc<dyn PaymentProvider>,
}

impl CreatePortalSessionHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(
        &self,
        cmd: CreatePortalSessionCommand,
    ) -> Result<CreatePortalSessionResult, BillingError> {
        let session = self
            .provider
            .create_portal_session(&cmd.customer_id, &cmd.return_url)
            .await
            .map_err(|e| {
                tracing::error!(
                    customer_id = %cmd.customer_id,
                    error = %e,
                    "Portal session creation failed"
                );
                e
            })?;

        Ok(CreatePortalSessionResult { session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::ports::PaymentError;

    fn command() -> CreatePortalSessionCommand {
        CreatePortalSessionCommand {
            customer_id: "cus_123".to_string(),
            return_url: "https://app.example.com/account".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_portal_url() {
        let mock = MockPaymentProvider::new();
        let handler = CreatePortalSessionHandler::new(Arc::new(mock.clone()));

        let result = handler.handle(command()).await.unwrap();

        assert!(result.session.url.starts_with("https://"));
        assert_eq!(
            mock.calls()[0].args,
            vec!["cus_123", "https://app.example.com/account"]
        );
    }

    #[tokio::test]
    async fn provider_failure_is_returned() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::invalid_request("No such customer: 'cus_123'"));
        let handler = CreatePortalSessionHandler::new(Arc::new(mock));

        let err = handler.handle(command()).await.unwrap_err();

        assert_eq!(err.to_string(), "No such customer: 'cus_123'");
    }
}
