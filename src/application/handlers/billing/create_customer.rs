//! CreateCustomerHandler - Command handler for registering a customer with Stripe.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ports::{CreateCustomerRequest, Customer, PaymentProvider};

use super::BillingError;

/// Metadata attached to every customer created through this service.
const CUSTOMER_SOURCE: (&str, &str) = ("source", "api");

/// Command to create a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerCommand {
    pub email: String,
    pub name: String,
}

/// Result of successful customer creation.
#[derive(Debug, Clone)]
pub struct CreateCustomerResult {
    pub customer: Customer,
}

/// Handler for creating customers.
pub struct CreateCustomerHandler {
    provider: Arc<dyn PaymentProvider>,
}

impl CreateCustomerHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(
        &self,
        cmd: CreateCustomerCommand,
    ) -> Result<CreateCustomerResult, BillingError> {
        let request = CreateCustomerRequest {
            email: cmd.email,
            name: cmd.name,
            metadata: HashMap::from([(
                CUSTOMER_SOURCE.0.to_string(),
                CUSTOMER_SOURCE.1.to_string(),
            )]),
        };

        let customer = self.provider.create_customer(request).await.map_err(|e| {
            tracing::error!(error = %e, "Customer creation failed");
            e
        })?;

        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(CreateCustomerResult { customer })
    }
}
