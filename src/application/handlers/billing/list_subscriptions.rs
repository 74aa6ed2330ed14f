//! ListSubscriptionsHandler - Query handler for a customer's subscriptions.

use std::sync::Arc;

use crate::ports::{PaymentProvider, Subscription};

/// Query for all subscriptions of a customer.
#[derive(Debug, Clone)]
pub struct ListSubscriptionsQuery {
    pub customer_id: String,
}

/// Handler for listing subscriptions.
///
/// Provider failures are logged and produce an empty list.
pub struct ListSubscriptionsHandler {
    provider: Arc<dyn PaymentProvider>,
}

impl ListSubscriptionsHandler {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    pub async fn handle(&self, query: ListSubscriptionsQuery) -> Vec<Subscription> {
        match self.provider.list_subscriptions(&query.customer_id).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                tracing::error!(
                    customer_id = %query.customer_id,
                    error = %e,
                    "Failed to fetch subscriptions"
                );
                Vec::new()
            }
        }
    }
}
