//! Mock payment provider for testing.
//!
//! Provides an in-memory implementation of `PaymentProvider` for unit and
//! integration tests. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{
    CreateCustomerRequest, CreatePaymentIntentRequest, CreateSubscriptionRequest, Customer,
    PaymentError, PaymentIntent, PaymentProvider, PortalSession, Subscription, SubscriptionStatus,
    UpdateSubscriptionRequest,
};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Mock payment provider for testing.
///
/// Clones share state, so a test can keep one handle for assertions while
/// the application holds another.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
///
/// // Inject errors
/// mock.set_method_error("create_customer", PaymentError::invalid_request("bad email"));
///
/// // Use in tests, then assert on calls
/// assert_eq!(mock.call_count("create_customer"), 1);
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Customers by ID.
    customers: HashMap<String, Customer>,

    /// Subscriptions by ID.
    subscriptions: HashMap<String, Subscription>,

    /// Next portal session to return.
    next_portal: Option<PortalSession>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    /// Sequence for generated IDs.
    sequence: u64,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{}_mock_{}", prefix, self.sequence)
    }
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add a customer to the "database".
    pub fn add_customer(&self, customer: Customer) {
        self.state().customers.insert(customer.id.clone(), customer);
    }

    /// Add a subscription to the "database".
    pub fn add_subscription(&self, subscription: Subscription) {
        self.state()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    /// Set the portal session to return.
    pub fn set_portal_session(&self, session: PortalSession) {
        self.state().next_portal = Some(session);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    /// Stored subscription by ID.
    pub fn subscription(&self, subscription_id: &str) -> Option<Subscription> {
        self.state().subscriptions.get(subscription_id).cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.state().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();

        // Check method-specific error first
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Check global error (consumes it)
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        self.record_call(
            "create_customer",
            vec![request.email.clone(), request.name.clone()],
        );
        self.check_error("create_customer")?;

        let mut state = self.state();
        let customer = Customer {
            id: state.next_id("cus"),
            email: Some(request.email),
            name: Some(request.name),
            metadata: request.metadata,
            created_at: chrono::Utc::now().timestamp(),
        };

        state.customers.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, PaymentError> {
        self.record_call(
            "create_subscription",
            vec![
                request.customer_id.clone(),
                request.price_id.clone(),
                request.trial_days.map(|d| d.to_string()).unwrap_or_default(),
            ],
        );
        self.check_error("create_subscription")?;

        let mut state = self.state();
        let now = chrono::Utc::now().timestamp();
        let trial_days = request.trial_days.filter(|d| *d > 0);

        // A trial defers the first invoice, so there is nothing to confirm yet
        let (status, trial_end, client_secret) = match trial_days {
            Some(days) => (
                SubscriptionStatus::Trialing,
                Some(now + i64::from(days) * SECONDS_PER_DAY),
                None,
            ),
            None => {
                let pi_id = state.next_id("pi");
                (
                    SubscriptionStatus::Incomplete,
                    None,
                    Some(format!("{}_secret_mock", pi_id)),
                )
            }
        };

        let subscription = Subscription {
            id: state.next_id("sub"),
            customer_id: request.customer_id,
            status,
            item_id: Some(state.next_id("si")),
            price_id: Some(request.price_id),
            current_period_start: now,
            current_period_end: now + 30 * SECONDS_PER_DAY,
            trial_end,
            cancel_at_period_end: false,
            canceled_at: None,
            client_secret,
        };

        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());

        Ok(subscription)
    }

    async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription, PaymentError> {
        self.record_call("get_subscription", vec![subscription_id.to_string()]);
        self.check_error("get_subscription")?;

        self.state()
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Subscription"))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        immediate: bool,
    ) -> Result<Subscription, PaymentError> {
        self.record_call(
            "cancel_subscription",
            vec![subscription_id.to_string(), immediate.to_string()],
        );
        self.check_error("cancel_subscription")?;

        let mut state = self.state();

        let subscription = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;

        if immediate {
            subscription.status = SubscriptionStatus::Canceled;
            subscription.canceled_at = Some(chrono::Utc::now().timestamp());
        } else {
            subscription.cancel_at_period_end = true;
        }

        Ok(subscription.clone())
    }

    async fn update_subscription(
        &self,
        request: UpdateSubscriptionRequest,
    ) -> Result<Subscription, PaymentError> {
        self.record_call(
            "update_subscription",
            vec![
                request.subscription_id.clone(),
                request.item_id.clone(),
                request.price_id.clone(),
            ],
        );
        self.check_error("update_subscription")?;

        let mut state = self.state();

        let subscription = state
            .subscriptions
            .get_mut(&request.subscription_id)
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;

        if subscription.item_id.as_deref() != Some(request.item_id.as_str()) {
            return Err(PaymentError::invalid_request(format!(
                "No such subscription item: '{}'",
                request.item_id
            )));
        }

        subscription.price_id = Some(request.price_id);
        Ok(subscription.clone())
    }

    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        self.record_call(
            "create_payment_intent",
            vec![
                request.amount.to_string(),
                request.currency.clone(),
                request.customer_id.clone().unwrap_or_default(),
            ],
        );
        self.check_error("create_payment_intent")?;

        let id = self.state().next_id("pi");
        Ok(PaymentIntent {
            client_secret: Some(format!("{}_secret_mock", id)),
            id,
            amount: request.amount,
            currency: request.currency,
            status: "requires_payment_method".to_string(),
            customer_id: request.customer_id,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        self.record_call(
            "create_portal_session",
            vec![customer_id.to_string(), return_url.to_string()],
        );
        self.check_error("create_portal_session")?;

        let mut state = self.state();
        if let Some(session) = state.next_portal.take() {
            return Ok(session);
        }

        let id = state.next_id("bps");
        Ok(PortalSession {
            url: format!("https://billing.stripe.com/p/session/{}", id),
            id,
        })
    }

    async fn list_subscriptions(&self, customer_id: &str) -> Result<Vec<Subscription>, PaymentError> {
        self.record_call("list_subscriptions", vec![customer_id.to_string()]);
        self.check_error("list_subscriptions")?;

        // Stripe leaves canceled subscriptions out unless a status filter asks for them
        let mut subscriptions: Vec<Subscription> = self
            .state()
            .subscriptions
            .values()
            .filter(|s| s.customer_id == customer_id)
            .filter(|s| s.status != SubscriptionStatus::Canceled)
            .cloned()
            .collect();
        subscriptions.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(subscriptions)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════════

impl MockPaymentProvider {
    /// Create a mock with a pre-configured active subscription.
    pub fn with_active_subscription(customer_id: &str, subscription_id: &str) -> Self {
        let mock = Self::new();
        let now = chrono::Utc::now().timestamp();

        mock.add_subscription(Subscription {
            id: subscription_id.to_string(),
            customer_id: customer_id.to_string(),
            status: SubscriptionStatus::Active,
            item_id: Some("si_existing".to_string()),
            price_id: Some("price_starter".to_string()),
            current_period_start: now,
            current_period_end: now + 30 * SECONDS_PER_DAY,
            trial_end: None,
            cancel_at_period_end: false,
            canceled_at: None,
            client_secret: None,
        });

        mock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_request() -> CreateCustomerRequest {
        CreateCustomerRequest {
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            metadata: HashMap::from([("source".to_string(), "api".to_string())]),
        }
    }

    fn subscription_request(trial_days: Option<u32>) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            customer_id: "cus_123".to_string(),
            price_id: "price_pro".to_string(),
            trial_days,
        }
    }

    #[tokio::test]
    async fn create_customer_returns_mock_customer() {
        let mock = MockPaymentProvider::new();

        let customer = mock.create_customer(customer_request()).await.unwrap();

        assert!(customer.id.starts_with("cus_mock_"));
        assert_eq!(customer.email.as_deref(), Some("test@example.com"));
        assert_eq!(customer.metadata.get("source").map(String::as_str), Some("api"));
    }

    #[tokio::test]
    async fn create_subscription_without_trial_has_client_secret() {
        let mock = MockPaymentProvider::new();

        let sub = mock.create_subscription(subscription_request(None)).await.unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Incomplete);
        assert!(sub.client_secret.is_some());
        assert_eq!(sub.price_id.as_deref(), Some("price_pro"));
    }

    #[tokio::test]
    async fn create_subscription_with_trial_is_trialing() {
        let mock = MockPaymentProvider::new();

        let sub = mock.create_subscription(subscription_request(Some(14))).await.unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Trialing);
        assert!(sub.trial_end.is_some());
        assert!(sub.client_secret.is_none());
    }

    #[tokio::test]
    async fn zero_trial_days_means_no_trial() {
        let mock = MockPaymentProvider::new();

        let sub = mock.create_subscription(subscription_request(Some(0))).await.unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Incomplete);
        assert!(sub.trial_end.is_none());
    }

    #[tokio::test]
    async fn cancel_subscription_at_period_end() {
        let mock = MockPaymentProvider::with_active_subscription("cus_123", "sub_123");

        let sub = mock.cancel_subscription("sub_123", false).await.unwrap();

        assert!(sub.cancel_at_period_end);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.canceled_at.is_none());
    }

    #[tokio::test]
    async fn cancel_subscription_immediate() {
        let mock = MockPaymentProvider::with_active_subscription("cus_123", "sub_123");

        let sub = mock.cancel_subscription("sub_123", true).await.unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Canceled);
        assert!(sub.canceled_at.is_some());
    }

    #[tokio::test]
    async fn cancel_unknown_subscription_is_not_found() {
        let mock = MockPaymentProvider::new();

        let err = mock.cancel_subscription("sub_missing", true).await.unwrap_err();

        assert_eq!(err.code, crate::ports::PaymentErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_subscription_requires_matching_item() {
        let mock = MockPaymentProvider::with_active_subscription("cus_123", "sub_123");

        let err = mock
            .update_subscription(UpdateSubscriptionRequest {
                subscription_id: "sub_123".to_string(),
                item_id: "si_other".to_string(),
                price_id: "price_pro".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ports::PaymentErrorCode::InvalidRequest);

        let sub = mock
            .update_subscription(UpdateSubscriptionRequest {
                subscription_id: "sub_123".to_string(),
                item_id: "si_existing".to_string(),
                price_id: "price_pro".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(sub.price_id.as_deref(), Some("price_pro"));
    }

    #[tokio::test]
    async fn list_subscriptions_filters_by_customer() {
        let mock = MockPaymentProvider::with_active_subscription("cus_123", "sub_123");
        mock.create_subscription(CreateSubscriptionRequest {
            customer_id: "cus_other".to_string(),
            price_id: "price_starter".to_string(),
            trial_days: None,
        })
        .await
        .unwrap();

        let subs = mock.list_subscriptions("cus_123").await.unwrap();

        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, "sub_123");
    }

    #[tokio::test]
    async fn list_subscriptions_omits_canceled() {
        let mock = MockPaymentProvider::with_active_subscription("cus_123", "sub_123");
        let ending = mock
            .create_subscription(CreateSubscriptionRequest {
                customer_id: "cus_123".to_string(),
                price_id: "price_pro".to_string(),
                trial_days: None,
            })
            .await
            .unwrap();
        mock.cancel_subscription(&ending.id, false).await.unwrap();
        mock.cancel_subscription("sub_123", true).await.unwrap();

        let subs = mock.list_subscriptions("cus_123").await.unwrap();

        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, ending.id);
        assert!(subs[0].cancel_at_period_end);
    }

    #[tokio::test]
    async fn set_portal_session_returns_configured() {
        let mock = MockPaymentProvider::new();
        mock.set_portal_session(PortalSession {
            id: "bps_custom".to_string(),
            url: "https://billing.example.com/custom".to_string(),
        });

        let session = mock
            .create_portal_session("cus_123", "https://app.example.com")
            .await
            .unwrap();

        assert_eq!(session.id, "bps_custom");
    }

    #[tokio::test]
    async fn set_error_returns_error_once() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::card_declined("Test decline"));

        let result = mock.create_customer(customer_request()).await;
        assert!(result.is_err());

        let result = mock.create_customer(customer_request()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn set_method_error_only_affects_method() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error("create_payment_intent", PaymentError::network("timeout"));

        assert!(mock.create_customer(customer_request()).await.is_ok());
        let result = mock
            .create_payment_intent(CreatePaymentIntentRequest {
                amount: 4900,
                currency: "usd".to_string(),
                customer_id: None,
            })
            .await;
        assert!(result.is_err());

        mock.clear_errors();
        assert!(mock.list_subscriptions("cus_123").await.is_ok());
    }

    #[tokio::test]
    async fn call_log_contains_arguments() {
        let mock = MockPaymentProvider::new();

        mock.create_subscription(subscription_request(Some(7))).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "create_subscription");
        assert_eq!(calls[0].args, vec!["cus_123", "price_pro", "7"]);
        assert!(mock.was_called("create_subscription"));

        mock.clear_calls();
        assert_eq!(mock.call_count("create_subscription"), 0);
    }

    #[test]
    fn clones_share_state() {
        let mock = MockPaymentProvider::new();
        let handle = mock.clone();

        mock.add_subscription(Subscription {
            id: "sub_shared".to_string(),
            customer_id: "cus_1".to_string(),
            status: SubscriptionStatus::Active,
            item_id: None,
            price_id: None,
            current_period_start: 0,
            current_period_end: 0,
            trial_end: None,
            cancel_at_period_end: false,
            canceled_at: None,
            client_secret: None,
        });

        assert!(handle.subscription("sub_shared").is_some());
    }
}
