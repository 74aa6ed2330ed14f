//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API using
//! basic auth and form-encoded parameters.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_base_url("http://localhost:12111");
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{IntoUrl, Method, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::config::PaymentConfig;
use crate::ports::{
    CreateCustomerRequest, CreatePaymentIntentRequest, CreateSubscriptionRequest, Customer,
    PaymentError, PaymentErrorCode, PaymentIntent, PaymentProvider, PortalSession, Subscription,
    UpdateSubscriptionRequest,
};

use super::api_types::{
    StripeCustomer, StripeErrorBody, StripeList, StripePaymentIntent, StripePortalSession,
    StripeSubscription,
};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Build from the loaded application configuration.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self::new(config.stripe_api_key.clone()).with_base_url(&config.stripe_api_base_url)
    }

    /// Set a custom API base URL (for stripe-mock or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Stripe payment provider adapter.
///
/// Implements `PaymentProvider` for Stripe API integration.
#[derive(Debug, Clone)]
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base_url, path)
    }

    /// URL of a single object, e.g. `/v1/subscriptions/sub_123`.
    ///
    /// Object ids arrive from request paths, so they are checked against
    /// Stripe's id alphabet and appended as one encoded segment.
    fn object_url(&self, collection: &str, id: &str) -> Result<Url, PaymentError> {
        if !is_valid_object_id(id) {
            tracing::warn!(collection, id, "Rejected malformed Stripe object id");
            return Err(PaymentError::invalid_request(format!(
                "Invalid {} id: '{}'",
                collection, id
            )));
        }

        let mut url = Url::parse(&self.url(collection))
            .map_err(|e| PaymentError::provider(format!("Invalid Stripe API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::provider("Stripe API URL cannot hold a path"))?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
    }

    /// Sends the request and decodes the response body.
    ///
    /// Non-success statuses are turned into a `PaymentError` carrying
    /// Stripe's own error message.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, PaymentError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Stripe request failed");
            PaymentError::network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_response(status, &body);
            tracing::error!(
                operation,
                status = status.as_u16(),
                code = %error.code,
                error = %error.message,
                "Stripe API returned an error"
            );
            return Err(error);
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

/// Stripe ids are prefixed alphanumerics like `sub_1MowQVLkdIwHu7ix`.
fn is_valid_object_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Maps a non-success Stripe response to a `PaymentError`.
pub(crate) fn error_from_response(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let Ok(parsed) = serde_json::from_str::<StripeErrorBody>(body) else {
        return PaymentError::provider(format!("Stripe API error ({}): {}", status, body));
    };
    let detail = parsed.error;

    let code = match (status.as_u16(), detail.error_type.as_str()) {
        (401, _) => PaymentErrorCode::AuthenticationError,
        (404, _) => PaymentErrorCode::NotFound,
        (429, _) => PaymentErrorCode::RateLimitExceeded,
        (_, "card_error") => PaymentErrorCode::CardDeclined,
        (_, "invalid_request_error") => PaymentErrorCode::InvalidRequest,
        (_, "authentication_error") => PaymentErrorCode::AuthenticationError,
        (_, "rate_limit_error") => PaymentErrorCode::RateLimitExceeded,
        _ => PaymentErrorCode::ProviderError,
    };

    let message = detail
        .message
        .unwrap_or_else(|| format!("Stripe API error ({})", status));
    let error = PaymentError::new(code, message);
    match detail.code {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let mut params = vec![
            ("email".to_string(), request.email),
            ("name".to_string(), request.name),
        ];
        params.extend(
            request
                .metadata
                .into_iter()
                .map(|(key, value)| (format!("metadata[{}]", key), value)),
        );

        let customer: StripeCustomer = self
            .send(
                self.request(Method::POST, self.url("customers")).form(&params),
                "create_customer",
            )
            .await?;

        tracing::info!(customer_id = %customer.id, "Stripe customer created");
        Ok(customer.into())
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, PaymentError> {
        let mut params = vec![
            ("customer", request.customer_id),
            ("items[0][price]", request.price_id),
            ("payment_behavior", "default_incomplete".to_string()),
            ("expand[]", "latest_invoice.payment_intent".to_string()),
        ];

        if let Some(days) = request.trial_days.filter(|d| *d > 0) {
            params.push(("trial_period_days", days.to_string()));
        }

        let subscription: StripeSubscription = self
            .send(
                self.request(Method::POST, self.url("subscriptions")).form(&params),
                "create_subscription",
            )
            .await?;

        tracing::info!(
            subscription_id = %subscription.id,
            status = %subscription.status,
            "Stripe subscription created"
        );
        Ok(subscription.into())
    }

    async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription, PaymentError> {
        let url = self.object_url("subscriptions", subscription_id)?;
        let subscription: StripeSubscription = self
            .send(self.request(Method::GET, url), "get_subscription")
            .await?;

        Ok(subscription.into())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        immediate: bool,
    ) -> Result<Subscription, PaymentError> {
        let url = self.object_url("subscriptions", subscription_id)?;

        let request = if immediate {
            self.request(Method::DELETE, url)
        } else {
            self.request(Method::POST, url)
                .form(&[("cancel_at_period_end", "true")])
        };

        let subscription: StripeSubscription = self.send(request, "cancel_subscription").await?;

        tracing::info!(
            subscription_id = %subscription.id,
            immediate,
            status = %subscription.status,
            "Stripe subscription canceled"
        );
        Ok(subscription.into())
    }

    async fn update_subscription(
        &self,
        request: UpdateSubscriptionRequest,
    ) -> Result<Subscription, PaymentError> {
        let params = [
            ("items[0][id]", request.item_id.as_str()),
            ("items[0][price]", request.price_id.as_str()),
            ("proration_behavior", "create_prorations"),
        ];

        let url = self.object_url("subscriptions", &request.subscription_id)?;
        let subscription: StripeSubscription = self
            .send(
                self.request(Method::POST, url).form(&params),
                "update_subscription",
            )
            .await?;

        Ok(subscription.into())
    }

    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut params = vec![
            ("amount", request.amount.to_string()),
            ("currency", request.currency),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        if let Some(customer_id) = request.customer_id {
            params.push(("customer", customer_id));
        }

        let intent: StripePaymentIntent = self
            .send(
                self.request(Method::POST, self.url("payment_intents")).form(&params),
                "create_payment_intent",
            )
            .await?;

        Ok(intent.into())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        let portal: StripePortalSession = self
            .send(
                self.request(Method::POST, self.url("billing_portal/sessions"))
                    .form(&[("customer", customer_id), ("return_url", return_url)]),
                "create_portal_session",
            )
            .await?;

        Ok(portal.into())
    }

    async fn list_subscriptions(&self, customer_id: &str) -> Result<Vec<Subscription>, PaymentError> {
        let list: StripeList<StripeSubscription> = self
            .send(
                self.request(Method::GET, self.url("subscriptions"))
                    .query(&[("customer", customer_id)]),
                "list_subscriptions",
            )
            .await?;

        Ok(list.data.into_iter().map(Subscription::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("sk_test_123");
        assert_eq!(config.api_base_url(), "https://api.stripe.com");
    }

    #[test]
    fn config_with_base_url_trims_trailing_slash() {
        let config = StripeConfig::new("sk_test_123").with_base_url("http://localhost:12111/");
        assert_eq!(config.api_base_url(), "http://localhost:12111");
    }

    #[test]
    fn config_from_payment_config() {
        let payment = PaymentConfig {
            stripe_api_key: "sk_test_abc".to_string(),
            stripe_webhook_secret: "whsec_abc".to_string(),
            stripe_api_base_url: "http://stripe-mock:12111".to_string(),
            ..Default::default()
        };

        let config = StripeConfig::from_payment_config(&payment);

        assert_eq!(config.api_base_url(), "http://stripe-mock:12111");
    }

    #[test]
    fn config_debug_redacts_key() {
        let config = StripeConfig::new("sk_test_supersecret");
        assert!(!format!("{:?}", config).contains("supersecret"));
    }

    #[test]
    fn adapter_url_joins_paths() {
        let adapter = StripePaymentAdapter::new(StripeConfig::new("sk_test_123"));
        assert_eq!(
            adapter.url("billing_portal/sessions"),
            "https://api.stripe.com/v1/billing_portal/sessions"
        );
    }

    #[test]
    fn error_uses_stripe_message() {
        let body = r#"{"error": {"type": "invalid_request_error", "code": "resource_missing", "message": "No such customer: 'cus_x'"}}"#;

        let err = error_from_response(StatusCode::BAD_REQUEST, body);

        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.message, "No such customer: 'cus_x'");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn card_error_maps_to_card_declined() {
        let body = r#"{"error": {"type": "card_error", "code": "card_declined", "message": "Your card was declined."}}"#;

        let err = error_from_response(StatusCode::PAYMENT_REQUIRED, body);

        assert_eq!(err.code, PaymentErrorCode::CardDeclined);
    }

    #[test]
    fn status_takes_precedence_for_auth_and_rate_limit() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "Invalid API Key provided"}}"#;
        assert_eq!(
            error_from_response(StatusCode::UNAUTHORIZED, body).code,
            PaymentErrorCode::AuthenticationError
        );

        let body = r#"{"error": {"type": "rate_limit_error", "message": "Too many requests"}}"#;
        let err = error_from_response(StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(err.code, PaymentErrorCode::RateLimitExceeded);
    }

    #[test]
    fn unparseable_error_body_is_provider_error() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");

        assert_eq!(err.code, PaymentErrorCode::ProviderError);
        assert!(err.message.contains("bad gateway"));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let adapter = StripePaymentAdapter::new(
            StripeConfig::new("sk_test_123").with_base_url("http://127.0.0.1:1"),
        );

        let err = adapter.get_subscription("sub_123").await.unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::NetworkError);
    }

    #[test]
    fn object_url_appends_id_segment() {
        let adapter = StripePaymentAdapter::new(StripeConfig::new("sk_test_123"));

        let url = adapter.object_url("subscriptions", "sub_1MowQV").unwrap();

        assert_eq!(url.as_str(), "https://api.stripe.com/v1/subscriptions/sub_1MowQV");
    }

    #[test]
    fn object_url_rejects_ids_outside_stripe_alphabet() {
        let adapter = StripePaymentAdapter::new(StripeConfig::new("sk_test_123"));

        let malformed = [
            "",
            "..",
            "../customers/cus_victim",
            "sub_1/cancel",
            "sub 1",
            "sub_1?x=1",
            "sub%2F1",
        ];

        for id in malformed {
            let err = adapter.object_url("subscriptions", id).unwrap_err();
            assert_eq!(err.code, PaymentErrorCode::InvalidRequest, "id {:?}", id);
        }
    }

    #[tokio::test]
    async fn path_traversal_id_is_rejected_before_any_request() {
        // Nothing listens here: a network error would mean a request went out
        let adapter = StripePaymentAdapter::new(
            StripeConfig::new("sk_test_123").with_base_url("http://127.0.0.1:1"),
        );

        let cancel = adapter
            .cancel_subscription("../customers/cus_victim", true)
            .await
            .unwrap_err();
        let get = adapter.get_subscription("../charges").await.unwrap_err();
        let update = adapter
            .update_subscription(UpdateSubscriptionRequest {
                subscription_id: "../customers/cus_victim".to_string(),
                item_id: "si_1".to_string(),
                price_id: "price_pro".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(cancel.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(get.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(update.code, PaymentErrorCode::InvalidRequest);
    }
}
