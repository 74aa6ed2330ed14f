//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing API.
//! Successful responses carry `"success": true` next to their payload; errors
//! carry `"success": false` with a code and message.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::DEFAULT_CURRENCY;
use crate::domain::billing::{DispatchOutcome, SubscriptionTier, WebhookAction};
use crate::ports::{Customer, Subscription};

/// Message returned for event types without a handler.
pub const UNHANDLED_EVENT_MESSAGE: &str = "Event received but not processed";

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerRequest {
    pub email: String,
    pub name: String,
}

impl CreateCustomerRequest {
    /// Rejects requests whose email is not plausibly an address.
    pub fn validate(&self) -> Result<(), String> {
        if is_valid_email(&self.email) {
            Ok(())
        } else {
            Err(format!("Invalid email address: {}", self.email))
        }
    }
}

/// Basic shape check: one `@`, non-empty local part, dotted domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Request to subscribe a customer to a tier.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub customer_id: String,
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub trial_days: Option<u32>,
}

/// Request to create a one-off payment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub customer_id: Option<String>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Query parameters for subscription cancellation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelSubscriptionParams {
    /// Cancel now instead of at period end.
    #[serde(default)]
    pub immediate: bool,
}

/// Query parameters for portal session creation.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalSessionParams {
    pub return_url: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Customer as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub metadata: std::collections::HashMap<String, String>,
    pub created: i64,
}

impl From<Customer> for CustomerView {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            email: c.email,
            name: c.name,
            metadata: c.metadata,
            created: c.created_at,
        }
    }
}

/// Response for customer creation.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreatedResponse {
    pub success: bool,
    pub customer_id: String,
    pub customer: CustomerView,
}

impl From<Customer> for CustomerCreatedResponse {
    fn from(customer: Customer) -> Self {
        Self {
            success: true,
            customer_id: customer.id.clone(),
            customer: customer.into(),
        }
    }
}

/// Response for subscription creation.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCreatedResponse {
    pub success: bool,
    pub subscription_id: String,
    /// Absent when a trial defers the first payment.
    pub client_secret: Option<String>,
    pub status: String,
}

impl From<Subscription> for SubscriptionCreatedResponse {
    fn from(s: Subscription) -> Self {
        Self {
            success: true,
            status: s.status.to_string(),
            subscription_id: s.id,
            client_secret: s.client_secret,
        }
    }
}

/// Response for subscription cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionCanceledResponse {
    pub success: bool,
    pub subscription_id: String,
    pub status: String,
    pub canceled_at: Option<i64>,
}

impl From<Subscription> for SubscriptionCanceledResponse {
    fn from(s: Subscription) -> Self {
        Self {
            success: true,
            status: s.status.to_string(),
            subscription_id: s.id,
            canceled_at: s.canceled_at,
        }
    }
}

/// Response for payment intent creation.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentCreatedResponse {
    pub success: bool,
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
}

/// Response for portal session creation.
#[derive(Debug, Clone, Serialize)]
pub struct PortalSessionResponse {
    pub success: bool,
    pub url: String,
}

/// Subscription entry in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub id: String,
    pub customer_id: String,
    pub status: String,
    pub price_id: Option<String>,
    pub current_period_start: i64,
    pub current_period_end: i64,
    pub trial_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<i64>,
}

impl From<Subscription> for SubscriptionView {
    fn from(s: Subscription) -> Self {
        Self {
            status: s.status.to_string(),
            id: s.id,
            customer_id: s.customer_id,
            price_id: s.price_id,
            current_period_start: s.current_period_start,
            current_period_end: s.current_period_end,
            trial_end: s.trial_end,
            cancel_at_period_end: s.cancel_at_period_end,
            canceled_at: s.canceled_at,
        }
    }
}

/// Response for listing a customer's subscriptions.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionView>,
}

/// Response for a verified webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<WebhookAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<DispatchOutcome> for WebhookResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Handled { action, .. } => Self {
                success: true,
                action: Some(action),
                message: None,
                error: None,
            },
            DispatchOutcome::Unhandled { .. } => Self {
                success: true,
                action: None,
                message: Some(UNHANDLED_EVENT_MESSAGE.to_string()),
                error: None,
            },
            DispatchOutcome::Failed { error, .. } => Self {
                success: false,
                action: None,
                message: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Response for the health check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: error_code.into(),
            error: message.into(),
        }
    }
}
