//! Stripe API response types.
//!
//! These types mirror the JSON Stripe returns. Only the fields the adapter
//! reads are modeled; unknown fields are ignored.

use std::collections::HashMap;

use serde::Deserialize;

use crate::ports::{Customer, PaymentIntent, PortalSession, Subscription, SubscriptionStatus};

/// A field Stripe returns either as an ID or, when expanded, as the object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Object(Box<T>),
    Id(String),
}

impl<T> Expandable<T> {
    /// The expanded object, if the field was expanded.
    pub fn as_object(&self) -> Option<&T> {
        match self {
            Expandable::Object(obj) => Some(obj),
            Expandable::Id(_) => None,
        }
    }
}

/// Stripe customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    /// Customer ID (cus_xxx format).
    pub id: String,

    /// Customer email.
    pub email: Option<String>,

    /// Customer name.
    pub name: Option<String>,

    /// Creation time (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl From<StripeCustomer> for Customer {
    fn from(c: StripeCustomer) -> Self {
        Customer {
            id: c.id,
            email: c.email,
            name: c.name,
            metadata: c.metadata,
            created_at: c.created,
        }
    }
}

/// Stripe subscription object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    /// Subscription ID (sub_xxx format).
    pub id: String,

    /// Customer ID.
    pub customer: String,

    /// Subscription status.
    pub status: String,

    #[serde(default)]
    pub current_period_start: i64,

    #[serde(default)]
    pub current_period_end: i64,

    pub trial_end: Option<i64>,

    /// Whether subscription will cancel at period end.
    #[serde(default)]
    pub cancel_at_period_end: bool,

    /// When the subscription was canceled.
    pub canceled_at: Option<i64>,

    /// Subscription items (prices).
    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,

    /// Latest invoice; expanded on create.
    pub latest_invoice: Option<Expandable<StripeInvoice>>,
}

impl StripeSubscription {
    fn client_secret(&self) -> Option<String> {
        self.latest_invoice
            .as_ref()?
            .as_object()?
            .payment_intent
            .as_ref()?
            .as_object()?
            .client_secret
            .clone()
    }
}

impl From<StripeSubscription> for Subscription {
    fn from(s: StripeSubscription) -> Self {
        let client_secret = s.client_secret();
        let first_item = s.items.data.first();

        Subscription {
            item_id: first_item.map(|item| item.id.clone()),
            price_id: first_item.map(|item| item.price.id.clone()),
            status: SubscriptionStatus::from_provider(&s.status),
            id: s.id,
            customer_id: s.customer,
            current_period_start: s.current_period_start,
            current_period_end: s.current_period_end,
            trial_end: s.trial_end,
            cancel_at_period_end: s.cancel_at_period_end,
            canceled_at: s.canceled_at,
            client_secret,
        }
    }
}

/// Paginated list wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            has_more: false,
        }
    }
}

/// Subscription item.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    /// Item ID (si_xxx format).
    pub id: String,

    pub price: StripePrice,
}

/// Stripe price reference.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    /// Price ID (price_xxx format).
    pub id: String,
}

/// Stripe invoice, only as far as subscription creation needs it.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeInvoice {
    pub id: String,

    pub payment_intent: Option<Expandable<StripePaymentIntent>>,
}

/// Stripe payment intent object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    /// Payment intent ID (pi_xxx format).
    pub id: String,

    #[serde(default)]
    pub amount: i64,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub status: String,

    pub customer: Option<String>,

    pub client_secret: Option<String>,
}

impl From<StripePaymentIntent> for PaymentIntent {
    fn from(pi: StripePaymentIntent) -> Self {
        PaymentIntent {
            id: pi.id,
            amount: pi.amount,
            currency: pi.currency,
            status: pi.status,
            customer_id: pi.customer,
            client_secret: pi.client_secret,
        }
    }
}

/// Billing portal session.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePortalSession {
    pub id: String,
    pub url: String,
}

impl From<StripePortalSession> for PortalSession {
    fn from(p: StripePortalSession) -> Self {
        PortalSession { id: p.id, url: p.url }
    }
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// Error category (card_error, invalid_request_error, api_error, ...).
    #[serde(rename = "type", default)]
    pub error_type: String,

    pub code: Option<String>,

    pub message: Option<String>,
}
