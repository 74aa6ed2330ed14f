//! Billing handlers.
//!
//! Command and query handlers wrapping Stripe operations. Each handler makes
//! at most one provider call per request, except `UpdateSubscriptionHandler`
//! which reads the subscription before changing it.
//!
//! ## Commands
//! - Creating customers, subscriptions, payment intents and portal sessions
//! - Cancelling and re-pricing subscriptions
//! - Verifying and dispatching webhooks
//!
//! ## Queries
//! - Listing a customer's subscriptions

mod cancel_subscription;
mod create_customer;
mod create_payment_intent;
mod create_portal_session;
mod create_subscription;
mod errors;
mod handle_webhook;
mod list_subscriptions;
mod update_subscription;

pub use errors::BillingError;

// Commands
pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use create_customer::{CreateCustomerCommand, CreateCustomerHandler, CreateCustomerResult};
pub use create_payment_intent::{
    CreatePaymentIntentCommand, CreatePaymentIntentHandler, CreatePaymentIntentResult,
    DEFAULT_CURRENCY,
};
pub use create_portal_session::{
    CreatePortalSessionCommand, CreatePortalSessionHandler, CreatePortalSessionResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use handle_webhook::{HandleWebhookCommand, HandleWebhookHandler};
pub use update_subscription::{
    UpdateSubscriptionCommand, UpdateSubscriptionHandler, UpdateSubscriptionResult,
};

// Queries
pub use list_subscriptions::{ListSubscriptionsHandler, ListSubscriptionsQuery};
