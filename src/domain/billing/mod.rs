//! Billing domain - Subscription tiers and Stripe webhook handling.
//!
//! Webhook flow: [`WebhookVerifier`] authenticates the raw body and yields a
//! [`WebhookEvent`]; [`WebhookDispatcher`] routes it to a handler that reports
//! a [`WebhookAction`].

mod tier;
mod webhook_dispatcher;
mod webhook_errors;
mod webhook_event;
mod webhook_verifier;

pub use tier::{BillingInterval, PriceCatalog, PricingPlan, SubscriptionTier};
pub use webhook_dispatcher::{
    ActionHandler, DispatchOutcome, Severity, WebhookAction, WebhookDispatcher,
    WebhookEventHandler,
};
pub use webhook_errors::WebhookError;
pub use webhook_event::{WebhookEvent, WebhookEventData};
pub use webhook_verifier::{
    generate_signature_header, SignatureHeader, WebhookVerifier, DEFAULT_TOLERANCE_SECS,
};

#[cfg(test)]
pub use webhook_event::WebhookEventBuilder;
