//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe integration, including:
//! - Customer management
//! - Subscription lifecycle
//! - Payment intents
//! - Billing portal sessions
//!
//! Webhook verification lives in `domain::billing`, since it only needs the
//! signing secret and never calls the Stripe API.
//!
//! # Security
//!
//! - The API key is held as `secrecy::SecretString` and redacted in debug output

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use api_types::{
    Expandable, StripeCustomer, StripeErrorBody, StripeErrorDetail, StripeInvoice, StripeList,
    StripePaymentIntent, StripePortalSession, StripePrice, StripeSubscription,
    StripeSubscriptionItem,
};
pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
