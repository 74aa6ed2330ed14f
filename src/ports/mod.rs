//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - Stripe customers, subscriptions, payment intents and portal

mod payment_provider;

pub use payment_provider::{
    CreateCustomerRequest, CreatePaymentIntentRequest, CreateSubscriptionRequest, Customer,
    PaymentError, PaymentErrorCode, PaymentIntent, PaymentProvider, PortalSession, Subscription,
    SubscriptionStatus, UpdateSubscriptionRequest,
};
