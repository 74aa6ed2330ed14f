//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST API
//! - `stripe` - Stripe payment provider

pub mod http;
pub mod stripe;

pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
