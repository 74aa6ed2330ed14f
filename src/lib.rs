//! Payment Gateway - HTTP façade over Stripe.
//!
//! Exposes customers, subscriptions, payment intents and the billing portal
//! as a small REST API, and accepts signed Stripe webhook deliveries which are
//! verified and dispatched to per-event handlers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
