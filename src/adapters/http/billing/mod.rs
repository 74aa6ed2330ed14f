//! HTTP adapter for billing endpoints.
//!
//! Exposes the billing application layer via REST API:
//! - `POST /api/v1/customers` - Create a customer
//! - `POST /api/v1/subscriptions` - Create a subscription
//! - `DELETE /api/v1/subscriptions/:id` - Cancel a subscription
//! - `POST /api/v1/payment-intents` - Create a payment intent
//! - `POST /api/v1/webhooks/stripe` - Handle Stripe webhooks
//! - `GET /api/v1/customers/:id/subscriptions` - List subscriptions
//! - `POST /api/v1/customers/:id/portal` - Billing portal session
//! - `GET /health` - Health check

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{BillingApiError, BillingAppState, SERVICE_NAME, STRIPE_SIGNATURE_HEADER};
pub use routes::{billing_router, billing_routes};
