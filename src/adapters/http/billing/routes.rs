//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for the billing API and wires
//! each route to its handler.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    cancel_subscription, create_customer, create_payment_intent, create_portal_session,
    create_subscription, handle_stripe_webhook, health, list_subscriptions, BillingAppState,
};

/// Create the billing API routes.
///
/// # Routes
///
/// - `POST /customers` - Create a customer
/// - `GET /customers/:customer_id/subscriptions` - List a customer's subscriptions
/// - `POST /customers/:customer_id/portal` - Open a billing portal session
/// - `POST /subscriptions` - Subscribe a customer to a tier
/// - `DELETE /subscriptions/:subscription_id` - Cancel a subscription
/// - `POST /payment-intents` - Create a one-off payment
/// - `POST /webhooks/stripe` - Handle Stripe webhooks (signature verified)
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/customers", post(create_customer))
        .route(
            "/customers/:customer_id/subscriptions",
            get(list_subscriptions),
        )
        .route("/customers/:customer_id/portal", post(create_portal_session))
        .route("/subscriptions", post(create_subscription))
        .route("/subscriptions/:subscription_id", delete(cancel_subscription))
        .route("/payment-intents", post(create_payment_intent))
        .route("/webhooks/stripe", post(handle_stripe_webhook))
}

/// Create the complete billing router.
///
/// Mounts the API under `/api/v1` and the health check at `/health`.
///
/// # Example
///
/// ```ignore
/// let state = BillingAppState::new(provider, verifier);
/// let app = billing_router().with_state(state);
/// ```
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/api/v1", billing_routes())
        .route("/health", get(health))
}
