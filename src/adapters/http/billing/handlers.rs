//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    BillingError, CancelSubscriptionCommand, CancelSubscriptionHandler, CreateCustomerCommand,
    CreateCustomerHandler, CreatePaymentIntentCommand, CreatePaymentIntentHandler,
    CreatePortalSessionCommand, CreatePortalSessionHandler, CreateSubscriptionCommand,
    CreateSubscriptionHandler, HandleWebhookCommand, HandleWebhookHandler,
    ListSubscriptionsHandler, ListSubscriptionsQuery,
};
use crate::domain::billing::{PriceCatalog, WebhookDispatcher, WebhookError, WebhookVerifier};
use crate::ports::PaymentProvider;

use super::dto::{
    CancelSubscriptionParams, CreateCustomerRequest, CreatePaymentIntentRequest,
    CreateSubscriptionRequest, CustomerCreatedResponse, ErrorResponse, HealthResponse,
    PaymentIntentCreatedResponse, PortalSessionParams, PortalSessionResponse,
    SubscriptionCanceledResponse, SubscriptionCreatedResponse, SubscriptionListResponse,
    SubscriptionView, WebhookResponse,
};

/// Header carrying the Stripe webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "payment-api";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request. Holds no mutable state; configuration is fixed
/// at startup.
#[derive(Clone)]
pub struct BillingAppState {
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub prices: PriceCatalog,
    pub webhook_verifier: WebhookVerifier,
    pub webhook_dispatcher: Arc<WebhookDispatcher>,
}

impl BillingAppState {
    /// State with the default price catalog and the standard dispatch table.
    pub fn new(payment_provider: Arc<dyn PaymentProvider>, webhook_verifier: WebhookVerifier) -> Self {
        Self {
            payment_provider,
            prices: PriceCatalog::new(),
            webhook_verifier,
            webhook_dispatcher: Arc::new(WebhookDispatcher::standard()),
        }
    }

    pub fn with_prices(mut self, prices: PriceCatalog) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: WebhookDispatcher) -> Self {
        self.webhook_dispatcher = Arc::new(dispatcher);
        self
    }

    /// Create handlers on demand from the shared state.
    pub fn create_customer_handler(&self) -> CreateCustomerHandler {
        CreateCustomerHandler::new(self.payment_provider.clone())
    }

    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(self.payment_provider.clone(), self.prices.clone())
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.payment_provider.clone())
    }

    pub fn create_payment_intent_handler(&self) -> CreatePaymentIntentHandler {
        CreatePaymentIntentHandler::new(self.payment_provider.clone())
    }

    pub fn create_portal_session_handler(&self) -> CreatePortalSessionHandler {
        CreatePortalSessionHandler::new(self.payment_provider.clone())
    }

    pub fn list_subscriptions_handler(&self) -> ListSubscriptionsHandler {
        ListSubscriptionsHandler::new(self.payment_provider.clone())
    }

    pub fn webhook_handler(&self) -> HandleWebhookHandler {
        HandleWebhookHandler::new(self.webhook_verifier.clone(), self.webhook_dispatcher.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness check
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// GET /api/v1/customers/:customer_id/subscriptions - List a customer's subscriptions
pub async fn list_subscriptions(
    State(state): State<BillingAppState>,
    Path(customer_id): Path<String>,
) -> impl IntoResponse {
    let subscriptions = state
        .list_subscriptions_handler()
        .handle(ListSubscriptionsQuery { customer_id })
        .await;

    Json(SubscriptionListResponse {
        subscriptions: subscriptions.into_iter().map(SubscriptionView::from).collect(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST/DELETE endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/customers - Create a customer
pub async fn create_customer(
    State(state): State<BillingAppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    request.validate().map_err(BillingApiError::Validation)?;

    let cmd = CreateCustomerCommand {
        email: request.email,
        name: request.name,
    };

    let result = state.create_customer_handler().handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(CustomerCreatedResponse::from(result.customer)),
    ))
}

/// POST /api/v1/subscriptions - Subscribe a customer to a tier
pub async fn create_subscription(
    State(state): State<BillingAppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let cmd = CreateSubscriptionCommand {
        customer_id: request.customer_id,
        tier: request.tier,
        trial_days: request.trial_days,
    };

    let result = state.create_subscription_handler().handle(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionCreatedResponse::from(result.subscription)),
    ))
}

/// DELETE /api/v1/subscriptions/:subscription_id - Cancel a subscription
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    Path(subscription_id): Path<String>,
    Query(params): Query<CancelSubscriptionParams>,
) -> Result<impl IntoResponse, BillingApiError> {
    let cmd = CancelSubscriptionCommand {
        subscription_id,
        immediate: params.immediate,
    };

    let result = state.cancel_subscription_handler().handle(cmd).await?;

    Ok(Json(SubscriptionCanceledResponse::from(result.subscription)))
}

/// POST /api/v1/payment-intents - Create a one-off payment
pub async fn create_payment_intent(
    State(state): State<BillingAppState>,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let cmd = CreatePaymentIntentCommand {
        amount: request.amount,
        currency: Some(request.currency),
        customer_id: request.customer_id,
    };

    let result = state.create_payment_intent_handler().handle(cmd).await?;

    Ok(Json(PaymentIntentCreatedResponse {
        success: true,
        client_secret: result.payment_intent.client_secret,
        payment_intent_id: result.payment_intent.id,
    }))
}

/// POST /api/v1/customers/:customer_id/portal - Open a billing portal session
pub async fn create_portal_session(
    State(state): State<BillingAppState>,
    Path(customer_id): Path<String>,
    Query(params): Query<PortalSessionParams>,
) -> Result<impl IntoResponse, BillingApiError> {
    let cmd = CreatePortalSessionCommand {
        customer_id,
        return_url: params.return_url,
    };

    let result = state.create_portal_session_handler().handle(cmd).await?;

    Ok(Json(PortalSessionResponse {
        success: true,
        url: result.session.url,
    }))
}

/// POST /api/v1/webhooks/stripe - Handle Stripe webhook events
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(BillingApiError::Webhook(WebhookError::MissingSignature))?;

    let cmd = HandleWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    let outcome = state
        .webhook_handler()
        .handle(cmd)
        .await
        .map_err(BillingApiError::Webhook)?;

    Ok(Json(WebhookResponse::from(outcome)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum BillingApiError {
    /// A billing operation failed.
    Billing(BillingError),
    /// Webhook signature missing or not verifiable.
    Webhook(WebhookError),
    /// Request body failed validation.
    Validation(String),
}

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Webhook(e) => Self::Webhook(e),
            other => Self::Billing(other),
        }
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            BillingApiError::Billing(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(err.code(), err.to_string()),
            ),
            BillingApiError::Webhook(WebhookError::MissingSignature) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("missing_signature", WebhookError::MissingSignature.to_string()),
            ),
            // Verification details stay in the logs
            BillingApiError::Webhook(_) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("invalid_signature", WebhookError::InvalidSignature.to_string()),
            ),
            BillingApiError::Validation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("validation_failed", message),
            ),
        };

        (status, Json(body)).into_response()
    }
}
