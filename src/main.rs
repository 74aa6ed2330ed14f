use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use payment_gateway::adapters::http::{billing_router, BillingAppState};
use payment_gateway::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use payment_gateway::config::{AppConfig, LogFormat, PaymentConfig, ServerConfig};
use payment_gateway::domain::billing::{PriceCatalog, SubscriptionTier, WebhookVerifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    let provider = StripePaymentAdapter::new(StripeConfig::from_payment_config(&config.payment));
    let verifier = WebhookVerifier::new(config.payment.stripe_webhook_secret.clone())
        .with_tolerance(config.payment.webhook_tolerance_secs);

    let state = BillingAppState::new(Arc::new(provider), verifier)
        .with_prices(price_catalog(&config.payment));

    let app: Router = billing_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "payment gateway listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    match server.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn price_catalog(payment: &PaymentConfig) -> PriceCatalog {
    let configured = [
        (SubscriptionTier::Starter, &payment.starter_price_id),
        (SubscriptionTier::Pro, &payment.pro_price_id),
        (SubscriptionTier::Enterprise, &payment.enterprise_price_id),
    ];

    configured
        .into_iter()
        .fold(PriceCatalog::new(), |catalog, (tier, price_id)| match price_id {
            Some(id) => catalog.with_price(tier, id.clone()),
            None => catalog,
        })
}

// No configured origins means any origin outside production.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() && !server.is_production() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}
