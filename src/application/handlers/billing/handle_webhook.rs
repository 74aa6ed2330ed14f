//! HandleWebhookHandler - Command handler for Stripe webhook deliveries.

use std::sync::Arc;

use crate::domain::billing::{DispatchOutcome, WebhookDispatcher, WebhookError, WebhookVerifier};

/// Command to handle a webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Value of the `Stripe-Signature` header.
    pub signature: String,
}

/// Handler for webhook deliveries.
///
/// Verification runs first and fails closed: when it fails, no handler is
/// invoked. A verified event is always dispatched, and dispatch itself never
/// fails, so a verified delivery always yields an outcome.
pub struct HandleWebhookHandler {
    verifier: WebhookVerifier,
    dispatcher: Arc<WebhookDispatcher>,
}

impl HandleWebhookHandler {
    pub fn new(verifier: WebhookVerifier, dispatcher: Arc<WebhookDispatcher>) -> Self {
        Self {
            verifier,
            dispatcher,
        }
    }

    pub async fn handle(&self, cmd: HandleWebhookCommand) -> Result<DispatchOutcome, WebhookError> {
        let event = self
            .verifier
            .verify(&cmd.payload, &cmd.signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook verification failed");
                e
            })?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Webhook verified"
        );

        Ok(self.dispatcher.dispatch(&event).await)
    }
}
