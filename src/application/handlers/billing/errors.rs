//! Errors returned by billing command handlers.

use thiserror::Error;

use crate::domain::billing::WebhookError;
use crate::ports::{PaymentError, PaymentErrorCode};

/// Failure of a billing operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BillingError {
    /// The payment provider rejected or failed the call.
    #[error("{}", .0.message)]
    Provider(#[from] PaymentError),

    /// The webhook could not be verified.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// The subscription has no item whose price could be replaced.
    #[error("Subscription {0} has no items")]
    NoSubscriptionItem(String),
}

impl BillingError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            BillingError::Provider(err) => err.code.as_str(),
            BillingError::Webhook(_) => "invalid_webhook",
            BillingError::NoSubscriptionItem(_) => PaymentErrorCode::InvalidRequest.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_provider_message_only() {
        let err: BillingError = PaymentError::invalid_request("No such customer: 'cus_x'").into();
        assert_eq!(err.to_string(), "No such customer: 'cus_x'");
        assert_eq!(err.code(), "invalid_request");
    }

    #[test]
    fn webhook_error_is_transparent() {
        let err: BillingError = WebhookError::InvalidSignature.into();
        assert_eq!(err.to_string(), "Invalid signature");
        assert_eq!(err.code(), "invalid_webhook");
    }
}
