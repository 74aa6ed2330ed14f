//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.

pub mod billing;

// Re-export key types for convenience
pub use billing::{billing_router, BillingAppState};
