//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `billing` - Subscription tiers, webhook verification and event dispatch

pub mod billing;
