// Core escalation module - per-victim thresholds and the severity policy.
// Following the same pattern as the other core modules.

pub mod escalation_models;
pub mod escalation_service;

pub use escalation_models::*;
pub use escalation_service::*;
