// Core relay module - wire events, storage ports, and the per-message
// engine that drives delivery, detection, and escalation.

pub mod relay_models;
pub mod relay_service;

pub use relay_models::*;
pub use relay_service::*;
