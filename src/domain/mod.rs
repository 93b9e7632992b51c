// Domain layer: check models and the orchestrator port. Adapters live in crate::adapters.

pub mod model;
pub mod ports;
