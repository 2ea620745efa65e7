//! Port definitions (interfaces) for the application layer
//!
//! Ports define the boundaries between the application and
//! external systems (infrastructure adapters, presentation).

pub mod answer_cache;
pub mod llm_gateway;
pub mod progress;
pub mod resolution_logger;
