//! Infrastructure layer for exam-ensemble
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP provider adapters, the in-memory answer
//! cache, configuration file loading and the JSONL audit log.

pub mod cache;
pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use cache::{Clock, MemoryAnswerCache, SystemClock};
pub use config::{ConfigError, ConfigLoader, FileConfig, FileOutputConfig};
pub use logging::JsonlResolutionLogger;
pub use providers::{
    GeminiAdapter, OpenAiAdapter, ProviderAdapter, ProviderKind, RoutingGateway,
    build_routing_gateway,
};
