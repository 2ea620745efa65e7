//! Logging infrastructure: the resolution audit log.
//!
//! Provides [`JsonlResolutionLogger`], a JSONL file writer that implements
//! the [`ResolutionLogger`](ensemble_application::ResolutionLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlResolutionLogger;
