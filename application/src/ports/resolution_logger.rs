//! Port for the structured resolution audit log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port records every provider result
//! and every final resolution in a machine-readable form (JSONL).

use serde_json::Value;

/// A structured audit event.
pub struct ResolutionEvent {
    /// Event type identifier (e.g. "provider_result", "resolution").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ResolutionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for writing audit events.
///
/// `log` is synchronous and infallible: a broken audit log must never
/// change the outcome of a resolution.
pub trait ResolutionLogger: Send + Sync {
    fn log(&self, event: ResolutionEvent);
}

/// No-op implementation for tests and when the audit log is disabled.
pub struct NoResolutionLogger;

impl ResolutionLogger for NoResolutionLogger {
    fn log(&self, _event: ResolutionEvent) {}
}
