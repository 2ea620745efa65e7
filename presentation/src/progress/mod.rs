//! Progress reporters for resolution rounds

pub mod reporter;

pub use reporter::{ProgressReporter, SimpleProgress};
