//! Batch mode: answer many questions with one shared cache

pub mod runner;

pub use runner::{BatchDefaults, BatchRunner, BatchSummary, parse_batch_line};
