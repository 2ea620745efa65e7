//! Answer cache adapters

mod memory;

pub use memory::{Clock, MemoryAnswerCache, SystemClock};
