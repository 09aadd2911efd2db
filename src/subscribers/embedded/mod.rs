//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders events as `tracing` records.

mod log;

pub use log::LogWriter;
