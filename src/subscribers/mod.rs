//! # Event subscribers for the pollvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling runtime events.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler loop / Coordinator ── emit(&Event) ──► SubscriberSet
//!                                                       │
//!                                                  ┌────┴────┬─────────┐
//!                                                  ▼         ▼         ▼
//!                                              LogWriter  Metrics   Custom ...
//! ```
//!
//! Delivery is inline and ordered: one event becomes exactly one call per
//! subscriber, which is what keeps logging at "one line per event, no loss".

#[cfg(feature = "logging")]
mod embedded;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
