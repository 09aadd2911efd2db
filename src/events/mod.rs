//! Runtime events: types only.
//!
//! This module groups the event **data model** emitted by the scheduler loop
//! and the shutdown coordinator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`LaunchCause`] why a dispatch was launched
//!
//! ## Quick reference
//! - **Publishers**: the scheduler loop (launches, outcomes, contract events) and
//!   the coordinator (phase events), both through
//!   [`SubscriberSet::emit`](crate::SubscriberSet::emit).
//! - **Consumers**: user [`Subscribe`](crate::Subscribe) implementations and the
//!   built-in `LogWriter`.

mod event;

pub use event::{Event, EventKind, LaunchCause};
