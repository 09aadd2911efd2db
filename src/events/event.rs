//! # Runtime events emitted by the scheduler loop and the shutdown coordinator.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Dispatch events**: launches and the outcomes they produce
//! - **Contract events**: deliveries that broke the outcome contract
//! - **Phase events**: `Running → Draining → Stopped` transitions
//!
//! The [`Event`] struct carries additional metadata such as timestamps, dispatch
//! ids, in-flight counts and error details.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events are emitted from a single place at a time (the loop, then the coordinator),
//! so subscribers observe them in `seq` order.
//!
//! ## Example
//! ```rust
//! use pollvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::OutcomeFailed)
//!     .with_dispatch(3)
//!     .with_reason("status not 200 (503)")
//!     .with_label("dispatch_unexpected_status");
//!
//! assert_eq!(ev.kind, EventKind::OutcomeFailed);
//! assert_eq!(ev.dispatch, Some(3));
//! assert_eq!(ev.reason.as_deref(), Some("status not 200 (503)"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::Summary;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Dispatch events ===
    /// A dispatch was launched.
    ///
    /// Sets:
    /// - `dispatch`: dispatch id (1-based)
    /// - `cause`: `Startup` or `Tick`
    /// - `in_flight`: in-flight count including this dispatch
    /// - `timeout_ms`: per-attempt timeout (ms)
    DispatchLaunched,

    /// A success outcome was consumed.
    ///
    /// Sets:
    /// - `dispatch`: dispatch id
    /// - `value`: extracted field value
    OutcomeSucceeded,

    /// A failure outcome was consumed.
    ///
    /// Sets:
    /// - `dispatch`: dispatch id
    /// - `reason`: failure message
    /// - `label`: stable failure label
    OutcomeFailed,

    // === Contract events ===
    /// A dispatch delivered after the outcome channels were closed.
    ///
    /// Sets:
    /// - `dispatch`: dispatch id
    /// - `reason`: violation message
    DeliveryRejected,

    /// A dispatch task panicked and produced no outcome.
    ///
    /// Sets:
    /// - `reason`: panic/join message
    DispatchPanicked,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic message
    SubscriberPanicked,

    // === Phase events ===
    /// Termination requested (`Running → Draining`).
    ///
    /// Sets:
    /// - `in_flight`: dispatches still to be joined
    ShutdownRequested,

    /// Every in-flight dispatch was joined.
    ///
    /// Sets:
    /// - `in_flight`: always `0`
    DrainCompleted,

    /// Grace period elapsed; remaining dispatches were aborted.
    ///
    /// Sets:
    /// - `in_flight`: number of abandoned dispatches
    /// - `timeout_ms`: configured grace (ms)
    GraceExceeded,

    /// Outcome channels closed and the service stopped (`Draining → Stopped`).
    ///
    /// Sets:
    /// - `summary`: final counts
    Stopped,
}

/// Why a dispatch was launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchCause {
    /// The immediate dispatch at loop start.
    Startup,
    /// An interval tick.
    Tick,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Dispatch id, if applicable.
    pub dispatch: Option<u64>,
    /// Launch cause (launch events only).
    pub cause: Option<LaunchCause>,
    /// In-flight dispatch count at the time of the event.
    pub in_flight: Option<usize>,
    /// Timeout or grace in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Success value.
    pub value: Option<Arc<str>>,
    /// Human-readable reason (errors, violations, panics).
    pub reason: Option<Arc<str>>,
    /// Stable snake_case error label.
    pub label: Option<&'static str>,
    /// Final counts (stop event only).
    pub summary: Option<Summary>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            dispatch: None,
            cause: None,
            in_flight: None,
            timeout_ms: None,
            value: None,
            reason: None,
            label: None,
            summary: None,
        }
    }

    /// Attaches a dispatch id.
    #[inline]
    pub fn with_dispatch(mut self, id: u64) -> Self {
        self.dispatch = Some(id);
        self
    }

    /// Attaches a launch cause.
    #[inline]
    pub fn with_cause(mut self, cause: LaunchCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attaches an in-flight count.
    #[inline]
    pub fn with_in_flight(mut self, n: usize) -> Self {
        self.in_flight = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a success value.
    #[inline]
    pub fn with_value(mut self, value: impl Into<Arc<str>>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a stable error label.
    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Attaches the final summary.
    #[inline]
    pub fn with_summary(mut self, summary: Summary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// Returns `true` for [`EventKind::SubscriberPanicked`].
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }

    /// Returns `true` for `Running → Draining → Stopped` transition events.
    #[inline]
    pub fn is_phase(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ShutdownRequested
                | EventKind::DrainCompleted
                | EventKind::GraceExceeded
                | EventKind::Stopped
        )
    }
}
