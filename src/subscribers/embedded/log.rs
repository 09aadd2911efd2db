//! # LogWriter: tracing-backed event renderer
//!
//! A subscriber that renders every incoming [`Event`] as exactly one
//! [`tracing`] record. Install any `tracing` subscriber to choose the sink.
//!
//! ## Example output (`fmt` layer)
//! ```text
//! INFO  pollvisor: launch dispatch=1 cause=Startup in_flight=1 timeout_ms=1000
//! INFO  pollvisor: got value dispatch=1 value=5c4d...
//! WARN  pollvisor: got error dispatch=2 label=dispatch_timeout err=request timed out after 1s
//! INFO  pollvisor: shutdown requested in_flight=1
//! INFO  pollvisor: drain completed
//! INFO  pollvisor: stopped launched=2 succeeded=1 failed=1 abandoned=0
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::DispatchLaunched => {
                info!(
                    target: "pollvisor",
                    dispatch = e.dispatch,
                    cause = ?e.cause,
                    in_flight = e.in_flight,
                    timeout_ms = e.timeout_ms,
                    "launch"
                );
            }
            EventKind::OutcomeSucceeded => {
                info!(
                    target: "pollvisor",
                    dispatch = e.dispatch,
                    value = e.value.as_deref().unwrap_or_default(),
                    "got value"
                );
            }
            EventKind::OutcomeFailed => {
                warn!(
                    target: "pollvisor",
                    dispatch = e.dispatch,
                    label = e.label.unwrap_or("unknown"),
                    err = e.reason.as_deref().unwrap_or_default(),
                    "got error"
                );
            }
            EventKind::DeliveryRejected => {
                error!(
                    target: "pollvisor",
                    dispatch = e.dispatch,
                    err = e.reason.as_deref().unwrap_or_default(),
                    "delivery after close"
                );
            }
            EventKind::DispatchPanicked => {
                error!(
                    target: "pollvisor",
                    info = e.reason.as_deref().unwrap_or("unknown"),
                    "dispatch panicked"
                );
            }
            EventKind::SubscriberPanicked => {
                error!(
                    target: "pollvisor",
                    info = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber panicked"
                );
            }
            EventKind::ShutdownRequested => {
                info!(target: "pollvisor", in_flight = e.in_flight, "shutdown requested");
            }
            EventKind::DrainCompleted => {
                info!(target: "pollvisor", "drain completed");
            }
            EventKind::GraceExceeded => {
                warn!(
                    target: "pollvisor",
                    abandoned = e.in_flight,
                    grace_ms = e.timeout_ms,
                    "grace exceeded"
                );
            }
            EventKind::Stopped => match &e.summary {
                Some(s) => info!(
                    target: "pollvisor",
                    launched = s.launched,
                    succeeded = s.succeeded,
                    failed = s.failed,
                    timeouts = s.timeouts,
                    drained = s.drained,
                    abandoned = s.abandoned,
                    rejected = s.rejected,
                    panicked = s.panicked,
                    "stopped"
                ),
                None => info!(target: "pollvisor", "stopped"),
            },
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
