//! Final accounting of a service run.

use crate::core::outcome::Outcome;
use crate::error::ErrorClass;

/// Counts reported when the service stops.
///
/// Every launched dispatch lands in exactly one of `succeeded`, `failed`,
/// `abandoned`, `rejected` or `panicked` (see [`Summary::is_balanced`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Dispatches launched (startup + ticks).
    pub launched: u64,
    /// Success outcomes consumed.
    pub succeeded: u64,
    /// Failure outcomes consumed.
    pub failed: u64,
    /// Failures of the transport class (timeouts included).
    pub transport: u64,
    /// Failures of the protocol class.
    pub protocol: u64,
    /// Failures of the decode class.
    pub decode: u64,
    /// Transport failures that were per-attempt timeouts.
    pub timeouts: u64,
    /// Outcomes consumed after shutdown was requested.
    pub drained: u64,
    /// Dispatches aborted when the drain grace elapsed.
    pub abandoned: u64,
    /// Deliveries refused because the channels were already closed.
    pub rejected: u64,
    /// Dispatch tasks that panicked before delivering.
    pub panicked: u64,
}

impl Summary {
    /// Records one consumed outcome.
    pub(crate) fn record(&mut self, outcome: &Outcome, draining: bool) {
        match outcome {
            Outcome::Success(_) => self.succeeded += 1,
            Outcome::Failure(err) => {
                self.failed += 1;
                match err.class() {
                    ErrorClass::Transport => self.transport += 1,
                    ErrorClass::Protocol => self.protocol += 1,
                    ErrorClass::Decode => self.decode += 1,
                }
                if err.is_timeout() {
                    self.timeouts += 1;
                }
            }
        }
        if draining {
            self.drained += 1;
        }
    }

    /// Returns `true` when every launched dispatch is accounted for.
    pub fn is_balanced(&self) -> bool {
        self.launched
            == self.succeeded + self.failed + self.abandoned + self.rejected + self.panicked
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::DispatchError;

    #[test]
    fn test_record_breaks_down_failures() {
        let mut s = Summary {
            launched: 4,
            ..Summary::default()
        };
        s.record(&Outcome::Success("a".into()), false);
        s.record(
            &Outcome::Failure(DispatchError::Timeout {
                timeout: Duration::from_secs(1),
            }),
            false,
        );
        s.record(
            &Outcome::Failure(DispatchError::UnexpectedStatus { status: 500 }),
            true,
        );
        s.record(
            &Outcome::Failure(DispatchError::Decode { error: "x".into() }),
            true,
        );

        assert_eq!(s.succeeded, 1);
        assert_eq!(s.failed, 3);
        assert_eq!((s.transport, s.protocol, s.decode), (1, 1, 1));
        assert_eq!(s.timeouts, 1);
        assert_eq!(s.drained, 2);
        assert!(s.is_balanced());
    }
}
