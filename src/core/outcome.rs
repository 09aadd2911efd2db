//! # Outcome channel pair.
//!
//! Two delivery points shared by every in-flight dispatch: one for success
//! values, one for failures. Each has capacity 1, the closest tokio `mpsc`
//! gets to an unbuffered rendezvous, so a dispatcher's delivery waits until
//! the previous one on the same side has been taken.
//!
//! ## Rules
//! - Many senders (one clone per dispatch), one receiver (the scheduler loop,
//!   then the coordinator during drain).
//! - [`OutcomeSender::deliver`] consumes the sender: one delivery per dispatch.
//! - [`OutcomeReceiver::close`] is one-way. A delivery after close returns
//!   [`OutcomeClosed`] to the dispatcher; it is never silently dropped.
//! - [`OutcomeReceiver::recv`] picks whichever side is ready; when both are,
//!   the choice is random.

use tokio::sync::mpsc;

use crate::error::{DispatchError, OutcomeClosed};

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Extracted field value.
    Success(String),
    /// Classified failure.
    Failure(DispatchError),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl From<Result<String, DispatchError>> for Outcome {
    fn from(res: Result<String, DispatchError>) -> Self {
        match res {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Failure(err),
        }
    }
}

/// An outcome tagged with the dispatch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Dispatch id.
    pub dispatch: u64,
    /// What the dispatch produced.
    pub outcome: Outcome,
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (OutcomeSender, OutcomeReceiver) {
    let (success_tx, success_rx) = mpsc::channel(1);
    let (failure_tx, failure_rx) = mpsc::channel(1);
    (
        OutcomeSender {
            success: success_tx,
            failure: failure_tx,
        },
        OutcomeReceiver {
            success: success_rx,
            failure: failure_rx,
            closed: false,
        },
    )
}

/// Writing half, cloned into every dispatch.
#[derive(Clone, Debug)]
pub struct OutcomeSender {
    success: mpsc::Sender<(u64, String)>,
    failure: mpsc::Sender<(u64, DispatchError)>,
}

impl OutcomeSender {
    /// Delivers the single outcome of dispatch `dispatch`.
    ///
    /// Waits while the matching side is occupied. Returns [`OutcomeClosed`]
    /// if the receiver was closed or dropped.
    pub async fn deliver(self, dispatch: u64, outcome: Outcome) -> Result<(), OutcomeClosed> {
        let sent = match outcome {
            Outcome::Success(value) => self.success.send((dispatch, value)).await.is_ok(),
            Outcome::Failure(err) => self.failure.send((dispatch, err)).await.is_ok(),
        };
        if sent {
            Ok(())
        } else {
            Err(OutcomeClosed { dispatch })
        }
    }

    /// Returns `true` once the receiving half has been closed or dropped.
    pub fn is_closed(&self) -> bool {
        self.success.is_closed() || self.failure.is_closed()
    }
}

/// Reading half, owned by one consumer at a time.
#[derive(Debug)]
pub struct OutcomeReceiver {
    success: mpsc::Receiver<(u64, String)>,
    failure: mpsc::Receiver<(u64, DispatchError)>,
    closed: bool,
}

impl OutcomeReceiver {
    /// Waits for the next delivery from either side.
    ///
    /// Returns `None` once both sides are closed and empty, or every sender
    /// is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        tokio::select! {
            Some((dispatch, value)) = self.success.recv() => Some(Delivery {
                dispatch,
                outcome: Outcome::Success(value),
            }),
            Some((dispatch, err)) = self.failure.recv() => Some(Delivery {
                dispatch,
                outcome: Outcome::Failure(err),
            }),
            else => None,
        }
    }

    /// Takes an already buffered delivery, if any.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        if let Ok((dispatch, value)) = self.success.try_recv() {
            return Some(Delivery {
                dispatch,
                outcome: Outcome::Success(value),
            });
        }
        if let Ok((dispatch, err)) = self.failure.try_recv() {
            return Some(Delivery {
                dispatch,
                outcome: Outcome::Failure(err),
            });
        }
        None
    }

    /// Closes both sides. Buffered deliveries stay readable via
    /// [`try_recv`](Self::try_recv); new deliveries fail with [`OutcomeClosed`].
    pub fn close(&mut self) {
        self.success.close();
        self.failure.close();
        self.closed = true;
    }

    /// Returns `true` after [`close`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
