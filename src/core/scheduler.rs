//! # Scheduler loop: recurring launches and serialized outcome consumption.
//!
//! ## Architecture
//! ```text
//! run(token)
//!   ├─► launch #1 (Startup)
//!   └─► loop select! {
//!         token.cancelled()   ─► break, hand JoinSet + receiver to the coordinator
//!         ticker.tick()       ─► launch #n (Tick)
//!         outcomes.recv()     ─► publish OutcomeSucceeded / OutcomeFailed
//!         set.join_next()     ─► reap finished dispatch (keeps in-flight exact)
//!       }
//! ```
//!
//! ## Rules
//! - Outcomes are consumed **one at a time**; dispatches overlap freely
//! - The ticker is a **fixed cadence**: first tick one period after start,
//!   missed ticks delayed (not bursted), outcomes never reset it
//! - `select!` is unbiased: a tick and an outcome ready together resolve in
//!   random order
//! - After cancellation no dispatch is launched, even by a tick that raced it

use std::sync::Arc;
use std::time::Duration;

use tokio::{
    select,
    task::{JoinError, JoinSet},
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        dispatcher::Dispatcher,
        outcome::{self, Delivery, Outcome, OutcomeReceiver, OutcomeSender},
        summary::Summary,
    },
    error::OutcomeClosed,
    events::{Event, EventKind, LaunchCause},
    subscribers::SubscriberSet,
};

/// Join set of in-flight dispatches; its length is the in-flight counter.
pub(crate) type InFlight = JoinSet<Result<(), OutcomeClosed>>;

/// What the loop hands over to the coordinator when it stops.
pub(crate) struct Parked {
    /// Dispatches launched but not yet joined.
    pub in_flight: InFlight,
    /// Outcome receiver, still open.
    pub outcomes: OutcomeReceiver,
}

/// Accounting shared by the loop and the coordinator.
///
/// Every launch, consumed outcome and reaped join goes through here, so each
/// one produces exactly one event and one count.
pub(crate) struct Ledger {
    subs: Arc<SubscriberSet>,
    pub summary: Summary,
}

impl Ledger {
    pub fn new(subs: Arc<SubscriberSet>) -> Self {
        Self {
            subs,
            summary: Summary::default(),
        }
    }

    pub async fn emit(&self, ev: Event) {
        self.subs.emit(&ev).await;
    }

    /// Records and publishes a consumed outcome.
    pub async fn consume(&mut self, delivery: Delivery, draining: bool) {
        self.summary.record(&delivery.outcome, draining);
        let ev = match delivery.outcome {
            Outcome::Success(value) => Event::new(EventKind::OutcomeSucceeded)
                .with_dispatch(delivery.dispatch)
                .with_value(value),
            Outcome::Failure(err) => Event::new(EventKind::OutcomeFailed)
                .with_dispatch(delivery.dispatch)
                .with_reason(err.to_string())
                .with_label(err.as_label()),
        };
        self.emit(ev).await;
    }

    /// Records a joined dispatch task.
    ///
    /// Normal completions were already counted when their outcome was consumed.
    pub async fn reap(&mut self, joined: Result<Result<(), OutcomeClosed>, JoinError>) {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(closed)) => {
                self.summary.rejected += 1;
                self.emit(
                    Event::new(EventKind::DeliveryRejected)
                        .with_dispatch(closed.dispatch)
                        .with_reason(closed.to_string()),
                )
                .await;
            }
            Err(e) if e.is_cancelled() => {
                self.summary.abandoned += 1;
            }
            Err(e) => {
                self.summary.panicked += 1;
                self.emit(Event::new(EventKind::DispatchPanicked).with_reason(e.to_string()))
                    .await;
            }
        }
    }
}

/// Drives the recurring dispatch cadence.
pub(crate) struct Scheduler {
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    next_id: u64,
}

impl Scheduler {
    pub fn new(dispatcher: Arc<Dispatcher>, interval: Duration) -> Self {
        Self {
            dispatcher,
            interval,
            next_id: 0,
        }
    }

    /// Runs until `token` is cancelled, then parks in-flight work for draining.
    pub async fn run(mut self, token: CancellationToken, ledger: &mut Ledger) -> Parked {
        let (tx, mut outcomes) = outcome::channel();
        let mut in_flight = InFlight::new();

        if !token.is_cancelled() {
            self.launch(&mut in_flight, &tx, &token, LaunchCause::Startup, ledger)
                .await;
        }

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if token.is_cancelled() {
                        break;
                    }
                    self.launch(&mut in_flight, &tx, &token, LaunchCause::Tick, ledger).await;
                }
                Some(delivery) = outcomes.recv() => {
                    ledger.consume(delivery, false).await;
                }
                Some(joined) = in_flight.join_next() => {
                    ledger.reap(joined).await;
                }
            }
        }

        Parked {
            in_flight,
            outcomes,
        }
    }

    /// Spawns one dispatch into the join set and publishes `DispatchLaunched`.
    async fn launch(
        &mut self,
        in_flight: &mut InFlight,
        tx: &OutcomeSender,
        token: &CancellationToken,
        cause: LaunchCause,
        ledger: &mut Ledger,
    ) {
        self.next_id += 1;
        let id = self.next_id;

        let dispatcher = Arc::clone(&self.dispatcher);
        let tx = tx.clone();
        let token = token.clone();
        in_flight.spawn(async move { dispatcher.dispatch(id, &token, tx).await });

        ledger.summary.launched += 1;
        ledger
            .emit(
                Event::new(EventKind::DispatchLaunched)
                    .with_dispatch(id)
                    .with_cause(cause)
                    .with_in_flight(in_flight.len())
                    .with_timeout(self.dispatcher.timeout()),
            )
            .await;
    }
}
