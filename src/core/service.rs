//! # Service: the polling loop plus lossless, cooperative shutdown.
//!
//! The [`Service`] owns the configuration, the dispatcher, the subscriber set
//! and the cancellation token. It runs the scheduler loop until a termination
//! request arrives, then drains every in-flight dispatch before tearing down.
//!
//! ## Phases
//! ```text
//! Running ──(signal / trigger / ShutdownHandle::request)──► Draining ──► Stopped
//!
//! Running:
//!   Scheduler::run(token) ─► launch, tick, consume outcomes, reap joins
//!
//! Draining:
//!   publish ShutdownRequested{ in_flight }
//!   loop until JoinSet empty:
//!     ├─ join_next()     → reap
//!     ├─ outcomes.recv() → consume (dispatchers never block on a full channel)
//!     └─ grace deadline  → stop waiting (checked between events only)
//!   deadline hit: abort_all() → join → count cancelled joins as abandoned
//!   outcomes.close() → consume buffered leftovers
//!   publish DrainCompleted, or GraceExceeded{ abandoned } if any were abandoned
//!
//! Stopped (JoinSet provably empty, channels empty):
//!   publish Stopped{ summary }
//! ```
//!
//! ## Rules
//! - The token fires **once**; repeated requests are no-ops
//! - Shutdown does **not** abort in-flight round trips; the per-attempt timeout does
//! - The channels close only after the in-flight counter reached zero
//! - `run*` consumes the service, so `Stopped` is reached at most once
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use pollvisor::{Config, LogWriter, Service, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pollvisor::RuntimeError> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let service = Service::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     let summary = service.run().await?;
//!     println!("launched {}", summary.launched);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::{
        builder::ServiceBuilder,
        dispatcher::Dispatcher,
        scheduler::{Ledger, Parked, Scheduler},
        shutdown::{ShutdownHandle, Signals},
        summary::Summary,
    },
    error::RuntimeError,
    events::{Event, EventKind},
    subscribers::SubscriberSet,
};

/// Periodic request sender with a single outcome decision point.
pub struct Service {
    cfg: Config,
    dispatcher: Arc<Dispatcher>,
    subs: Arc<SubscriberSet>,
    token: CancellationToken,
    handle: ShutdownHandle,
}

impl Service {
    /// Returns a builder for the given configuration.
    pub fn builder(cfg: Config) -> ServiceBuilder {
        ServiceBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        dispatcher: Arc<Dispatcher>,
        subs: Arc<SubscriberSet>,
    ) -> Self {
        let token = CancellationToken::new();
        let handle = ShutdownHandle::new(token.clone());
        Self {
            cfg,
            dispatcher,
            subs,
            token,
            handle,
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns a handle that requests shutdown from anywhere in the process.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Runs until SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows), then drains.
    ///
    /// Fails fast with [`RuntimeError::Signal`] if listeners can't be registered.
    pub async fn run(self) -> Result<Summary, RuntimeError> {
        let signals = Signals::register()?;
        self.run_until(signals.recv()).await
    }

    /// Runs until `trigger` completes or a [`ShutdownHandle`] fires, then drains.
    ///
    /// Returns the final [`Summary`] on a clean drain, or
    /// [`RuntimeError::GraceExceeded`] when dispatches had to be abandoned.
    pub async fn run_until<F>(self, trigger: F) -> Result<Summary, RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let mut ledger = Ledger::new(Arc::clone(&self.subs));
        let scheduler = Scheduler::new(Arc::clone(&self.dispatcher), self.cfg.interval);

        let parked = {
            let running = scheduler.run(self.token.clone(), &mut ledger);
            tokio::pin!(running);

            tokio::select! {
                parked = &mut running => parked,
                _ = trigger => {
                    self.handle.request();
                    running.await
                }
            }
        };

        self.drain(parked, ledger).await
    }

    /// `Draining → Stopped`.
    async fn drain(self, parked: Parked, mut ledger: Ledger) -> Result<Summary, RuntimeError> {
        let Parked {
            mut in_flight,
            mut outcomes,
        } = parked;

        ledger
            .emit(Event::new(EventKind::ShutdownRequested).with_in_flight(in_flight.len()))
            .await;

        // A started consume/reap always runs to completion; the deadline is
        // only observed between them.
        let deadline = self.cfg.drain_grace().map(|grace| Instant::now() + grace);
        let mut expired = false;
        while !in_flight.is_empty() {
            tokio::select! {
                Some(joined) = in_flight.join_next() => ledger.reap(joined).await,
                Some(delivery) = outcomes.recv() => ledger.consume(delivery, true).await,
                _ = grace_elapsed(deadline) => {
                    expired = true;
                    break;
                }
            }
        }

        let abandoned_before = ledger.summary.abandoned;
        if expired {
            in_flight.abort_all();
            while let Some(joined) = in_flight.join_next().await {
                ledger.reap(joined).await;
            }
        }
        let abandoned = ledger.summary.abandoned - abandoned_before;

        // Joined dispatches may still have an outcome buffered.
        outcomes.close();
        while let Some(delivery) = outcomes.try_recv() {
            ledger.consume(delivery, true).await;
        }

        if abandoned == 0 {
            ledger
                .emit(Event::new(EventKind::DrainCompleted).with_in_flight(0))
                .await;
        } else {
            ledger
                .emit(
                    Event::new(EventKind::GraceExceeded)
                        .with_in_flight(abandoned as usize)
                        .with_timeout(self.cfg.grace),
                )
                .await;
        }

        let summary = ledger.summary;
        ledger
            .emit(Event::new(EventKind::Stopped).with_summary(summary))
            .await;

        if summary.abandoned > 0 {
            return Err(RuntimeError::GraceExceeded {
                grace: self.cfg.grace,
                abandoned: summary.abandoned as usize,
            });
        }
        Ok(summary)
    }
}

/// Completes at `deadline`; never completes for an unbounded drain.
async fn grace_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
