//! # pollvisor
//!
//! **pollvisor** is a periodic request sender for tokio.
//!
//! It dispatches one outbound GET on a fixed interval, funnels every outcome
//! (success or failure) through a single decision point, and on a termination
//! request stops launching, drains every in-flight dispatch, and only then
//! tears down.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │  Service (shutdown coordinator)                                   │
//!   │  - CancellationToken (fired once)                                 │
//!   │  - SubscriberSet (ordered, lossless event delivery)               │
//!   │  - Dispatcher (executor + request + per-attempt timeout)          │
//!   └──────┬───────────────────────────────────────────────▲────────────┘
//!          ▼                                               │ Parked{ JoinSet, receiver }
//!   ┌──────────────────────────────────────────────┐       │
//!   │  Scheduler loop                              │───────┘ on cancel
//!   │  select! { cancel | tick | outcome | join }  │
//!   └──────┬────────────────┬───────────────▲──────┘
//!          │ spawn          │ spawn         │ recv (one at a time)
//!          ▼                ▼               │
//!   ┌────────────┐   ┌────────────┐   ┌─────┴──────────────────┐
//!   │ Dispatch #1│   │ Dispatch #n│──►│ Outcome channel pair   │
//!   │ (timeout)  │   │ (timeout)  │   │ success ─┐  failure ─┐ │
//!   └────────────┘   └────────────┘   └──────────┴───────────┴─┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Running ──► launch #1, then one launch per tick; consume outcomes as they land
//!    │
//!    ▼ SIGINT/SIGTERM/SIGQUIT, trigger future, or ShutdownHandle::request()
//! Draining ──► no new launches; join every dispatch while consuming outcomes
//!    │           (optional grace: abort the rest, count them as abandoned)
//!    ▼
//! Stopped ──► close channels, consume leftovers, publish Summary
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                         |
//! |-------------------|----------------------------------------------------------|--------------------------------------------|
//! | **Service**       | Polling loop, shutdown and drain.                        | [`Service`], [`ShutdownHandle`]            |
//! | **Dispatch**      | One bounded round trip, classified.                      | [`Dispatcher`], [`Outcome`], [`classify`]  |
//! | **Executors**     | Pluggable network capability.                            | [`Executor`], [`ExecutorFn`], [`HttpExecutor`] |
//! | **Subscriber API**| Hook into launches, outcomes and phase transitions.      | [`Subscribe`], [`Event`]                   |
//! | **Errors**        | Typed errors for the runtime and for dispatches.         | [`RuntimeError`], [`DispatchError`]        |
//! | **Configuration** | Centralized settings.                                    | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], rendering events via `tracing`.
//! - `cli` (default): builds the `pollvisor` binary (`clap`, `tracing-subscriber`, `anyhow`).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{Config, DispatchError, ExecutorFn, RawResponse, Request, Service};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         interval: Duration::from_millis(50),
//!         ..Config::default()
//!     };
//!     let fake = ExecutorFn::arc(|_req: Arc<Request>, _ctx: CancellationToken| async {
//!         Ok::<_, DispatchError>(RawResponse::json(r#"{"uuid":"abc-123"}"#))
//!     });
//!
//!     let service = Service::builder(cfg).with_executor(fake).build()?;
//!     let summary = service
//!         .run_until(tokio::time::sleep(Duration::from_millis(120)))
//!         .await?;
//!
//!     assert!(summary.launched >= 1);
//!     assert!(summary.is_balanced());
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod executor;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
pub use core::{
    Delivery, Dispatcher, JSON_CONTENT_TYPE, Outcome, OutcomeReceiver, OutcomeSender, Service,
    ServiceBuilder, ShutdownHandle, Signals, Summary, channel, classify,
};
pub use error::{DispatchError, ErrorClass, OutcomeClosed, RuntimeError};
pub use events::{Event, EventKind, LaunchCause};
pub use executor::{BoxExecFuture, Executor, ExecutorFn, ExecutorRef, HttpExecutor, RawResponse, Request};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose the built-in tracing logger subscriber.
// Enabled by default via the `logging` feature.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
