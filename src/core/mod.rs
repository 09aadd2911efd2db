//! Runtime core: scheduling, dispatch and lifecycle.
//!
//! The public API from this module is [`Service`] (with its builder and
//! shutdown handle), [`Dispatcher`] and the outcome channel types.
//!
//! Internal modules:
//! - [`outcome`]: the success/failure channel pair shared by all dispatches;
//! - [`dispatcher`]: one bounded round trip, classified into an outcome;
//! - [`scheduler`]: the recurring launch loop and serialized outcome consumption;
//! - [`service`]: shutdown coordination, drain and teardown;
//! - [`shutdown`]: OS signal listeners and the idempotent shutdown handle;
//! - [`summary`]: final accounting.

mod builder;
mod dispatcher;
mod outcome;
mod scheduler;
mod service;
mod shutdown;
mod summary;

pub use builder::ServiceBuilder;
pub use dispatcher::{Dispatcher, JSON_CONTENT_TYPE, classify};
pub use outcome::{Delivery, Outcome, OutcomeReceiver, OutcomeSender, channel};
pub use service::Service;
pub use shutdown::{ShutdownHandle, Signals};
pub use summary::Summary;
