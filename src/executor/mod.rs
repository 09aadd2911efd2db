//! # Network executor abstractions.
//!
//! This module provides the "network executor" capability used by dispatches:
//! - [`Executor`] - trait performing one GET round trip
//! - [`ExecutorFn`] - function-backed executor (fakes, adapters)
//! - [`ExecutorRef`] - shared reference to an executor (`Arc<dyn Executor>`)
//! - [`HttpExecutor`] - `reqwest`-backed implementation
//! - [`Request`], [`RawResponse`] - the boundary types

mod executor;
mod executor_fn;
mod http;

pub use executor::{BoxExecFuture, Executor, ExecutorRef, RawResponse, Request};
pub use executor_fn::ExecutorFn;
pub use http::HttpExecutor;
