//! # Function-backed executor (`ExecutorFn`)
//!
//! [`ExecutorFn`] wraps a closure `F: Fn(Arc<Request>, CancellationToken) -> Fut`,
//! producing a fresh future per round trip. Useful for fakes and for adapting
//! other clients without a dedicated type.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{DispatchError, ExecutorFn, ExecutorRef, RawResponse, Request};
//!
//! let ex: ExecutorRef = ExecutorFn::arc(|_req: Arc<Request>, _ctx: CancellationToken| async {
//!     Ok::<_, DispatchError>(RawResponse::json(r#"{"uuid":"abc-123"}"#))
//! });
//! # let _ = ex;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;
use crate::executor::executor::{BoxExecFuture, Executor, RawResponse, Request};

/// Function-backed executor implementation.
#[derive(Debug)]
pub struct ExecutorFn<F> {
    f: F,
}

impl<F, Fut> ExecutorFn<F>
where
    F: Fn(Arc<Request>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse, DispatchError>> + Send + 'static,
{
    /// Creates a new function-backed executor.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the executor and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut> Executor for ExecutorFn<F>
where
    F: Fn(Arc<Request>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RawResponse, DispatchError>> + Send + 'static,
{
    fn get(&self, request: Arc<Request>, ctx: CancellationToken) -> BoxExecFuture {
        Box::pin((self.f)(request, ctx))
    }
}
