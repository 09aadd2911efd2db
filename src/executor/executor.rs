//! # Executor abstraction.
//!
//! The [`Executor`] trait performs one outbound GET and returns the raw
//! response. It knows nothing about status or content-type policy: that
//! classification belongs to the [`Dispatcher`](crate::Dispatcher).
//!
//! An executor receives a request-scoped [`CancellationToken`]. The token is
//! cancelled when the attempt ends (completion or timeout). It is advisory:
//! the dispatcher's per-attempt timeout is the hard bound, and service shutdown
//! never cuts an in-flight round trip short.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;

/// Boxed future returned by [`Executor::get`].
pub type BoxExecFuture =
    Pin<Box<dyn Future<Output = Result<RawResponse, DispatchError>> + Send + 'static>>;

/// Shared handle to an executor.
pub type ExecutorRef = Arc<dyn Executor>;

/// Fixed request issued by every dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Target URL.
    pub endpoint: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// `Referer` header value.
    pub referer: String,
}

impl Request {
    /// Builds the request described by `cfg`.
    pub fn from_config(cfg: &crate::Config) -> Self {
        Self {
            endpoint: cfg.endpoint.clone(),
            user_agent: cfg.user_agent.clone(),
            referer: cfg.referer().to_string(),
        }
    }
}

/// Raw response as seen on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present and valid UTF-8.
    pub content_type: Option<String>,
    /// Full response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// `200 OK` with `Content-Type: application/json`.
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }
}

/// # One outbound round trip.
///
/// Implementations return `Err` only for transport failures
/// ([`DispatchError::Transport`]); any response that arrived, whatever its
/// status, is `Ok`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use pollvisor::{BoxExecFuture, Executor, RawResponse, Request};
///
/// struct Canned;
///
/// impl Executor for Canned {
///     fn get(&self, _req: Arc<Request>, _ctx: CancellationToken) -> BoxExecFuture {
///         Box::pin(async { Ok(RawResponse::json(r#"{"uuid":"abc"}"#)) })
///     }
/// }
/// ```
pub trait Executor: Send + Sync + 'static {
    /// Performs one GET for `request`.
    fn get(&self, request: Arc<Request>, ctx: CancellationToken) -> BoxExecFuture;
}
