//! # Dispatch a single round trip and classify its result.
//!
//! - **Execute ONE request** through the [`Executor`] with a request-scoped token
//! - **Apply the per-attempt timeout** (wraps execution in `tokio::time::timeout`)
//! - **Classify** the raw response into an [`Outcome`]
//! - **Deliver** the outcome as the final action
//!
//! ## Classification
//!
//! ```text
//! transport error              → Failure(Transport)
//! timeout elapsed              → Failure(Timeout)               (transport class)
//! status != 200                → Failure(UnexpectedStatus)      (protocol class)
//! content-type != json         → Failure(UnexpectedContentType) (protocol class)
//! body !~ {"<field>": "<str>"} → Failure(Decode)
//! otherwise                    → Success(value)
//! ```
//!
//! ## Rules
//! - Always produces **exactly one** outcome; nothing runs after delivery
//! - Never returns a dispatch error to its caller
//! - The request token is a **child** of the service token and is cancelled when
//!   the attempt ends; it is advisory, the timeout is the only hard abort

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    core::outcome::{Outcome, OutcomeSender},
    error::{DispatchError, OutcomeClosed},
    executor::{ExecutorRef, RawResponse, Request},
};

/// Expected `Content-Type` of a successful response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Issues one bounded round trip per call and classifies the result.
///
/// Cheap to share: the scheduler loop holds it in an `Arc` and every launched
/// dispatch runs [`dispatch`](Self::dispatch) on its own task.
#[derive(Clone)]
pub struct Dispatcher {
    executor: ExecutorRef,
    request: Arc<Request>,
    timeout: Duration,
    field: Arc<str>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// - `timeout`: per-attempt bound
    /// - `field`: JSON string field extracted on success
    pub fn new(
        executor: ExecutorRef,
        request: Request,
        timeout: Duration,
        field: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            executor,
            request: Arc::new(request),
            timeout,
            field: field.into(),
        }
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one attempt and delivers its outcome through `tx`.
    ///
    /// Delivery is the last action. The only error is [`OutcomeClosed`]: the
    /// channels were closed while this dispatch was still in flight.
    pub async fn dispatch(
        &self,
        id: u64,
        parent: &CancellationToken,
        tx: OutcomeSender,
    ) -> Result<(), OutcomeClosed> {
        let outcome = self.fetch(parent).await;
        tx.deliver(id, outcome).await
    }

    /// Runs one attempt and returns its classified outcome.
    pub async fn fetch(&self, parent: &CancellationToken) -> Outcome {
        self.attempt(parent).await.into()
    }

    async fn attempt(&self, parent: &CancellationToken) -> Result<String, DispatchError> {
        let scope = parent.child_token();
        let _scope_guard = scope.clone().drop_guard();

        let call = self.executor.get(Arc::clone(&self.request), scope);
        let raw = match time::timeout(self.timeout, call).await {
            Ok(res) => res?,
            Err(_elapsed) => {
                return Err(DispatchError::Timeout {
                    timeout: self.timeout,
                });
            }
        };
        classify(raw, &self.field)
    }
}

/// Validates a raw response and extracts `field`.
///
/// # Example
/// ```
/// use pollvisor::{RawResponse, classify};
///
/// let raw = RawResponse::json(r#"{"uuid":"abc-123"}"#);
/// assert_eq!(classify(raw, "uuid").unwrap(), "abc-123");
/// ```
pub fn classify(raw: RawResponse, field: &str) -> Result<String, DispatchError> {
    if raw.status != 200 {
        return Err(DispatchError::UnexpectedStatus { status: raw.status });
    }
    if raw.content_type.as_deref() != Some(JSON_CONTENT_TYPE) {
        return Err(DispatchError::UnexpectedContentType {
            content_type: raw.content_type,
        });
    }

    let body: Value = serde_json::from_slice(&raw.body).map_err(|e| DispatchError::Decode {
        error: e.to_string(),
    })?;
    match body.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(DispatchError::Decode {
            error: format!("field `{field}` is not a string: {other}"),
        }),
        None => Err(DispatchError::Decode {
            error: format!("missing field `{field}`"),
        }),
    }
}
