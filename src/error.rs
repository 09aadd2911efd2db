//! Error types used by the pollvisor runtime and its dispatches.
//!
//! This module defines three error types:
//!
//! - [`RuntimeError`]: errors raised by the service itself (startup, drain).
//! - [`DispatchError`]: the failure side of a single dispatch [`Outcome`](crate::Outcome).
//! - [`OutcomeClosed`]: a delivery attempted after the outcome channels were closed.
//!
//! `RuntimeError` and `DispatchError` provide `as_label` for logs/metrics.
//! [`DispatchError::class`] maps every failure onto the coarse [`ErrorClass`] taxonomy.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the pollvisor runtime.
///
/// These are the only conditions that stop the service abnormally:
/// startup failures and a drain that outlived its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration rejected by [`Config::validate`](crate::Config::validate).
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {error}")]
    ClientBuild {
        /// The underlying error message.
        error: String,
    },

    /// Termination signal listeners could not be registered.
    #[error("failed to register signal handlers: {0}")]
    Signal(#[from] std::io::Error),

    /// Drain grace period elapsed; the remaining dispatches were aborted.
    #[error("drain grace {grace:?} exceeded; abandoned {abandoned} dispatch(es)")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of dispatches aborted and accounted as abandoned.
        abandoned: usize,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), abandoned: 2 };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig { .. } => "runtime_invalid_config",
            RuntimeError::ClientBuild { .. } => "runtime_client_build",
            RuntimeError::Signal(_) => "runtime_signal",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// Coarse failure taxonomy of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network/connection failure, including the per-attempt timeout.
    Transport,
    /// Unexpected status code or content type.
    Protocol,
    /// Malformed body or unexpected shape.
    Decode,
}

/// # Errors produced by a single dispatch.
///
/// None of these are fatal: each one is delivered as `Outcome::Failure`
/// and the next tick simply tries again.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The round trip did not finish within the per-attempt timeout.
    #[error("request timed out after {timeout:?}")]
    Timeout {
        /// The per-attempt timeout that was exceeded.
        timeout: Duration,
    },

    /// The transport failed (connect, send, or body read).
    #[error("request error: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },

    /// Status code other than `200 OK`.
    #[error("status not 200 ({status})")]
    UnexpectedStatus {
        /// Received status code.
        status: u16,
    },

    /// `Content-Type` other than `application/json`.
    #[error("content-type is not application/json ({})", content_type.as_deref().unwrap_or("<none>"))]
    UnexpectedContentType {
        /// Received header value, if any.
        content_type: Option<String>,
    },

    /// Body is not JSON or lacks the expected string field.
    #[error("JSON decode error: {error}")]
    Decode {
        /// The underlying error message.
        error: String,
    },
}

impl DispatchError {
    /// Returns the taxonomy class of this failure.
    ///
    /// # Example
    /// ```
    /// use pollvisor::{DispatchError, ErrorClass};
    /// use std::time::Duration;
    ///
    /// let err = DispatchError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.class(), ErrorClass::Transport);
    /// ```
    pub fn class(&self) -> ErrorClass {
        match self {
            DispatchError::Timeout { .. } | DispatchError::Transport { .. } => {
                ErrorClass::Transport
            }
            DispatchError::UnexpectedStatus { .. }
            | DispatchError::UnexpectedContentType { .. } => ErrorClass::Protocol,
            DispatchError::Decode { .. } => ErrorClass::Decode,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Timeout { .. } => "dispatch_timeout",
            DispatchError::Transport { .. } => "dispatch_transport",
            DispatchError::UnexpectedStatus { .. } => "dispatch_unexpected_status",
            DispatchError::UnexpectedContentType { .. } => "dispatch_unexpected_content_type",
            DispatchError::Decode { .. } => "dispatch_decode",
        }
    }

    /// Returns `true` if the failure is the per-attempt timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DispatchError::Timeout { .. })
    }
}

/// A dispatch tried to deliver its outcome after the channels were closed.
///
/// Closing happens only once the in-flight set is empty, so this is a
/// contract violation and is always reported, never dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("outcome of dispatch #{dispatch} delivered after the outcome channels were closed")]
pub struct OutcomeClosed {
    /// Id of the offending dispatch.
    pub dispatch: u64,
}
