//! # Service configuration.
//!
//! Provides [`Config`], the centralized settings for the polling service.
//!
//! ## Sentinel values
//! - `grace = 0s` → unbounded drain (wait for every in-flight dispatch)
//! - `referer = None` → the endpoint itself is sent as `Referer`

use std::time::Duration;

use crate::error::RuntimeError;

/// Default target endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://httpbin.org/uuid";

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 5.1.1; SM-G928X Build/LMY47X) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/47.0.2526.83 Mobile Safari/537.36";

/// Configuration for the polling service.
///
/// ## Field semantics
/// - `endpoint`: URL fetched by every dispatch
/// - `user_agent`: fixed `User-Agent` header
/// - `referer`: fixed `Referer` header (`None` = endpoint)
/// - `field`: JSON string field extracted from a successful response
/// - `interval`: period between timer-triggered dispatches
/// - `attempt_timeout`: hard bound on one round trip
/// - `grace`: maximum drain duration after shutdown (`0s` = unbounded)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Target endpoint for every dispatch.
    pub endpoint: String,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// `Referer` header sent with every request.
    ///
    /// `None` sends the endpoint itself.
    pub referer: Option<String>,

    /// Name of the JSON string field carrying the success value.
    pub field: String,

    /// Fixed period between timer-triggered dispatches.
    ///
    /// The first tick fires one full period after the startup dispatch.
    pub interval: Duration,

    /// Per-attempt timeout.
    ///
    /// The only hard abort for an individual call; shutdown never aborts an
    /// in-flight round trip.
    pub attempt_timeout: Duration,

    /// Maximum time to wait for in-flight dispatches after shutdown.
    ///
    /// - `Duration::ZERO` = wait until every dispatch delivered (bounded anyway
    ///   by `attempt_timeout`)
    /// - `> 0` = abort and account the rest as abandoned once exceeded
    pub grace: Duration,
}

impl Config {
    /// Returns the `Referer` header value.
    #[inline]
    pub fn referer(&self) -> &str {
        self.referer.as_deref().unwrap_or(&self.endpoint)
    }

    /// Returns the drain grace period as an `Option`.
    ///
    /// - `None` → unbounded drain
    /// - `Some(d)` → abort remaining dispatches after `d`
    #[inline]
    pub fn drain_grace(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Checks that the configuration can drive a service.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let invalid = |reason: String| Err(RuntimeError::InvalidConfig { reason });

        if self.interval == Duration::ZERO {
            return invalid("interval must be greater than zero".into());
        }
        if self.attempt_timeout == Duration::ZERO {
            return invalid("attempt_timeout must be greater than zero".into());
        }
        if self.field.is_empty() {
            return invalid("field must not be empty".into());
        }
        match reqwest::Url::parse(&self.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            Ok(url) => invalid(format!("unsupported endpoint scheme `{}`", url.scheme())),
            Err(e) => invalid(format!("endpoint `{}`: {e}", self.endpoint)),
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `endpoint = http://httpbin.org/uuid`, `field = "uuid"`
    /// - `interval = 3s`
    /// - `attempt_timeout = 1s`
    /// - `grace = 0s` (unbounded drain)
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: None,
            field: "uuid".to_string(),
            interval: Duration::from_secs(3),
            attempt_timeout: Duration::from_secs(1),
            grace: Duration::ZERO,
        }
    }
}
