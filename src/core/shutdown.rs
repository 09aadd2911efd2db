//! # Termination requests: OS signals and explicit handles.
//!
//! Provides [`Signals`], registered listeners that complete when the process
//! receives a termination signal, and [`ShutdownHandle`], an idempotent
//! in-process trigger.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Registered termination signal listeners.
///
/// Registration failure is a startup error.
pub struct Signals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigquit: tokio::signal::unix::Signal,
}

impl Signals {
    /// Registers listeners. Must be called inside a tokio runtime.
    #[cfg(unix)]
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Registers listeners. Must be called inside a tokio runtime.
    #[cfg(not(unix))]
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Completes when any registered signal is received.
    #[cfg(unix)]
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
    }

    /// Completes when Ctrl-C is received.
    #[cfg(not(unix))]
    pub async fn recv(self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Idempotent shutdown trigger bound to a service's cancellation token.
///
/// Cloneable; every clone fires the same token.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    token: CancellationToken,
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            token,
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests shutdown.
    ///
    /// Returns `true` only for the call that fired the token; later calls are
    /// no-ops returning `false`.
    pub fn request(&self) -> bool {
        let first = !self.requested.swap(true, Ordering::SeqCst);
        if first {
            self.token.cancel();
        }
        first
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once shutdown has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fires_once() {
        let token = CancellationToken::new();
        let a = ShutdownHandle::new(token.clone());
        let b = a.clone();

        assert!(!a.is_requested());
        assert!(a.request());
        assert!(!b.request());
        assert!(!a.request());
        assert!(token.is_cancelled());
        assert!(b.is_requested());
    }

    #[tokio::test]
    async fn test_requested_completes_after_request() {
        let h = ShutdownHandle::new(CancellationToken::new());
        let waiter = {
            let h = h.clone();
            tokio::spawn(async move { h.requested().await })
        };
        h.request();
        waiter.await.unwrap();
    }
}
