//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers into the runtime.
//!
//! ## Architecture
//! ```text
//! SubscriberSet::emit(&Event) ──► sub1.on_event() ──► sub2.on_event() ──► ... (awaited in order)
//!                                      └─► panic caught → EventKind::SubscriberPanicked
//! ```
//!
//! ## Rules
//! - Every event reaches every subscriber exactly once, in `seq` order.
//! - There is no queue: the emitter awaits each subscriber, so a slow subscriber
//!   slows the scheduler loop. Keep handlers short.
//! - Panics are caught and reported to the remaining subscribers.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use pollvisor::{Subscribe, Event, EventKind};
//!
//! struct FailureCounter(std::sync::atomic::AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::OutcomeFailed) {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Return promptly: the scheduler loop waits for every subscriber.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called inline by the emitter. Panics are caught; the runtime then
    /// emits `EventKind::SubscriberPanicked` to the other subscribers.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in panic reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
