//! # Ordered, lossless event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which delivers each event to every subscriber in
//! registration order, awaiting each one.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► subscriber1.on_event()  ──► panic → SubscriberPanicked (to the others)
//!     ├──► subscriber2.on_event()
//!     └──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No loss**: `emit()` returns only after every subscriber handled the event
//! - **Global order**: all subscribers see events in the same order
//! - **Isolation**: a panicking subscriber does not stop delivery to the others
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Fan-out coordinator for multiple event subscribers.
#[derive(Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set from the given subscribers.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Returns `true` if no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Delivers `event` to every subscriber, in order.
    ///
    /// A subscriber panic is converted to a [`Event::subscriber_panicked`] event
    /// delivered to the other subscribers. Panic events are not re-reported.
    pub async fn emit(&self, event: &Event) {
        let panicked = self.deliver(event, None).await;
        if event.is_subscriber_panic() {
            return;
        }
        for (idx, info) in panicked {
            let report = Event::subscriber_panicked(self.subs[idx].name(), info);
            self.deliver(&report, Some(idx)).await;
        }
    }

    /// Delivers one event, skipping `skip`; returns `(index, panic message)` pairs.
    async fn deliver(&self, event: &Event, skip: Option<usize>) -> Vec<(usize, String)> {
        let mut panicked = Vec::new();
        for (idx, sub) in self.subs.iter().enumerate() {
            if skip == Some(idx) {
                continue;
            }
            let fut = sub.on_event(event);
            if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                let info = {
                    let any = &*panic_err;
                    if let Some(msg) = any.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = any.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    }
                };
                panicked.push((idx, info));
            }
        }
        panicked
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::events::EventKind;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, ev: &Event) {
            if ev.kind == EventKind::OutcomeFailed {
                panic!("boom");
            }
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_event() {
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![a.clone(), b.clone()]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(SubscriberSet::default().is_empty());

        set.emit(&Event::new(EventKind::DispatchLaunched)).await;
        set.emit(&Event::new(EventKind::OutcomeSucceeded)).await;

        let expected = vec![EventKind::DispatchLaunched, EventKind::OutcomeSucceeded];
        assert_eq!(*a.0.lock().unwrap(), expected);
        assert_eq!(*b.0.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_panic_is_isolated_and_reported() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![Arc::new(Exploder), rec.clone()]);

        set.emit(&Event::new(EventKind::OutcomeFailed)).await;

        assert_eq!(
            *rec.0.lock().unwrap(),
            vec![EventKind::OutcomeFailed, EventKind::SubscriberPanicked]
        );
    }
}
