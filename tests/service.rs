//! Service-level behavior on a paused clock.
//!
//! Every test swaps the network for an [`ExecutorFn`] so cadence, drain,
//! timeouts and shutdown idempotence are deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pollvisor::{
    Config, DispatchError, Event, EventKind, ExecutorFn, ExecutorRef, LaunchCause, RawResponse,
    Request, RuntimeError, Service, Subscribe, Summary,
};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

impl Recorder {
    fn all(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn kinds(&self) -> Vec<EventKind> {
        self.all().into_iter().map(|e| e.kind).collect()
    }

    fn count(&self, kind: EventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    fn first(&self, kind: EventKind) -> Option<Event> {
        self.all().into_iter().find(|e| e.kind == kind)
    }

    fn position(&self, kind: EventKind) -> Option<usize> {
        self.kinds().iter().position(|k| *k == kind)
    }
}

fn config(interval: Duration, timeout: Duration) -> Config {
    Config {
        interval,
        attempt_timeout: timeout,
        ..Config::default()
    }
}

/// Answers `{"uuid": "abc-123"}` after `delay`.
fn respond_after(delay: Duration) -> ExecutorRef {
    ExecutorFn::arc(move |_req: Arc<Request>, _ctx: CancellationToken| async move {
        sleep(delay).await;
        Ok::<_, DispatchError>(RawResponse::json(r#"{"uuid":"abc-123"}"#))
    })
}

/// Never answers.
fn hang() -> ExecutorRef {
    ExecutorFn::arc(|_req: Arc<Request>, _ctx: CancellationToken| async {
        std::future::pending::<Result<RawResponse, DispatchError>>().await
    })
}

async fn run_for(
    cfg: Config,
    executor: ExecutorRef,
    recorder: &Arc<Recorder>,
    after: Duration,
) -> Result<Summary, RuntimeError> {
    Service::builder(cfg)
        .with_executor(executor)
        .with_subscriber(recorder.clone())
        .build()
        .expect("valid config")
        .run_until(sleep(after))
        .await
}

#[tokio::test(start_paused = true)]
async fn n_ticks_launch_n_plus_one_dispatches() {
    let rec = Arc::new(Recorder::default());
    let cfg = config(Duration::from_secs(3), Duration::from_secs(1));

    // ticks at 3, 6, 9, 12, 15
    let summary = run_for(cfg, respond_after(Duration::ZERO), &rec, Duration::from_millis(16_500))
        .await
        .expect("clean drain");

    assert_eq!(summary.launched, 6);
    assert_eq!(summary.succeeded, 6);
    assert_eq!(summary.failed, 0);
    assert!(summary.is_balanced());

    let launches: Vec<Event> = rec
        .all()
        .into_iter()
        .filter(|e| e.kind == EventKind::DispatchLaunched)
        .collect();
    assert_eq!(launches.len(), 6);
    assert_eq!(launches[0].cause, Some(LaunchCause::Startup));
    assert!(launches[1..].iter().all(|e| e.cause == Some(LaunchCause::Tick)));
    let ids: Vec<u64> = launches.iter().filter_map(|e| e.dispatch).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    assert_eq!(rec.count(EventKind::OutcomeSucceeded), 6);
    let ok = rec.first(EventKind::OutcomeSucceeded).expect("success event");
    assert_eq!(ok.value.as_deref(), Some("abc-123"));
}

#[tokio::test(start_paused = true)]
async fn slow_responses_do_not_shift_the_cadence() {
    let rec = Arc::new(Recorder::default());
    let cfg = config(Duration::from_secs(1), Duration::from_secs(5));

    // Each round trip outlives the interval: launches overlap.
    let summary = run_for(
        cfg,
        respond_after(Duration::from_millis(2_200)),
        &rec,
        Duration::from_millis(3_500),
    )
    .await
    .expect("clean drain");

    // launches at 0, 1, 2, 3; #3 and #4 still running at 3.5
    assert_eq!(summary.launched, 4);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.drained, 2);

    let requested = rec.first(EventKind::ShutdownRequested).expect("requested");
    assert_eq!(requested.in_flight, Some(2));

    let peak = rec
        .all()
        .into_iter()
        .filter(|e| e.kind == EventKind::DispatchLaunched)
        .filter_map(|e| e.in_flight)
        .max();
    assert!(peak.unwrap_or(0) > 1, "dispatches should overlap");
}

#[tokio::test(start_paused = true)]
async fn drain_waits_for_every_in_flight_dispatch() {
    let rec = Arc::new(Recorder::default());
    let cfg = config(Duration::from_secs(1), Duration::from_secs(2));

    // launches at 0, 1, 2; #3 completes at 2.8, after the request at 2.5
    let summary = run_for(
        cfg,
        respond_after(Duration::from_millis(800)),
        &rec,
        Duration::from_millis(2_500),
    )
    .await
    .expect("clean drain");

    assert_eq!(summary.launched, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.drained, 1);
    assert_eq!(summary.abandoned, 0);
    assert!(summary.is_balanced());

    let requested = rec.position(EventKind::ShutdownRequested).expect("requested");
    let completed = rec.position(EventKind::DrainCompleted).expect("completed");
    let stopped = rec.position(EventKind::Stopped).expect("stopped");
    let last_outcome = rec
        .kinds()
        .iter()
        .rposition(|k| *k == EventKind::OutcomeSucceeded)
        .expect("outcomes");

    assert!(requested < last_outcome);
    assert!(last_outcome < completed);
    assert!(completed < stopped);
    assert_eq!(stopped, rec.kinds().len() - 1);
    assert_eq!(rec.count(EventKind::DispatchLaunched), 3);

    let stop = rec.first(EventKind::Stopped).expect("stopped");
    assert_eq!(stop.summary, Some(summary));
}

#[tokio::test(start_paused = true)]
async fn timeout_bounds_drain_and_is_reported_as_transport() {
    let rec = Arc::new(Recorder::default());
    let cfg = config(Duration::from_secs(3), Duration::from_secs(1));

    let summary = run_for(cfg, hang(), &rec, Duration::from_millis(500))
        .await
        .expect("clean drain");

    assert_eq!(summary.launched, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.timeouts, 1);
    assert_eq!(summary.transport, 1);
    assert_eq!(summary.drained, 1);
    assert!(summary.is_balanced());

    let failed = rec.first(EventKind::OutcomeFailed).expect("failure event");
    assert_eq!(failed.label, Some("dispatch_timeout"));
    assert_eq!(rec.count(EventKind::DrainCompleted), 1);
}

#[tokio::test(start_paused = true)]
async fn failures_are_counted_by_class() {
    let rec = Arc::new(Recorder::default());
    let cfg = config(Duration::from_secs(1), Duration::from_secs(1));

    let calls = Arc::new(AtomicUsize::new(0));
    let executor: ExecutorRef = ExecutorFn::arc(move |_req: Arc<Request>, _ctx: CancellationToken| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            let raw = match n {
                0 => RawResponse {
                    status: 503,
                    ..RawResponse::json("{}")
                },
                1 => RawResponse {
                    content_type: Some("text/plain".to_string()),
                    ..RawResponse::json("abc-123")
                },
                2 => RawResponse::json(r#"{"not_the_field":"x"}"#),
                _ => RawResponse::json(r#"{"uuid":"abc-123"}"#),
            };
            Ok::<_, DispatchError>(raw)
        }
    });

    // launches at 0, 1, 2, 3
    let summary = run_for(cfg, executor, &rec, Duration::from_millis(3_500))
        .await
        .expect("clean drain");

    assert_eq!(summary.launched, 4);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.protocol, 2);
    assert_eq!(summary.decode, 1);
    assert_eq!(summary.transport, 0);
    assert!(summary.is_balanced());

    let labels: Vec<&str> = rec
        .all()
        .into_iter()
        .filter(|e| e.kind == EventKind::OutcomeFailed)
        .filter_map(|e| e.label)
        .collect();
    assert_eq!(
        labels,
        vec![
            "dispatch_unexpected_status",
            "dispatch_unexpected_content_type",
            "dispatch_decode",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_shutdown_requests_stop_once() {
    let rec = Arc::new(Recorder::default());
    let service = Service::builder(config(Duration::from_secs(1), Duration::from_secs(1)))
        .with_executor(respond_after(Duration::from_millis(100)))
        .with_subscriber(rec.clone())
        .build()
        .expect("valid config");

    let handle = service.shutdown_handle();
    let other = handle.clone();
    let trigger = async move {
        sleep(Duration::from_millis(1_500)).await;
        assert!(handle.request());
        assert!(!handle.request());
        assert!(!other.request());
    };

    let summary = service.run_until(trigger).await.expect("clean drain");
    assert!(summary.is_balanced());
    assert_eq!(rec.count(EventKind::ShutdownRequested), 1);
    assert_eq!(rec.count(EventKind::Stopped), 1);
}

#[tokio::test(start_paused = true)]
async fn handle_stops_service_without_trigger() {
    let rec = Arc::new(Recorder::default());
    let service = Service::builder(config(Duration::from_secs(1), Duration::from_secs(1)))
        .with_executor(respond_after(Duration::ZERO))
        .with_subscriber(rec.clone())
        .build()
        .expect("valid config");

    let handle = service.shutdown_handle();
    tokio::spawn(async move {
        sleep(Duration::from_millis(2_500)).await;
        handle.request();
    });

    let summary = service
        .run_until(std::future::pending::<()>())
        .await
        .expect("clean drain");
    assert_eq!(summary.launched, 3);
    assert_eq!(rec.count(EventKind::Stopped), 1);
}

#[tokio::test(start_paused = true)]
async fn grace_expiry_abandons_stuck_dispatches() {
    let rec = Arc::new(Recorder::default());
    let cfg = Config {
        grace: Duration::from_secs(1),
        ..config(Duration::from_secs(30), Duration::from_secs(10))
    };

    let err = run_for(cfg, hang(), &rec, Duration::from_millis(500))
        .await
        .expect_err("dispatch outlives the grace");

    match err {
        RuntimeError::GraceExceeded { grace, abandoned } => {
            assert_eq!(grace, Duration::from_secs(1));
            assert_eq!(abandoned, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let exceeded = rec.first(EventKind::GraceExceeded).expect("grace event");
    assert_eq!(exceeded.in_flight, Some(1));
    assert_eq!(rec.count(EventKind::DrainCompleted), 0);

    let summary = rec
        .first(EventKind::Stopped)
        .and_then(|e| e.summary)
        .expect("stop summary");
    assert_eq!(summary.abandoned, 1);
    assert!(summary.is_balanced());
}

/// Sleeps on every `OutcomeSucceeded` before recording it.
struct Sluggish {
    delay: Duration,
    inner: Recorder,
}

#[async_trait]
impl Subscribe for Sluggish {
    async fn on_event(&self, event: &Event) {
        if event.kind == EventKind::OutcomeSucceeded {
            sleep(self.delay).await;
        }
        self.inner.on_event(event).await;
    }
}

#[tokio::test(start_paused = true)]
async fn grace_expiry_never_cuts_an_event_short() {
    let fast = Arc::new(Recorder::default());
    let slow = Arc::new(Sluggish {
        delay: Duration::from_secs(2),
        inner: Recorder::default(),
    });
    let cfg = Config {
        grace: Duration::from_secs(1),
        ..config(Duration::from_secs(30), Duration::from_secs(5))
    };

    // Outcome lands at 0.8s; its delivery to `slow` outlasts the 1.5s deadline.
    let summary = Service::builder(cfg)
        .with_executor(respond_after(Duration::from_millis(800)))
        .with_subscriber(fast.clone())
        .with_subscriber(slow.clone())
        .build()
        .expect("valid config")
        .run_until(sleep(Duration::from_millis(500)))
        .await
        .expect("nothing was abandoned");

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.abandoned, 0);

    let expected = vec![
        EventKind::DispatchLaunched,
        EventKind::ShutdownRequested,
        EventKind::OutcomeSucceeded,
        EventKind::DrainCompleted,
        EventKind::Stopped,
    ];
    assert_eq!(fast.kinds(), expected);
    assert_eq!(slow.inner.kinds(), expected);
}

#[tokio::test(start_paused = true)]
async fn grace_report_matches_the_abandoned_dispatches() {
    let rec = Arc::new(Recorder::default());
    let cfg = Config {
        grace: Duration::from_secs(1),
        ..config(Duration::from_secs(1), Duration::from_secs(10))
    };

    // #1 answers at 1.5s (inside the grace), #2 never answers.
    let calls = Arc::new(AtomicUsize::new(0));
    let executor: ExecutorRef = ExecutorFn::arc(move |_req: Arc<Request>, _ctx: CancellationToken| {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n > 0 {
                std::future::pending::<()>().await;
            }
            sleep(Duration::from_millis(1_500)).await;
            Ok::<_, DispatchError>(RawResponse::json(r#"{"uuid":"abc-123"}"#))
        }
    });

    let err = run_for(cfg, executor, &rec, Duration::from_millis(1_200))
        .await
        .expect_err("one dispatch outlives the grace");
    assert!(matches!(
        err,
        RuntimeError::GraceExceeded { abandoned: 1, .. }
    ));

    let exceeded = rec.first(EventKind::GraceExceeded).expect("grace event");
    assert_eq!(exceeded.in_flight, Some(1));

    let summary = rec
        .first(EventKind::Stopped)
        .and_then(|e| e.summary)
        .expect("stop summary");
    assert_eq!(summary.launched, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.drained, 1);
    assert_eq!(summary.abandoned, 1);
    assert!(summary.is_balanced());
}

#[tokio::test(start_paused = true)]
async fn outcomes_never_follow_drain_completed() {
    for run in 0..100 {
        let rec = Arc::new(Recorder::default());
        let cfg = config(Duration::from_secs(1), Duration::from_secs(2));

        let summary = run_for(
            cfg,
            respond_after(Duration::from_millis(800)),
            &rec,
            Duration::from_millis(2_500),
        )
        .await
        .expect("clean drain");
        assert_eq!(summary.succeeded, 3, "run {run}");

        let kinds = rec.kinds();
        let completed = rec.position(EventKind::DrainCompleted).expect("completed");
        assert!(
            kinds[completed..]
                .iter()
                .all(|k| matches!(k, EventKind::DrainCompleted | EventKind::Stopped)),
            "run {run}: {kinds:?}"
        );
        assert_eq!(kinds.last(), Some(&EventKind::Stopped), "run {run}");
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_executor_is_counted() {
    let rec = Arc::new(Recorder::default());
    let executor: ExecutorRef = ExecutorFn::arc(|_req: Arc<Request>, _ctx: CancellationToken| async {
        if true {
            panic!("executor blew up");
        }
        Ok::<_, DispatchError>(RawResponse::json("{}"))
    });

    let summary = run_for(
        config(Duration::from_secs(3), Duration::from_secs(1)),
        executor,
        &rec,
        Duration::from_millis(500),
    )
    .await
    .expect("clean drain");

    assert_eq!(summary.launched, 1);
    assert_eq!(summary.panicked, 1);
    assert!(summary.is_balanced());
    assert_eq!(rec.count(EventKind::DispatchPanicked), 1);
}

#[test]
fn build_rejects_invalid_config() {
    let cfg = Config {
        interval: Duration::ZERO,
        ..Config::default()
    };
    let err = Service::builder(cfg)
        .with_executor(hang())
        .build()
        .err()
        .expect("zero interval rejected");
    assert!(matches!(err, RuntimeError::InvalidConfig { .. }));
}
