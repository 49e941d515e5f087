// tests/queue_scheduling.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::Mutex;

use assetflow::errors::QueueError;
use assetflow::queue::{PromiseQueue, QueueOptions};

/// Counts tasks in flight and remembers the highest count seen.
#[derive(Default)]
struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
    completed: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ceiling_of_two_holds_across_five_tasks() {
    init_tracing();

    let queue = PromiseQueue::new(QueueOptions::bounded(2)).unwrap();
    let gauge = Arc::new(Gauge::default());

    for i in 0..5u64 {
        let gauge = Arc::clone(&gauge);
        queue.add(move || async move {
            gauge.enter();
            tokio::time::sleep(Duration::from_millis(10 + i * 3)).await;
            gauge.leave();
            Ok(())
        });
    }

    with_timeout(queue.run()).await.unwrap();

    assert_eq!(gauge.completed.load(Ordering::SeqCst), 5);
    assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(gauge.current.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unbounded_queue_runs_everything_at_once() {
    init_tracing();

    let queue = PromiseQueue::unbounded();
    let gauge = Arc::new(Gauge::default());
    let barrier = Arc::new(tokio::sync::Barrier::new(6));

    for _ in 0..6 {
        let (gauge, barrier) = (Arc::clone(&gauge), Arc::clone(&barrier));
        queue.add(move || async move {
            gauge.enter();
            // Only returns once all six tasks are executing together.
            barrier.wait().await;
            gauge.leave();
            Ok(())
        });
    }

    with_timeout(queue.run()).await.unwrap();
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn failing_third_task_fails_the_run_and_nothing_later_starts() {
    init_tracing();

    let queue = PromiseQueue::new(QueueOptions::bounded(2)).unwrap();
    let started = Arc::new(Mutex::new(Vec::new()));
    let (release_second, second_gate) = tokio::sync::oneshot::channel::<()>();
    let mut second_gate = Some(second_gate);

    for i in 1..=5 {
        let started = Arc::clone(&started);
        let gate = if i == 2 { second_gate.take() } else { None };
        queue.add(move || async move {
            started.lock().await.push(i);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            match i {
                3 => Err(anyhow!("task #3 exploded")),
                _ => Ok(()),
            }
        });
    }

    let err = with_timeout(queue.run()).await.unwrap_err();
    match &err {
        QueueError::TaskFailed(cause) => assert_eq!(cause.to_string(), "task #3 exploded"),
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    // Task 2 is still parked; finishing it must not start 4 or 5.
    let _ = release_second.send(());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(*started.lock().await, vec![1, 2, 3]);

    assert_eq!(queue.pending_len(), 0);
    assert_eq!(queue.running(), 0);
    assert!(!queue.is_running());

    let handle = queue.add(|| async { Ok(42) });
    with_timeout(queue.run()).await.unwrap();
    assert_eq!(handle.await.unwrap(), 42);
}

#[test]
fn invalid_ceilings_fail_before_any_task_is_added() {
    for bad in [0, -1, i64::MIN] {
        match PromiseQueue::new(QueueOptions::bounded(bad)) {
            Err(QueueError::InvalidConfiguration(n)) => assert_eq!(n, bad),
            other => panic!("expected InvalidConfiguration for {bad}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn second_run_observes_the_outstanding_completion() {
    init_tracing();

    let queue = PromiseQueue::new(QueueOptions::bounded(1)).unwrap();
    let runs = Arc::new(AtomicUsize::new(0));
    let (release, gate) = tokio::sync::oneshot::channel::<()>();

    let counter = Arc::clone(&runs);
    queue.add(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = gate.await;
        Ok(())
    });

    let first = queue.run();
    let second = queue.run();
    assert!(first.same_run(&second));
    assert!(!second.is_settled());

    let _ = release.send(());
    with_timeout(first.clone()).await.unwrap();
    assert!(second.outcome().is_some_and(|outcome| outcome.is_ok()));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn completion_can_be_awaited_by_many_waiters() {
    init_tracing();

    let queue = PromiseQueue::unbounded();
    queue.add(|| async { Err::<(), _>(anyhow!("nope")) });
    let completion = queue.run();

    let waiters: Vec<_> = (0..3)
        .map(|_| tokio::spawn(completion.clone().wait()))
        .collect();

    for waiter in waiters {
        let outcome = with_timeout(waiter).await.unwrap();
        assert!(matches!(outcome, Err(QueueError::TaskFailed(_))));
    }
    assert!(matches!(completion.await, Err(QueueError::TaskFailed(_))));
}
