// src/queue/promise_queue.rs

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

use crate::errors::QueueError;
use crate::queue::completion::{Completion, RunOutcome, TaskHandle};
use crate::queue::options::QueueOptions;

type JobFuture = Pin<Box<dyn Future<Output = Result<(), Arc<anyhow::Error>>> + Send>>;
type Job = Box<dyn FnOnce() -> JobFuture + Send>;

/// Runs a growing list of async tasks with at most `max_concurrent` of them
/// executing at once.
///
/// Tasks are queued with [`PromiseQueue::add`] and started, in FIFO order, by
/// [`PromiseQueue::run`]. A run succeeds once the pending list is drained and
/// nothing is executing; it fails as soon as any task fails. On failure the
/// queue forgets the run immediately: pending tasks are dropped and tasks
/// still executing are left to finish on their own, their outcomes ignored.
///
/// Every run gets a fresh epoch number. A task reports back with the epoch it
/// was started under, so a straggler from an abandoned run can never touch
/// the bookkeeping of a later one.
///
/// Cloning yields another handle to the same queue, which lets running tasks
/// add follow-up work.
#[derive(Clone)]
pub struct PromiseQueue {
    max_concurrent: Option<usize>,
    state: Arc<Mutex<QueueState>>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Job>,
    running: usize,
    active: Option<ActiveRun>,
    /// Epoch of the most recently started run.
    epoch: u64,
}

struct ActiveRun {
    epoch: u64,
    settle: watch::Sender<Option<RunOutcome>>,
    completion: Completion,
}

impl PromiseQueue {
    pub fn new(options: QueueOptions) -> Result<Self, QueueError> {
        let max_concurrent = options.ceiling()?;
        Ok(Self {
            max_concurrent,
            state: Arc::new(Mutex::new(QueueState::default())),
        })
    }

    /// A queue without a concurrency ceiling.
    pub fn unbounded() -> Self {
        Self {
            max_concurrent: None,
            state: Arc::new(Mutex::new(QueueState::default())),
        }
    }

    pub fn max_concurrent(&self) -> Option<usize> {
        self.max_concurrent
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Number of tasks the current run has started and not yet seen finish.
    pub fn running(&self) -> usize {
        self.state.lock().running
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().active.is_some()
    }

    /// Queue a task. Nothing starts until [`PromiseQueue::run`] is called (or,
    /// if a run is in flight, until a slot frees up).
    pub fn add<F, Fut, T>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let job: Job = Box::new(move || -> JobFuture {
            Box::pin(async move {
                // The body runs in its own task so a panic surfaces as a
                // `JoinError` here instead of unwinding past `finish`.
                let outcome = match tokio::spawn(async move { task().await }).await {
                    Ok(outcome) => outcome,
                    Err(join_err) => Err(join_failure(join_err)),
                };
                match outcome {
                    Ok(value) => {
                        let _ = tx.send(Ok(value));
                        Ok(())
                    }
                    Err(err) => {
                        let err = Arc::new(err);
                        let _ = tx.send(Err(QueueError::TaskFailed(Arc::clone(&err))));
                        Err(err)
                    }
                }
            })
        });

        let mut state = self.state.lock();
        state.pending.push_back(job);
        debug!(pending = state.pending.len(), "task added to queue");

        TaskHandle::new(rx)
    }

    /// Start executing queued tasks and return the run's aggregate completion.
    ///
    /// Calling `run` while a run is in flight returns that run's completion
    /// and starts nothing new. With nothing queued, the returned completion
    /// has already succeeded.
    ///
    /// Tasks are spawned onto the current tokio runtime, so this must be
    /// called from within one.
    pub fn run(&self) -> Completion {
        let mut state = self.state.lock();

        if let Some(active) = &state.active {
            debug!(epoch = active.epoch, "run already in flight; sharing its completion");
            return active.completion.clone();
        }

        if state.pending.is_empty() {
            return Completion::settled(Ok(()));
        }

        state.epoch += 1;
        let epoch = state.epoch;
        let (settle, rx) = watch::channel(None);
        let completion = Completion::pending(rx);
        state.active = Some(ActiveRun {
            epoch,
            settle,
            completion: completion.clone(),
        });

        info!(
            epoch,
            pending = state.pending.len(),
            max_concurrent = ?self.max_concurrent,
            "starting queue run"
        );

        self.fill(&mut state, epoch);
        completion
    }

    fn has_capacity(&self, state: &QueueState) -> bool {
        self.max_concurrent.is_none_or(|max| state.running < max)
    }

    /// Start pending tasks until the ceiling is reached or nothing is left.
    fn fill(&self, state: &mut QueueState, epoch: u64) {
        while self.has_capacity(state) {
            let Some(job) = state.pending.pop_front() else {
                break;
            };
            state.running += 1;
            debug!(epoch, running = state.running, "starting task");

            let queue = self.clone();
            tokio::spawn(async move {
                let outcome = job().await;
                queue.finish(epoch, outcome);
            });
        }
    }

    fn finish(&self, epoch: u64, outcome: Result<(), Arc<anyhow::Error>>) {
        let mut state = self.state.lock();

        if state.active.as_ref().map(|run| run.epoch) != Some(epoch) {
            debug!(epoch, "ignoring task outcome from an abandoned run");
            return;
        }

        match outcome {
            Ok(()) => {
                state.running = state.running.saturating_sub(1);
                self.fill(&mut state, epoch);

                if state.pending.is_empty() && state.running == 0 {
                    info!(epoch, "queue run finished");
                    settle(&mut state, Ok(()));
                }
            }
            Err(err) => {
                warn!(
                    epoch,
                    error = %err,
                    discarded = state.pending.len(),
                    still_running = state.running.saturating_sub(1),
                    "task failed; abandoning queue run"
                );
                settle(&mut state, Err(QueueError::TaskFailed(err)));
            }
        }
    }
}

fn join_failure(err: tokio::task::JoinError) -> anyhow::Error {
    if !err.is_panic() {
        return anyhow!("task was cancelled");
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    anyhow!("task panicked: {message}")
}

/// Settle the active run and reset the queue for reuse.
fn settle(state: &mut QueueState, outcome: RunOutcome) {
    state.pending.clear();
    state.running = 0;
    if let Some(run) = state.active.take() {
        run.settle.send_replace(Some(outcome));
    }
}

impl Default for PromiseQueue {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Debug for PromiseQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PromiseQueue")
            .field("max_concurrent", &self.max_concurrent)
            .field("pending", &state.pending.len())
            .field("running", &state.running)
            .field("epoch", &state.epoch)
            .field("in_flight", &state.active.is_some())
            .finish()
    }
}
