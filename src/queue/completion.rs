// src/queue/completion.rs

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{oneshot, watch};

use crate::errors::QueueError;

/// Outcome of a whole run: success once every task has finished, or the
/// first task failure.
pub type RunOutcome = Result<(), QueueError>;

/// Aggregate completion of a queue run.
///
/// Settles exactly once. Clones observe the same settlement, and awaiting a
/// completion that has already settled returns immediately.
#[derive(Clone)]
pub struct Completion {
    state: CompletionState,
}

#[derive(Clone)]
enum CompletionState {
    Settled(RunOutcome),
    Pending(watch::Receiver<Option<RunOutcome>>),
}

impl Completion {
    pub(crate) fn settled(outcome: RunOutcome) -> Self {
        Self {
            state: CompletionState::Settled(outcome),
        }
    }

    pub(crate) fn pending(rx: watch::Receiver<Option<RunOutcome>>) -> Self {
        Self {
            state: CompletionState::Pending(rx),
        }
    }

    /// The outcome, if the run has already settled.
    pub fn outcome(&self) -> Option<RunOutcome> {
        match &self.state {
            CompletionState::Settled(outcome) => Some(outcome.clone()),
            CompletionState::Pending(rx) => (*rx.borrow()).clone(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.outcome().is_some()
    }

    /// Whether both completions belong to the same run.
    pub fn same_run(&self, other: &Completion) -> bool {
        match (&self.state, &other.state) {
            (CompletionState::Pending(a), CompletionState::Pending(b)) => a.same_channel(b),
            _ => false,
        }
    }

    /// Wait for the run to settle.
    pub async fn wait(self) -> RunOutcome {
        match self.state {
            CompletionState::Settled(outcome) => outcome,
            CompletionState::Pending(mut rx) => loop {
                let current = (*rx.borrow_and_update()).clone();
                if let Some(outcome) = current {
                    return outcome;
                }
                if rx.changed().await.is_err() {
                    let last = (*rx.borrow()).clone();
                    return last.unwrap_or(Err(QueueError::Abandoned));
                }
            },
        }
    }
}

impl IntoFuture for Completion {
    type Output = RunOutcome;
    type IntoFuture = Pin<Box<dyn Future<Output = RunOutcome> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("outcome", &self.outcome())
            .finish()
    }
}

/// Outcome of one task added to a queue.
///
/// Resolves to the task's value, to [`QueueError::TaskFailed`] with the
/// task's own failure, or to [`QueueError::Discarded`] when a failed run
/// dropped the task before it started. Dropping the handle does not affect
/// the task or the run.
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T, QueueError>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, QueueError>>) -> Self {
        Self { rx }
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, QueueError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(QueueError::Discarded)))
    }
}
