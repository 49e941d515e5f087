// src/queue/mod.rs

//! Concurrency-ceiling task queue.
//!
//! - [`options`] holds the queue configuration and its validation.
//! - [`promise_queue`] owns the pending list, the running counter and the
//!   in-flight run, and drives tasks on the ambient tokio runtime.
//! - [`completion`] provides the one-shot settlement types: the aggregate
//!   [`Completion`] of a run and the per-task [`TaskHandle`].

pub mod completion;
pub mod options;
pub mod promise_queue;

pub use completion::{Completion, RunOutcome, TaskHandle};
pub use options::QueueOptions;
pub use promise_queue::PromiseQueue;
