// src/queue/options.rs

use serde::Deserialize;

use crate::errors::QueueError;

/// Configuration for a [`crate::queue::PromiseQueue`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct QueueOptions {
    /// Maximum number of tasks executing at once; `None` means no limit.
    #[serde(default)]
    pub max_concurrent: Option<i64>,
}

impl QueueOptions {
    pub fn bounded(max_concurrent: i64) -> Self {
        Self {
            max_concurrent: Some(max_concurrent),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The ceiling as a task count, or `None` when unbounded.
    pub(crate) fn ceiling(&self) -> Result<Option<usize>, QueueError> {
        match self.max_concurrent {
            None => Ok(None),
            Some(n) if n <= 0 => Err(QueueError::InvalidConfiguration(n)),
            Some(n) => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
        }
    }
}
