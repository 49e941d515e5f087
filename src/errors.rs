// src/errors.rs

//! Crate-wide error types and aliases.
//!
//! Each subsystem has its own enum so callers can match on exactly the
//! failures that subsystem produces; [`AssetflowError`] aggregates them for
//! the driver and the binary.

use std::sync::Arc;

use thiserror::Error;

/// Failures raised by [`crate::graph::AssetGraph`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge {from} -> {to} references a node that is not in the graph")]
    DanglingReference { from: String, to: String },

    #[error("node not found in graph: {0}")]
    NodeNotFound(String),

    #[error("edge not found in graph: {from} -> {to}")]
    EdgeNotFound { from: String, to: String },
}

/// Failures raised while carving bundles out of the asset graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    #[error("cannot create bundle for asset that is not in the graph: {0}")]
    AssetNotFound(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Failures raised by [`crate::queue::PromiseQueue`].
///
/// Task failures are shared behind an `Arc` because the same failure is
/// delivered to the aggregate completion and to the failing task's handle.
#[derive(Error, Debug, Clone)]
pub enum QueueError {
    #[error("max_concurrent must be a positive, non-zero value (got {0})")]
    InvalidConfiguration(i64),

    #[error("task failed: {0}")]
    TaskFailed(Arc<anyhow::Error>),

    #[error("task was discarded before it ran because an earlier task failed")]
    Discarded,

    #[error("queue was dropped before the run settled")]
    Abandoned,
}

impl QueueError {
    /// The underlying task failure, if this is a [`QueueError::TaskFailed`].
    pub fn task_failure(&self) -> Option<&anyhow::Error> {
        match self {
            QueueError::TaskFailed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum AssetflowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AssetflowError>;
