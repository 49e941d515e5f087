// src/bundle/mod.rs

//! Bundle-facing view of the asset graph.
//!
//! [`MainAssetGraph`] is what downstream bundling logic sees: assets and
//! dependency requests only, never the graph's bookkeeping root. Its
//! [`MainAssetGraph::create_bundle`] carves an independent [`Bundle`] out of
//! the graph for one entry asset.

#[allow(clippy::module_inception)]
pub mod bundle;
pub mod main_graph;

pub use bundle::Bundle;
pub use main_graph::{MainAssetGraph, Traversable};
