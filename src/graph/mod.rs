// src/graph/mod.rs

//! The dependency graph store.
//!
//! - [`node`] defines the typed vertices (root sentinel, assets, dependency
//!   requests) and the plain edge description.
//! - [`store`] holds [`AssetGraph`], the id-keyed directed multigraph with
//!   subgraph extraction and short-circuiting traversal.
//! - [`asset_graph`] adds the asset/dependency-shaped reads and writes that
//!   build stages use to grow the graph.
//! - [`traversal`] defines the visitor protocol.

pub mod asset_graph;
pub mod node;
pub mod store;
pub mod traversal;

pub use node::{Edge, Node, NodeKind, ROOT_ID};
pub use store::AssetGraph;
pub use traversal::TraversalAction;
