// src/graph/asset_graph.rs

//! Asset- and dependency-shaped operations on [`AssetGraph`].
//!
//! The graph's shape is always:
//!
//! ```text
//! root -> entry dependency -> asset -> dependency -> asset -> ...
//! ```
//!
//! A dependency request is resolved once it has an outgoing edge to an asset.

use tracing::debug;

use crate::errors::GraphError;
use crate::graph::node::Node;
use crate::graph::store::AssetGraph;
use crate::types::{Asset, Dependency};

impl AssetGraph {
    /// A fresh graph with a root node and the given entry dependencies below it.
    pub fn with_entries(entries: impl IntoIterator<Item = Dependency>) -> Self {
        let mut graph = AssetGraph::new();
        graph.set_root_node(Node::Root);
        for dep in entries {
            graph.attach_entry(dep);
        }
        graph
    }

    /// Add a dependency requested by the build itself (an entry point).
    ///
    /// Installs a root node first if the graph has none.
    pub fn add_entry_dependency(&mut self, dep: Dependency) {
        if self.root_index().is_none() {
            self.set_root_node(Node::Root);
        }
        self.attach_entry(dep);
    }

    fn attach_entry(&mut self, dep: Dependency) {
        let Some(root) = self.root_index() else {
            return;
        };
        let dep_idx = self.insert_node(Node::DependencyRequest(dep));
        self.link(root, dep_idx);
    }

    pub fn add_asset(&mut self, asset: Asset) {
        debug!(asset = %asset.id, asset_type = %asset.asset_type, "adding asset to graph");
        self.insert_node(Node::Asset(asset));
    }

    /// Record that the asset `asset_id` requests `dep`.
    pub fn add_dependency(&mut self, asset_id: &str, dep: Dependency) -> Result<(), GraphError> {
        let Some(asset_idx) = self.index_of(asset_id) else {
            return Err(GraphError::DanglingReference {
                from: asset_id.to_string(),
                to: dep.id.clone(),
            });
        };

        let dep_idx = self.insert_node(Node::DependencyRequest(dep));
        self.link(asset_idx, dep_idx);
        Ok(())
    }

    /// Resolve the dependency `dep_id` to `asset`, adding the asset if it is new.
    ///
    /// A previous resolution of the same dependency is replaced.
    pub fn resolve_dependency(&mut self, dep_id: &str, asset: Asset) -> Result<(), GraphError> {
        let Some(dep_idx) = self.index_of(dep_id) else {
            return Err(GraphError::DanglingReference {
                from: dep_id.to_string(),
                to: asset.id.clone(),
            });
        };

        debug!(dependency = %dep_id, asset = %asset.id, "resolving dependency");
        self.clear_outgoing(dep_idx);
        let asset_idx = self.insert_node(Node::Asset(asset));
        self.link(dep_idx, asset_idx);
        Ok(())
    }

    /// Outgoing dependency requests of `asset`, in the order they were added.
    pub fn get_dependencies(&self, asset: &Asset) -> Vec<&Dependency> {
        self.get_nodes_connected_from(&asset.id)
            .into_iter()
            .filter_map(Node::as_dependency)
            .collect()
    }

    /// The asset `dep` resolves to, or `None` while it is unresolved.
    pub fn get_dependency_resolution(&self, dep: &Dependency) -> Option<&Asset> {
        self.get_nodes_connected_from(&dep.id)
            .into_iter()
            .find_map(Node::as_asset)
    }

    /// Dependency requests that resolve to `asset`.
    pub fn get_incoming_dependencies(&self, asset: &Asset) -> Vec<&Dependency> {
        self.get_nodes_connected_to(&asset.id)
            .into_iter()
            .filter_map(Node::as_dependency)
            .collect()
    }

    /// Assets that the root's entry dependencies resolve to.
    pub fn get_entry_assets(&self) -> Vec<&Asset> {
        let Some(root) = self.root_node() else {
            return Vec::new();
        };

        self.get_nodes_connected_from(root.id())
            .into_iter()
            .filter_map(|node| match node {
                Node::DependencyRequest(dep) => self.get_dependency_resolution(dep),
                // A bundle graph hangs its entry asset directly off the root.
                Node::Asset(asset) => Some(asset),
                Node::Root => None,
            })
            .collect()
    }

    pub fn get_assets(&self) -> impl Iterator<Item = &Asset> {
        self.nodes().filter_map(Node::as_asset)
    }

    pub fn get_dependency_nodes(&self) -> impl Iterator<Item = &Dependency> {
        self.nodes().filter_map(Node::as_dependency)
    }

    /// Whether `dep` has been resolved to an asset.
    pub fn is_resolved(&self, dep: &Dependency) -> bool {
        self.get_dependency_resolution(dep).is_some()
    }
}
