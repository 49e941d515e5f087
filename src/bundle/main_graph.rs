// src/bundle/main_graph.rs

use std::convert::Infallible;

use tracing::debug;

use crate::bundle::Bundle;
use crate::errors::BundleError;
use crate::graph::{AssetGraph, Node, ROOT_ID, TraversalAction};
use crate::types::{Asset, Dependency};

/// A node as seen by façade visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversable<'a> {
    Asset(&'a Asset),
    DependencyRequest(&'a Dependency),
}

/// Read-only, asset-centric view over an [`AssetGraph`].
///
/// Holds nothing but the borrowed graph.
#[derive(Debug, Clone, Copy)]
pub struct MainAssetGraph<'a> {
    graph: &'a AssetGraph,
}

impl<'a> MainAssetGraph<'a> {
    pub fn new(graph: &'a AssetGraph) -> Self {
        Self { graph }
    }

    /// Carve a bundle rooted at `asset` out of the graph.
    ///
    /// The bundle owns a copy of everything reachable from the asset, with a
    /// fresh root node pointing at the asset. The main graph is not modified.
    pub fn create_bundle(&self, asset: &Asset) -> Result<Bundle, BundleError> {
        if !self.graph.has_node(&asset.id) {
            return Err(BundleError::AssetNotFound(asset.id.clone()));
        }

        let mut asset_graph = self.graph.get_sub_graph(&asset.id)?;
        asset_graph.set_root_node(Node::Root);
        asset_graph.add_edge(ROOT_ID, &asset.id)?;

        debug!(
            asset = %asset.id,
            nodes = asset_graph.node_count(),
            "created bundle graph"
        );

        Ok(Bundle::new(asset, asset_graph))
    }

    pub fn get_dependencies(&self, asset: &Asset) -> Vec<&'a Dependency> {
        self.graph.get_dependencies(asset)
    }

    pub fn get_dependency_resolution(&self, dep: &Dependency) -> Option<&'a Asset> {
        self.graph.get_dependency_resolution(dep)
    }

    /// Walk assets and dependency requests.
    ///
    /// Root nodes are never handed to `visit`, but their children are walked.
    pub fn traverse<T, F>(&self, mut visit: F) -> Option<T>
    where
        F: FnMut(Traversable<'a>) -> TraversalAction<T>,
    {
        match self.try_traverse(|node| Ok::<_, Infallible>(visit(node))) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    pub fn try_traverse<T, E, F>(&self, mut visit: F) -> Result<Option<T>, E>
    where
        F: FnMut(Traversable<'a>) -> Result<TraversalAction<T>, E>,
    {
        let graph: &'a AssetGraph = self.graph;
        graph.try_traverse(|node| match node {
            Node::Asset(asset) => visit(Traversable::Asset(asset)),
            Node::DependencyRequest(dep) => visit(Traversable::DependencyRequest(dep)),
            Node::Root => Ok(TraversalAction::Continue),
        })
    }

    /// Walk assets only; dependency requests and the root are passed through.
    pub fn traverse_assets<T, F>(&self, mut visit: F) -> Option<T>
    where
        F: FnMut(&'a Asset) -> TraversalAction<T>,
    {
        self.traverse(|node| match node {
            Traversable::Asset(asset) => visit(asset),
            Traversable::DependencyRequest(_) => TraversalAction::Continue,
        })
    }

    pub fn try_traverse_assets<T, E, F>(&self, mut visit: F) -> Result<Option<T>, E>
    where
        F: FnMut(&'a Asset) -> Result<TraversalAction<T>, E>,
    {
        self.try_traverse(|node| match node {
            Traversable::Asset(asset) => visit(asset),
            Traversable::DependencyRequest(_) => Ok(TraversalAction::Continue),
        })
    }
}
