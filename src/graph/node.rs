// src/graph/node.rs

use std::fmt;

use crate::types::{Asset, Dependency, NodeId};

/// Id of the synthetic root node.
pub const ROOT_ID: &str = "root";

/// A vertex of the asset graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Synthetic anchor. Never handed to façade visitors.
    Root,
    Asset(Asset),
    DependencyRequest(Dependency),
}

/// Discriminant of a [`Node`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Asset,
    DependencyRequest,
}

impl NodeKind {
    /// Tag used for this kind in the serialized graph representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Asset => "asset",
            NodeKind::DependencyRequest => "DEPENDENCY_REQUEST",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Root => ROOT_ID,
            Node::Asset(asset) => &asset.id,
            Node::DependencyRequest(dep) => &dep.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root => NodeKind::Root,
            Node::Asset(_) => NodeKind::Asset,
            Node::DependencyRequest(_) => NodeKind::DependencyRequest,
        }
    }

    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Node::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn as_dependency(&self) -> Option<&Dependency> {
        match self {
            Node::DependencyRequest(dep) => Some(dep),
            _ => None,
        }
    }
}

impl From<Asset> for Node {
    fn from(asset: Asset) -> Self {
        Node::Asset(asset)
    }
}

impl From<Dependency> for Node {
    fn from(dep: Dependency) -> Self {
        Node::DependencyRequest(dep)
    }
}

/// A directed edge, described by the ids of its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}
