// src/graph/store.rs

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use petgraph::Direction::{Incoming, Outgoing};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::errors::GraphError;
use crate::graph::node::{Edge, Node};
use crate::graph::traversal::TraversalAction;
use crate::types::NodeId;

/// Directed multigraph of [`Node`]s keyed by node id.
///
/// Backed by a petgraph `StableDiGraph` so that indices stay valid when nodes
/// are removed. Parallel edges between the same pair of nodes are allowed:
/// two dependency requests of one asset may resolve to the same asset.
///
/// At most one node is designated as the root. Traversals start there.
#[derive(Debug, Clone, Default)]
pub struct AssetGraph {
    graph: StableDiGraph<Node, ()>,
    ids: HashMap<NodeId, NodeIndex>,
    root: Option<NodeIndex>,
}

impl AssetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or replace the payload of the node with the same id.
    ///
    /// Replacing keeps all edges of the existing node.
    pub fn add_node(&mut self, node: Node) {
        self.insert_node(node);
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.ids.get(node.id()) {
            self.graph[idx] = node;
            return idx;
        }

        let id = node.id().to_string();
        let idx = self.graph.add_node(node);
        self.ids.insert(id, idx);
        idx
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.ids.get(id).map(|&idx| &self.graph[idx])
    }

    /// The designated root node, if one has been set.
    pub fn root_node(&self) -> Option<&Node> {
        self.root.map(|idx| &self.graph[idx])
    }

    /// Install `node` and designate it as the root of this graph.
    ///
    /// A previously designated root stays in the graph as an ordinary node
    /// unless it has the same id, in which case it is replaced.
    pub fn set_root_node(&mut self, node: Node) {
        let idx = self.insert_node(node);
        self.root = Some(idx);
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.ids.remove(id)?;
        if self.root == Some(idx) {
            self.root = None;
        }
        self.graph.remove_node(idx)
    }

    /// Append a directed edge `from -> to`.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let (Some(&a), Some(&b)) = (self.ids.get(from), self.ids.get(to)) else {
            return Err(GraphError::DanglingReference {
                from: from.to_string(),
                to: to.to_string(),
            });
        };

        self.graph.add_edge(a, b, ());
        Ok(())
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.ids.get(from), self.ids.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Remove one edge `from -> to`. Parallel edges beyond the first remain.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let edge = match (self.ids.get(from), self.ids.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b),
            _ => None,
        };

        match edge {
            Some(e) => {
                self.graph.remove_edge(e);
                Ok(())
            }
            None => Err(GraphError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| Edge::new(self.graph[a].id(), self.graph[b].id()))
            .collect()
    }

    /// Direct successors of `id`, in edge insertion order.
    ///
    /// A successor appears once per parallel edge.
    pub fn get_nodes_connected_from(&self, id: &str) -> Vec<&Node> {
        self.ids
            .get(id)
            .map(|&idx| self.connected(idx, Outgoing))
            .unwrap_or_default()
    }

    /// Direct predecessors of `id`, in edge insertion order.
    pub fn get_nodes_connected_to(&self, id: &str) -> Vec<&Node> {
        self.ids
            .get(id)
            .map(|&idx| self.connected(idx, Incoming))
            .unwrap_or_default()
    }

    fn connected(&self, idx: NodeIndex, dir: petgraph::Direction) -> Vec<&Node> {
        // petgraph yields the most recently added edge first.
        let mut nodes: Vec<&Node> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| &self.graph[n])
            .collect();
        nodes.reverse();
        nodes
    }

    /// Drop every outgoing edge of `idx`.
    pub(crate) fn clear_outgoing(&mut self, idx: NodeIndex) {
        let edges: Vec<_> = self
            .graph
            .edges_directed(idx, Outgoing)
            .map(|e| e.id())
            .collect();
        for e in edges {
            self.graph.remove_edge(e);
        }
    }

    pub(crate) fn link(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    pub(crate) fn root_index(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Extract an independent copy of everything reachable from `start_id`.
    ///
    /// The copy holds every node reachable over outgoing edges (including the
    /// start node, which becomes the copy's root) and every outgoing edge of
    /// those nodes. Nothing is shared with `self`.
    pub fn get_sub_graph(&self, start_id: &str) -> Result<AssetGraph, GraphError> {
        let start = self
            .index_of(start_id)
            .ok_or_else(|| GraphError::NodeNotFound(start_id.to_string()))?;

        let mut reachable = Vec::new();
        let _ = self.walk([start], |idx, _| {
            reachable.push(idx);
            Ok::<_, Infallible>(TraversalAction::<()>::Continue)
        });

        let mut sub = AssetGraph::new();
        for &idx in &reachable {
            sub.insert_node(self.graph[idx].clone());
        }
        sub.root = sub.index_of(start_id);

        for &idx in &reachable {
            let from = self.graph[idx].id();
            for to in self.connected(idx, Outgoing) {
                sub.add_edge(from, to.id())?;
            }
        }

        debug!(
            start = %start_id,
            nodes = sub.node_count(),
            edges = sub.edge_count(),
            "extracted subgraph"
        );

        Ok(sub)
    }

    /// Depth-first walk from the root, calling `visit` once per reachable node.
    ///
    /// Without a designated root every node is a potential starting point, in
    /// insertion order; each node is still visited at most once.
    pub fn traverse<'g, T, F>(&'g self, mut visit: F) -> Option<T>
    where
        F: FnMut(&'g Node) -> TraversalAction<T>,
    {
        match self.try_traverse(|node| Ok::<_, Infallible>(visit(node))) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Like [`AssetGraph::traverse`], but the visitor may fail. The first
    /// error ends the walk and is returned unchanged.
    pub fn try_traverse<'g, T, E, F>(&'g self, mut visit: F) -> Result<Option<T>, E>
    where
        F: FnMut(&'g Node) -> Result<TraversalAction<T>, E>,
    {
        let starts: Vec<NodeIndex> = match self.root {
            Some(root) => vec![root],
            None => self.graph.node_indices().collect(),
        };
        self.walk(starts, |_, node| visit(node))
    }

    /// Depth-first walk starting at `start_id`. Visits nothing when the node
    /// is unknown.
    pub fn traverse_from<'g, T, F>(&'g self, start_id: &str, mut visit: F) -> Option<T>
    where
        F: FnMut(&'g Node) -> TraversalAction<T>,
    {
        let Some(start) = self.index_of(start_id) else {
            debug!(start = %start_id, "traversal start not in graph; nothing to visit");
            return None;
        };

        match self.walk([start], |_, node| Ok::<_, Infallible>(visit(node))) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Pre-order walk; children are visited in edge insertion order.
    fn walk<'g, T, E, F>(
        &'g self,
        starts: impl IntoIterator<Item = NodeIndex>,
        mut visit: F,
    ) -> Result<Option<T>, E>
    where
        F: FnMut(NodeIndex, &'g Node) -> Result<TraversalAction<T>, E>,
    {
        let mut visited: HashSet<NodeIndex> = HashSet::new();

        for start in starts {
            let mut stack = vec![start];

            while let Some(idx) = stack.pop() {
                if !visited.insert(idx) {
                    continue;
                }

                match visit(idx, &self.graph[idx])? {
                    TraversalAction::Continue => {
                        // Newest edge first, so the oldest child is popped next.
                        stack.extend(
                            self.graph
                                .neighbors_directed(idx, Outgoing)
                                .filter(|n| !visited.contains(n)),
                        );
                    }
                    TraversalAction::SkipChildren => {}
                    TraversalAction::Stop(value) => return Ok(Some(value)),
                }
            }
        }

        Ok(None)
    }
}
