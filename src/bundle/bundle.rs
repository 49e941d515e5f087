// src/bundle/bundle.rs

use std::path::{Path, PathBuf};

use crate::graph::{AssetGraph, TraversalAction};
use crate::types::{Asset, Environment, Stats, Target};

use super::MainAssetGraph;

/// An output grouping of assets rooted at one entry asset.
///
/// Owns an independent copy of the part of the main graph it was carved from;
/// later changes to the main graph are not reflected here. `file_path`,
/// `is_entry`, `target` and `name` start out unset and are filled in by the
/// naming and packaging stages.
#[derive(Debug, Clone)]
pub struct Bundle {
    id: String,
    file_path: Option<PathBuf>,
    is_entry: Option<bool>,
    target: Option<Target>,
    name: Option<String>,
    bundle_type: String,
    asset_graph: AssetGraph,
    env: Environment,
    stats: Stats,
}

impl Bundle {
    pub(crate) fn new(entry: &Asset, asset_graph: AssetGraph) -> Self {
        Self {
            id: format!("bundle:{}", entry.id),
            file_path: None,
            is_entry: None,
            target: None,
            name: None,
            bundle_type: entry.asset_type.clone(),
            asset_graph,
            env: entry.env.clone(),
            stats: Stats::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn is_entry(&self) -> Option<bool> {
        self.is_entry
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Content kind, copied from the entry asset.
    pub fn bundle_type(&self) -> &str {
        &self.bundle_type
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn asset_graph(&self) -> &AssetGraph {
        &self.asset_graph
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn set_is_entry(&mut self, is_entry: bool) {
        self.is_entry = Some(is_entry);
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn set_stats(&mut self, stats: Stats) {
        self.stats = stats;
    }

    /// The asset(s) directly below the bundle's root.
    pub fn entry_assets(&self) -> Vec<&Asset> {
        self.asset_graph.get_entry_assets()
    }

    /// Walk the assets contained in this bundle.
    pub fn traverse_assets<'b, T, F>(&'b self, visit: F) -> Option<T>
    where
        F: FnMut(&'b Asset) -> TraversalAction<T>,
    {
        MainAssetGraph::new(&self.asset_graph).traverse_assets(visit)
    }

    /// Sum of the sizes of every asset in the bundle.
    pub fn total_asset_size(&self) -> u64 {
        self.asset_graph.get_assets().map(|a| a.stats.size).sum()
    }
}
