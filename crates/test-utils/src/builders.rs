#![allow(dead_code)]

use assetflow::config::{AssetConfig, ConfigSection, DependencyConfig, Manifest, RawManifest};
use assetflow::errors::AssetflowError;
use assetflow::graph::{AssetGraph, Node};
use assetflow::types::{Asset, Dependency, Environment, Stats};

/// Builder for an `AssetGraph` with readable node ids.
///
/// Entry dependencies get the id `entry:<asset>`, asset-to-asset
/// dependencies get `<from>-><to>`.
pub struct GraphBuilder {
    graph: AssetGraph,
    env: Environment,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: AssetGraph::with_entries(Vec::new()),
            env: Environment::default(),
        }
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn asset(self, id: &str) -> Self {
        self.sized_asset(id, 0)
    }

    pub fn sized_asset(mut self, id: &str, size: u64) -> Self {
        let asset = Asset::new(id, "js", self.env.clone()).with_stats(Stats { size, time: 0 });
        self.graph.add_asset(asset);
        self
    }

    /// Add an entry dependency resolving to `id`, creating the asset if needed.
    pub fn entry(mut self, id: &str) -> Self {
        let dep_id = format!("entry:{id}");
        let dep = Dependency::entry(id, self.env.clone()).with_id(dep_id.clone());
        let asset = self.asset_or_new(id);
        self.graph.add_entry_dependency(dep);
        self.graph
            .resolve_dependency(&dep_id, asset)
            .expect("entry dependency was just added");
        self
    }

    /// `from` requests `to` and the request resolves to `to`.
    pub fn depends(mut self, from: &str, to: &str) -> Self {
        self.ensure_asset(from);
        let dep_id = format!("{from}->{to}");
        let dep = Dependency::new(format!("./{to}"), None, self.env.clone()).with_id(dep_id.clone());
        let target = self.asset_or_new(to);
        self.graph
            .add_dependency(from, dep)
            .expect("source asset exists");
        self.graph
            .resolve_dependency(&dep_id, target)
            .expect("dependency was just added");
        self
    }

    /// `from` requests `specifier`, which never resolves.
    pub fn unresolved(mut self, from: &str, specifier: &str) -> Self {
        self.ensure_asset(from);
        let dep = Dependency::new(specifier, None, self.env.clone())
            .with_id(format!("{from}->{specifier}"));
        self.graph
            .add_dependency(from, dep)
            .expect("source asset exists");
        self
    }

    pub fn build(self) -> AssetGraph {
        self.graph
    }

    fn ensure_asset(&mut self, id: &str) {
        if !self.graph.has_node(id) {
            self.graph.add_asset(Asset::new(id, "js", self.env.clone()));
        }
    }

    fn asset_or_new(&self, id: &str) -> Asset {
        self.graph
            .get_node(id)
            .and_then(Node::as_asset)
            .cloned()
            .unwrap_or_else(|| Asset::new(id, "js", self.env.clone()))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a validated `Manifest`.
pub struct ManifestBuilder {
    raw: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawManifest::default(),
        }
    }

    pub fn max_concurrent(mut self, n: i64) -> Self {
        self.raw.config = ConfigSection {
            max_concurrent: Some(n),
        };
        self
    }

    pub fn asset(self, id: &str) -> Self {
        self.asset_with(id, asset_config(false, 0))
    }

    pub fn entry(self, id: &str) -> Self {
        self.asset_with(id, asset_config(true, 0))
    }

    pub fn asset_with(mut self, id: &str, config: AssetConfig) -> Self {
        self.raw.asset.insert(id.to_string(), config);
        self
    }

    /// `from` requests `specifier`, resolving to `resolves_to` when given.
    pub fn dependency(mut self, from: &str, specifier: &str, resolves_to: Option<&str>) -> Self {
        self.raw.dependency.push(DependencyConfig {
            from: from.to_string(),
            specifier: specifier.to_string(),
            resolves_to: resolves_to.map(str::to_string),
            is_async: false,
            is_optional: false,
        });
        self
    }

    pub fn try_build(self) -> Result<Manifest, AssetflowError> {
        Manifest::try_from(self.raw)
    }

    pub fn build(self) -> Manifest {
        self.try_build()
            .expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A plain `js` asset section.
pub fn asset_config(entry: bool, size: u64) -> AssetConfig {
    AssetConfig {
        asset_type: "js".to_string(),
        file_path: None,
        size,
        entry,
        env: Environment::default(),
    }
}
