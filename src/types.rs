// src/types.rs

//! Value types shared by the graph, the bundle façade and the build driver.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Canonical id type for assets, dependencies and graph nodes.
pub type NodeId = String;

/// Where the code of an asset is going to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentContext {
    Browser,
    WebWorker,
    ServiceWorker,
    Node,
    ElectronMain,
    ElectronRenderer,
}

impl Default for EnvironmentContext {
    fn default() -> Self {
        EnvironmentContext::Browser
    }
}

impl EnvironmentContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentContext::Browser => "browser",
            EnvironmentContext::WebWorker => "web-worker",
            EnvironmentContext::ServiceWorker => "service-worker",
            EnvironmentContext::Node => "node",
            EnvironmentContext::ElectronMain => "electron-main",
            EnvironmentContext::ElectronRenderer => "electron-renderer",
        }
    }
}

impl fmt::Display for EnvironmentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "browser" => Ok(EnvironmentContext::Browser),
            "web-worker" => Ok(EnvironmentContext::WebWorker),
            "service-worker" => Ok(EnvironmentContext::ServiceWorker),
            "node" => Ok(EnvironmentContext::Node),
            "electron-main" => Ok(EnvironmentContext::ElectronMain),
            "electron-renderer" => Ok(EnvironmentContext::ElectronRenderer),
            other => Err(format!("invalid environment context: {other}")),
        }
    }
}

/// Build-environment descriptor.
///
/// The graph and the bundler never interpret it; it is copied by value into
/// every structure derived from an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub context: EnvironmentContext,

    /// Engine name to semver range, e.g. `browsers = "> 0.25%"`.
    #[serde(default)]
    pub engines: BTreeMap<String, String>,

    #[serde(default)]
    pub include_node_modules: bool,
}

impl Environment {
    pub fn new(context: EnvironmentContext) -> Self {
        Self {
            context,
            ..Self::default()
        }
    }
}

/// Size and processing time of an asset or bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Size in bytes.
    pub size: u64,
    /// Processing time in milliseconds.
    pub time: u64,
}

/// A tracked source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: NodeId,
    /// Content-kind tag, e.g. `"js"` or `"css"`.
    pub asset_type: String,
    pub env: Environment,
    pub file_path: Option<PathBuf>,
    pub stats: Stats,
}

impl Asset {
    pub fn new(id: impl Into<NodeId>, asset_type: impl Into<String>, env: Environment) -> Self {
        Self {
            id: id.into(),
            asset_type: asset_type.into(),
            env,
            file_path: None,
            stats: Stats::default(),
        }
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }
}

/// A request from one asset (or from the build itself, for entries) toward a
/// module specifier.
///
/// Whether the request has been resolved is recorded in the graph as an edge
/// from the dependency node to an asset node, never on this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub id: NodeId,
    pub module_specifier: String,
    pub source_path: Option<PathBuf>,
    pub env: Environment,
    pub is_async: bool,
    pub is_entry: bool,
    pub is_optional: bool,
}

impl Dependency {
    /// Create a dependency whose id is derived from where it was requested,
    /// what it requests and the environment it is requested in.
    pub fn new(
        module_specifier: impl Into<String>,
        source_path: Option<&Path>,
        env: Environment,
    ) -> Self {
        let module_specifier = module_specifier.into();
        let id = dependency_id(source_path, &module_specifier, &env);
        Self {
            id,
            module_specifier,
            source_path: source_path.map(Path::to_path_buf),
            env,
            is_async: false,
            is_entry: false,
            is_optional: false,
        }
    }

    /// An entry dependency: requested by the build rather than by an asset.
    pub fn entry(module_specifier: impl Into<String>, env: Environment) -> Self {
        let mut dep = Self::new(module_specifier, None, env);
        dep.is_entry = true;
        dep
    }

    /// Override the derived id.
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn with_optional(mut self, is_optional: bool) -> Self {
        self.is_optional = is_optional;
        self
    }
}

/// Hex-encoded 16-byte prefix of a blake3 hash over the identifying fields.
fn dependency_id(source_path: Option<&Path>, specifier: &str, env: &Environment) -> NodeId {
    let mut hasher = blake3::Hasher::new();
    if let Some(path) = source_path {
        hasher.update(path.to_string_lossy().as_bytes());
    }
    hasher.update(b"\0");
    hasher.update(specifier.as_bytes());
    hasher.update(b"\0");
    hasher.update(env.context.as_str().as_bytes());
    for (engine, range) in &env.engines {
        hasher.update(engine.as_bytes());
        hasher.update(range.as_bytes());
    }

    let hash = hasher.finalize();
    hash.as_bytes()[..16]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Output target a bundle is written for. Assigned by later bundling stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub dist_dir: PathBuf,
    pub env: Environment,
}
