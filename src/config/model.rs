// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::queue::QueueOptions;
use crate::types::{Asset, Environment, Stats};

/// A build manifest exactly as read from TOML.
///
/// ```toml
/// [config]
/// max_concurrent = 4
///
/// [asset.index]
/// type = "js"
/// file_path = "src/index.js"
/// entry = true
///
/// [asset.util]
/// type = "js"
///
/// [[dependency]]
/// from = "index"
/// specifier = "./util"
/// resolves_to = "util"
/// ```
///
/// Nothing here has been checked yet; convert into a [`Manifest`] with
/// `Manifest::try_from` (or use [`crate::config::load_and_validate`]).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawManifest {
    #[serde(default)]
    pub config: ConfigSection,

    /// All assets from `[asset.<id>]`, keyed by asset id.
    #[serde(default)]
    pub asset: BTreeMap<String, AssetConfig>,

    /// All `[[dependency]]` entries, in file order.
    #[serde(default)]
    pub dependency: Vec<DependencyConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Ceiling on concurrently running build tasks. Absent means unbounded.
    #[serde(default)]
    pub max_concurrent: Option<i64>,
}

impl ConfigSection {
    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions {
            max_concurrent: self.max_concurrent,
        }
    }
}

/// `[asset.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    #[serde(rename = "type", default = "default_asset_type")]
    pub asset_type: String,

    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Whether the build requests this asset directly.
    #[serde(default)]
    pub entry: bool,

    #[serde(default)]
    pub env: Environment,
}

fn default_asset_type() -> String {
    "js".to_string()
}

impl AssetConfig {
    /// The graph asset described by this section.
    pub fn to_asset(&self, id: &str) -> Asset {
        let asset = Asset::new(id, self.asset_type.clone(), self.env.clone()).with_stats(Stats {
            size: self.size,
            time: 0,
        });
        match &self.file_path {
            Some(path) => asset.with_file_path(path.clone()),
            None => asset,
        }
    }
}

/// One `[[dependency]]` entry: `from` requests `specifier`.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyConfig {
    pub from: String,

    pub specifier: String,

    /// Asset the request resolves to; unresolved when absent.
    #[serde(default)]
    pub resolves_to: Option<String>,

    #[serde(rename = "async", default)]
    pub is_async: bool,

    #[serde(rename = "optional", default)]
    pub is_optional: bool,
}

/// A manifest that passed validation.
///
/// Every `from` and `resolves_to` names a declared asset, at least one asset
/// is an entry and `max_concurrent`, if set, is positive.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub config: ConfigSection,
    pub asset: BTreeMap<String, AssetConfig>,
    pub dependency: Vec<DependencyConfig>,
}

impl Manifest {
    pub(crate) fn new_unchecked(raw: RawManifest) -> Self {
        Self {
            config: raw.config,
            asset: raw.asset,
            dependency: raw.dependency,
        }
    }

    /// Ids of entry assets, in id order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.asset
            .iter()
            .filter(|(_, asset)| asset.entry)
            .map(|(id, _)| id.as_str())
    }

    /// Dependencies requested by `asset_id`, in file order.
    pub fn dependencies_of<'m>(
        &'m self,
        asset_id: &'m str,
    ) -> impl Iterator<Item = &'m DependencyConfig> + 'm {
        self.dependency.iter().filter(move |dep| dep.from == asset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnvironmentContext;

    #[test]
    fn parses_full_manifest() {
        let raw: RawManifest = toml::from_str(
            r#"
            [config]
            max_concurrent = 3

            [asset.index]
            type = "js"
            file_path = "src/index.js"
            size = 120
            entry = true
            env = { context = "node", engines = { node = ">= 18" } }

            [asset.style]
            type = "css"

            [[dependency]]
            from = "index"
            specifier = "./style.css"
            resolves_to = "style"
            async = true
            "#,
        )
        .unwrap();

        assert_eq!(raw.config.max_concurrent, Some(3));
        let index = &raw.asset["index"];
        assert!(index.entry);
        assert_eq!(index.size, 120);
        assert_eq!(index.env.context, EnvironmentContext::Node);
        assert_eq!(index.env.engines["node"], ">= 18");

        let dep = &raw.dependency[0];
        assert!(dep.is_async);
        assert!(!dep.is_optional);
        assert_eq!(dep.resolves_to.as_deref(), Some("style"));

        let asset = index.to_asset("index");
        assert_eq!(asset.stats.size, 120);
        assert_eq!(asset.file_path.as_deref(), Some(std::path::Path::new("src/index.js")));
    }

    #[test]
    fn defaults_apply_to_sparse_manifest() {
        let raw: RawManifest = toml::from_str("[asset.a]\n").unwrap();

        assert!(raw.config.max_concurrent.is_none());
        assert!(raw.dependency.is_empty());
        let a = &raw.asset["a"];
        assert_eq!(a.asset_type, "js");
        assert!(!a.entry);
        assert_eq!(a.env, Environment::default());
    }
}
