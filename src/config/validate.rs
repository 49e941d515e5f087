// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{AssetflowError, Result};
use crate::graph::ROOT_ID;

impl TryFrom<RawManifest> for Manifest {
    type Error = AssetflowError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw))
    }
}

/// Run every semantic check on a raw manifest.
pub fn validate_manifest(manifest: &RawManifest) -> Result<()> {
    ensure_has_entry(manifest)?;
    reject_reserved_ids(manifest)?;
    validate_global_config(manifest)?;
    validate_dependencies(manifest)?;
    warn_on_cycles(manifest);
    Ok(())
}

fn ensure_has_entry(manifest: &RawManifest) -> Result<()> {
    if manifest.asset.is_empty() {
        return Err(AssetflowError::Config(
            "manifest must contain at least one [asset.<id>] section".to_string(),
        ));
    }
    if !manifest.asset.values().any(|asset| asset.entry) {
        return Err(AssetflowError::Config(
            "manifest must mark at least one asset with `entry = true`".to_string(),
        ));
    }
    Ok(())
}

fn reject_reserved_ids(manifest: &RawManifest) -> Result<()> {
    if manifest.asset.contains_key(ROOT_ID) {
        return Err(AssetflowError::Config(format!(
            "asset id '{ROOT_ID}' is reserved for the graph root"
        )));
    }
    Ok(())
}

fn validate_global_config(manifest: &RawManifest) -> Result<()> {
    match manifest.config.max_concurrent {
        Some(n) if n <= 0 => Err(AssetflowError::Config(format!(
            "[config].max_concurrent must be >= 1 (got {n})"
        ))),
        _ => Ok(()),
    }
}

fn validate_dependencies(manifest: &RawManifest) -> Result<()> {
    let mut seen = HashSet::new();

    for dep in &manifest.dependency {
        if !manifest.asset.contains_key(&dep.from) {
            return Err(AssetflowError::Config(format!(
                "dependency '{}' is requested from unknown asset '{}'",
                dep.specifier, dep.from
            )));
        }
        if dep.specifier.trim().is_empty() {
            return Err(AssetflowError::Config(format!(
                "asset '{}' has a dependency with an empty `specifier`",
                dep.from
            )));
        }
        if let Some(target) = &dep.resolves_to {
            if !manifest.asset.contains_key(target) {
                return Err(AssetflowError::Config(format!(
                    "dependency '{}' of asset '{}' resolves to unknown asset '{}'",
                    dep.specifier, dep.from, target
                )));
            }
        }
        if !seen.insert((dep.from.as_str(), dep.specifier.as_str())) {
            return Err(AssetflowError::Config(format!(
                "asset '{}' requests '{}' more than once",
                dep.from, dep.specifier
            )));
        }
    }

    Ok(())
}

/// Module graphs may legitimately contain cycles; report them without failing.
fn warn_on_cycles(manifest: &RawManifest) {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in manifest.asset.keys() {
        graph.add_node(id.as_str());
    }
    for dep in &manifest.dependency {
        if let Some(target) = &dep.resolves_to {
            graph.add_edge(dep.from.as_str(), target.as_str(), ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        warn!(
            asset = cycle.node_id(),
            "asset dependencies form a cycle; each asset is still bundled once"
        );
    }
}
