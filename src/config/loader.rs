// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Read and deserialize a manifest without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let manifest: RawManifest = toml::from_str(&contents)?;

    debug!(
        path = %path.display(),
        assets = manifest.asset.len(),
        dependencies = manifest.dependency.len(),
        "loaded manifest"
    );
    Ok(manifest)
}

/// Read, deserialize and validate a manifest.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(&path)?;
    Manifest::try_from(raw)
}

/// `Assetflow.toml` in the current working directory.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("Assetflow.toml")
}
