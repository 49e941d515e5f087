// src/config/mod.rs

//! The TOML build manifest.
//!
//! - [`model`] is the serde-backed data model.
//! - [`loader`] reads a manifest from disk.
//! - [`validate`] turns a [`RawManifest`] into a checked [`Manifest`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_manifest_path, load_and_validate, load_from_path};
pub use model::{AssetConfig, ConfigSection, DependencyConfig, Manifest, RawManifest};
pub use validate::validate_manifest;
