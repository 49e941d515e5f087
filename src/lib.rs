// src/lib.rs

pub mod build;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod queue;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::bundle::{Bundle, MainAssetGraph, Traversable};
use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::graph::{AssetGraph, TraversalAction};
use crate::queue::{PromiseQueue, QueueOptions};

pub use crate::build::{BuildReport, build, build_graph, bundle_entries};
pub use crate::errors::{AssetflowError, BundleError, GraphError, QueueError};

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the manifest, grows the asset graph on a
/// [`PromiseQueue`] and, unless `--dry-run` is set, bundles every entry.
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest = load_and_validate(&args.manifest)?;

    let options = match args.max_concurrent {
        Some(n) => QueueOptions::bounded(n),
        None => manifest.config.queue_options(),
    };
    let queue = PromiseQueue::new(options)?;
    info!(
        manifest = %args.manifest.display(),
        max_concurrent = ?queue.max_concurrent(),
        "starting build"
    );

    let graph = build_graph(Arc::new(manifest), &queue).await?;

    if args.dry_run {
        print_dry_run(&graph);
        return Ok(());
    }

    let bundles = bundle_entries(Arc::new(graph), &queue).await?;
    print_summary(&bundles);
    Ok(())
}

/// Print the resolved graph, one line per node in traversal order.
fn print_dry_run(graph: &AssetGraph) {
    let unresolved = graph
        .get_dependency_nodes()
        .filter(|dep| !graph.is_resolved(dep))
        .count();

    println!("assetflow dry-run");
    println!("  assets = {}", graph.get_assets().count());
    println!("  dependencies = {}", graph.get_dependency_nodes().count());
    println!("  unresolved = {unresolved}");
    println!();

    println!("graph:");
    MainAssetGraph::new(graph).traverse(|node| {
        match node {
            Traversable::Asset(asset) => {
                println!("  - asset {} [{}] {} B", asset.id, asset.asset_type, asset.stats.size);
            }
            Traversable::DependencyRequest(dep) => {
                let target = graph
                    .get_dependency_resolution(dep)
                    .map(|asset| asset.id.as_str())
                    .unwrap_or("<unresolved>");
                let mut flags = String::new();
                if dep.is_entry {
                    flags.push_str(" entry");
                }
                if dep.is_async {
                    flags.push_str(" async");
                }
                if dep.is_optional {
                    flags.push_str(" optional");
                }
                println!("  - dep {} -> {target}{flags}", dep.module_specifier);
            }
        }
        TraversalAction::<()>::Continue
    });

    debug!("dry-run complete (no bundling)");
}

fn print_summary(bundles: &[Bundle]) {
    println!("bundles ({}):", bundles.len());
    for bundle in bundles {
        let path = bundle
            .file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!(
            "  - {} -> {} ({} assets, {} B)",
            bundle.id(),
            path,
            bundle.asset_graph().get_assets().count(),
            bundle.stats().size
        );
    }
}
