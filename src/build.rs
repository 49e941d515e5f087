// src/build.rs

//! Manifest-driven build: grow the asset graph with resolution tasks on a
//! [`PromiseQueue`], then carve one bundle per entry asset.
//!
//! Resolution tasks share the graph behind a mutex and enqueue follow-up
//! tasks for every dependency the newly resolved asset requests, so the graph
//! grows breadth-first from the entries while the queue keeps at most
//! `max_concurrent` tasks in flight.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::bundle::{Bundle, MainAssetGraph};
use crate::config::Manifest;
use crate::graph::AssetGraph;
use crate::queue::PromiseQueue;
use crate::types::{Asset, Dependency, NodeId, Stats, Target};

/// Directory bundles are assigned to when nothing else is configured.
pub const DEFAULT_DIST_DIR: &str = "dist";

/// Everything a finished build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub graph: AssetGraph,
    pub bundles: Vec<Bundle>,
}

/// Build the graph for `manifest` and bundle every entry asset.
pub async fn build(manifest: Manifest, queue: &PromiseQueue) -> anyhow::Result<BuildReport> {
    let graph = Arc::new(build_graph(Arc::new(manifest), queue).await?);
    let bundles = bundle_entries(Arc::clone(&graph), queue).await?;
    let graph = Arc::try_unwrap(graph).unwrap_or_else(|shared| (*shared).clone());
    Ok(BuildReport { graph, bundles })
}

/// Grow an asset graph from the manifest's entries.
///
/// Each entry asset gets an entry dependency under the root; resolving a
/// dependency to an asset seen for the first time records that asset's own
/// dependencies and queues their resolution.
pub async fn build_graph(manifest: Arc<Manifest>, queue: &PromiseQueue) -> anyhow::Result<AssetGraph> {
    let mut graph = AssetGraph::with_entries(Vec::new());
    let mut seeds = Vec::new();
    for id in manifest.entries() {
        let config = &manifest.asset[id];
        let dep = Dependency::entry(id, config.env.clone());
        seeds.push((dep.id.clone(), id.to_string()));
        graph.add_entry_dependency(dep);
    }

    let ctx = Arc::new(ResolveContext {
        manifest,
        graph: Mutex::new(graph),
        queue: queue.clone(),
    });
    for (dep_id, asset_id) in seeds {
        enqueue_resolution(&ctx, dep_id, asset_id);
    }

    queue.run().await.context("building the asset graph failed")?;

    let graph = std::mem::take(&mut *ctx.graph.lock());
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        assets = graph.get_assets().count(),
        "asset graph complete"
    );
    Ok(graph)
}

/// Create one bundle per entry asset of `graph`, one queue task each.
///
/// Bundles come back in entry order.
pub async fn bundle_entries(graph: Arc<AssetGraph>, queue: &PromiseQueue) -> anyhow::Result<Vec<Bundle>> {
    let entries: Vec<Asset> = graph.get_entry_assets().into_iter().cloned().collect();

    let handles: Vec<_> = entries
        .into_iter()
        .map(|asset| {
            let graph = Arc::clone(&graph);
            queue.add(move || async move { bundle_entry(&graph, &asset) })
        })
        .collect();

    queue.run().await.context("bundling entry assets failed")?;

    let mut bundles = Vec::with_capacity(handles.len());
    for handle in handles {
        bundles.push(handle.await?);
    }
    Ok(bundles)
}

fn bundle_entry(graph: &AssetGraph, asset: &Asset) -> anyhow::Result<Bundle> {
    let mut bundle = MainAssetGraph::new(graph)
        .create_bundle(asset)
        .with_context(|| format!("creating bundle for entry '{}'", asset.id))?;

    let name = format!("{}.{}", asset.id, asset.asset_type);
    bundle.set_is_entry(true);
    bundle.set_file_path(PathBuf::from(DEFAULT_DIST_DIR).join(&name));
    bundle.set_name(name);
    bundle.set_target(Target {
        name: "default".to_string(),
        dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
        env: asset.env.clone(),
    });
    bundle.set_stats(Stats {
        size: bundle.total_asset_size(),
        time: 0,
    });

    info!(
        bundle = %bundle.id(),
        assets = bundle.asset_graph().get_assets().count(),
        size = bundle.stats().size,
        "bundle created"
    );
    Ok(bundle)
}

struct ResolveContext {
    manifest: Arc<Manifest>,
    graph: Mutex<AssetGraph>,
    queue: PromiseQueue,
}

fn enqueue_resolution(ctx: &Arc<ResolveContext>, dep_id: NodeId, asset_id: String) {
    let task_ctx = Arc::clone(ctx);
    ctx.queue
        .add(move || async move { task_ctx.resolve(&dep_id, &asset_id) });
}

impl ResolveContext {
    fn resolve(self: &Arc<Self>, dep_id: &str, asset_id: &str) -> anyhow::Result<()> {
        let config = self
            .manifest
            .asset
            .get(asset_id)
            .with_context(|| format!("asset '{asset_id}' is not declared in the manifest"))?;
        let asset = config.to_asset(asset_id);
        let source_path = asset
            .file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(asset_id));

        let mut follow_ups = Vec::new();
        {
            let mut graph = self.graph.lock();
            let first_visit = !graph.has_node(asset_id);
            graph.resolve_dependency(dep_id, asset.clone())?;

            if !first_visit {
                debug!(asset = %asset_id, "asset already in graph; not expanding again");
                return Ok(());
            }

            for request in self.manifest.dependencies_of(asset_id) {
                let dep = Dependency::new(&request.specifier, Some(source_path.as_path()), asset.env.clone())
                    .with_async(request.is_async)
                    .with_optional(request.is_optional);

                match &request.resolves_to {
                    Some(target) => follow_ups.push((dep.id.clone(), target.clone())),
                    None if !dep.is_optional => warn!(
                        asset = %asset_id,
                        specifier = %request.specifier,
                        "dependency has no resolution"
                    ),
                    None => {}
                }
                graph.add_dependency(asset_id, dep)?;
            }
        }

        for (dep_id, target) in follow_ups {
            enqueue_resolution(self, dep_id, target);
        }
        Ok(())
    }
}
