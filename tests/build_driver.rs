// tests/build_driver.rs

mod common;
use crate::common::builders::{ManifestBuilder, asset_config};
use crate::common::{init_tracing, with_timeout};

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use assetflow::cli::CliArgs;
use assetflow::config::load_and_validate;
use assetflow::queue::{PromiseQueue, QueueOptions};
use assetflow::{build, build_graph, run};

#[tokio::test]
async fn one_bundle_per_entry_asset() {
    init_tracing();

    let manifest = ManifestBuilder::new()
        .max_concurrent(2)
        .entry("home")
        .entry("checkout")
        .entry("account")
        .asset_with("vendor", asset_config(false, 100))
        .dependency("home", "vendor", Some("vendor"))
        .dependency("checkout", "vendor", Some("vendor"))
        .dependency("account", "vendor", Some("vendor"))
        .build();

    let queue = PromiseQueue::new(manifest.config.queue_options()).unwrap();
    let report = with_timeout(build(manifest, &queue)).await.unwrap();

    let mut ids: Vec<_> = report.bundles.iter().map(|b| b.id().to_string()).collect();
    ids.sort();
    assert_eq!(ids, ["bundle:account", "bundle:checkout", "bundle:home"]);

    for bundle in &report.bundles {
        assert_eq!(bundle.entry_assets().len(), 1);
        assert!(bundle.asset_graph().has_node("vendor"));
        assert_eq!(bundle.stats().size, 100);
    }

    // The shared asset exists once in the main graph.
    assert_eq!(report.graph.get_assets().filter(|a| a.id == "vendor").count(), 1);
    assert!(!queue.is_running());
}

#[tokio::test]
async fn graph_keeps_unresolved_requests() {
    init_tracing();

    let manifest = ManifestBuilder::new()
        .entry("index")
        .dependency("index", "./not-yet", None)
        .build();

    let queue = PromiseQueue::unbounded();
    let graph = with_timeout(build_graph(Arc::new(manifest), &queue)).await.unwrap();

    let deps: Vec<_> = graph.get_dependency_nodes().collect();
    assert_eq!(deps.len(), 2);
    let unresolved: Vec<_> = deps.iter().filter(|d| !graph.is_resolved(d)).collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].module_specifier, "./not-yet");
}

#[tokio::test]
async fn serial_queue_builds_the_same_graph() {
    init_tracing();

    let manifest = || {
        ManifestBuilder::new()
            .entry("a")
            .asset("b")
            .asset("c")
            .asset("d")
            .dependency("a", "./b", Some("b"))
            .dependency("a", "./c", Some("c"))
            .dependency("b", "./d", Some("d"))
            .dependency("c", "./d", Some("d"))
            .build()
    };

    let serial = PromiseQueue::new(QueueOptions::bounded(1)).unwrap();
    let wide = PromiseQueue::unbounded();
    let g1 = with_timeout(build_graph(Arc::new(manifest()), &serial)).await.unwrap();
    let g2 = with_timeout(build_graph(Arc::new(manifest()), &wide)).await.unwrap();

    assert_eq!(g1.node_count(), g2.node_count());
    assert_eq!(g1.edge_count(), g2.edge_count());
    assert_eq!(g1.node_count(), 1 + 1 + 4 + 4);
}

#[tokio::test]
async fn run_accepts_manifest_on_disk_in_dry_run_mode() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[config]
max_concurrent = 1

[asset.index]
entry = true
file_path = "src/index.js"

[asset.util]

[[dependency]]
from = "index"
specifier = "./util"
resolves_to = "util"
"#
    )
    .unwrap();

    assert!(load_and_validate(file.path()).is_ok());

    let args = CliArgs {
        manifest: file.path().to_path_buf(),
        max_concurrent: None,
        log_level: None,
        dry_run: true,
    };
    with_timeout(run(args)).await.unwrap();
}

#[tokio::test]
async fn cli_ceiling_override_is_validated() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[asset.index]\nentry = true\n").unwrap();

    let args = CliArgs {
        manifest: file.path().to_path_buf(),
        max_concurrent: Some(0),
        log_level: None,
        dry_run: false,
    };
    let err = with_timeout(run(args)).await.unwrap_err();
    assert!(err.to_string().contains("max_concurrent"));
}
