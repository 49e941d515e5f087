// tests/bundle_graph.rs

mod common;
use crate::common::builders::GraphBuilder;
use crate::common::init_tracing;

use std::collections::BTreeSet;

use assetflow::bundle::{MainAssetGraph, Traversable};
use assetflow::errors::BundleError;
use assetflow::graph::{AssetGraph, Node, TraversalAction};
use assetflow::types::{Asset, Environment};

/// index -> {a, b}, a -> shared, b -> shared, shared -> ?missing
fn app_graph() -> AssetGraph {
    GraphBuilder::new()
        .entry("index")
        .sized_asset("a", 3)
        .sized_asset("b", 4)
        .sized_asset("shared", 5)
        .depends("index", "a")
        .depends("index", "b")
        .depends("a", "shared")
        .depends("b", "shared")
        .unresolved("shared", "missing-lib")
        .build()
}

fn reachable_ids(graph: &AssetGraph, start: &str) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    graph.traverse_from(start, |node| {
        ids.insert(node.id().to_string());
        TraversalAction::<()>::Continue
    });
    ids
}

#[test]
fn bundle_graph_is_root_plus_reachable_set() {
    init_tracing();

    let graph = app_graph();
    let main = MainAssetGraph::new(&graph);

    for asset in graph.get_assets() {
        let bundle = main.create_bundle(asset).unwrap();
        let bundle_graph = bundle.asset_graph();

        let mut expected = reachable_ids(&graph, &asset.id);
        expected.insert("root".to_string());
        let actual: BTreeSet<_> = bundle_graph.nodes().map(|n| n.id().to_string()).collect();
        assert_eq!(actual, expected, "bundle for {}", asset.id);

        let root_children = bundle_graph.get_nodes_connected_from("root");
        assert_eq!(root_children.len(), 1);
        assert_eq!(root_children[0].id(), asset.id);
        assert_eq!(bundle_graph.root_node(), Some(&Node::Root));
    }
}

#[test]
fn shared_asset_is_visited_once_per_bundle() {
    let graph = app_graph();
    let index = graph.get_node("index").and_then(Node::as_asset).unwrap();
    let bundle = MainAssetGraph::new(&graph).create_bundle(index).unwrap();

    let mut visits = Vec::new();
    bundle.traverse_assets(|asset| {
        visits.push(asset.id.clone());
        TraversalAction::<()>::Continue
    });

    assert_eq!(visits, ["index", "a", "shared", "b"]);
    assert_eq!(bundle.total_asset_size(), 3 + 4 + 5);
}

#[test]
fn missing_asset_fails_and_graph_is_unchanged() {
    let graph = app_graph();
    let before = (graph.node_count(), graph.edge_count());

    let ghost = Asset::new("ghost", "js", Environment::default());
    match MainAssetGraph::new(&graph).create_bundle(&ghost) {
        Err(BundleError::AssetNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected AssetNotFound, got {other:?}"),
    }

    assert_eq!((graph.node_count(), graph.edge_count()), before);
}

#[test]
fn traverse_assets_calls_visitor_once_per_asset() {
    let graph = app_graph();
    let asset_count = graph.get_assets().count();
    let other_count = graph.node_count() - asset_count;
    assert!(other_count > 0);

    let mut calls = 0;
    MainAssetGraph::new(&graph).traverse_assets(|_| {
        calls += 1;
        TraversalAction::<()>::Continue
    });
    assert_eq!(calls, asset_count);
}

#[test]
fn traverse_never_sees_root_but_reaches_its_descendants() {
    let graph = app_graph();
    let mut tags = Vec::new();

    MainAssetGraph::new(&graph).traverse(|node| {
        tags.push(match node {
            Traversable::Asset(asset) => {
                assert!(graph.get_node(&asset.id).and_then(Node::as_asset).is_some());
                "asset"
            }
            Traversable::DependencyRequest(dep) => {
                assert!(graph.get_node(&dep.id).and_then(Node::as_dependency).is_some());
                "dependency"
            }
        });
        TraversalAction::<()>::Continue
    });

    assert_eq!(tags.len(), graph.node_count() - 1);
    assert_eq!(tags.first(), Some(&"dependency"));
    assert_eq!(tags.iter().filter(|t| **t == "asset").count(), 4);
}

#[test]
fn skip_children_prunes_a_subtree() {
    let graph = app_graph();
    let mut seen = Vec::new();

    MainAssetGraph::new(&graph).traverse_assets(|asset| {
        seen.push(asset.id.clone());
        if asset.id == "a" {
            TraversalAction::<()>::SkipChildren
        } else {
            TraversalAction::Continue
        }
    });

    // `shared` is still reached through `b`.
    assert_eq!(seen, ["index", "a", "b", "shared"]);
}

#[test]
fn bundle_is_independent_of_later_graph_changes() {
    let mut graph = app_graph();
    let a = graph.get_node("a").and_then(Node::as_asset).unwrap().clone();
    let bundle = MainAssetGraph::new(&graph).create_bundle(&a).unwrap();
    let nodes_before = bundle.asset_graph().node_count();

    graph.remove_node("shared");
    graph.add_asset(Asset::new("late", "js", Environment::default()));
    graph.add_edge("a", "late").unwrap();

    assert_eq!(bundle.asset_graph().node_count(), nodes_before);
    assert!(bundle.asset_graph().has_node("shared"));
    assert!(!bundle.asset_graph().has_node("late"));
}
