//! End-to-end integration tests
//!
//! These tests exercise the complete flow: config loading -> graph loading
//! -> resolution -> sync into a file store -> reopening the store.

use std::sync::Arc;

use tokensync_core::{
    ConfigResolver, FileStore, NullProgress, StoreDocument, SyncEngine, VariableValue,
};
use tokensync_meta::{Input, PrimitiveRef, Rgba, load_input, save_document};
use tokensync_test_utils::TestProject;
use tokensync_test_utils::fixtures::{scenario_payload, two_brand_graph};

fn engine_for(project: &TestProject) -> SyncEngine {
    let config = ConfigResolver::new(project.root()).resolve().unwrap();
    let store_path = project.root().join(&config.store_path);
    let store = Arc::new(FileStore::open(store_path).unwrap());
    SyncEngine::new(store, config)
}

async fn sync_file(project: &TestProject, name: &str) -> tokensync_core::SyncReport {
    let engine = engine_for(project);
    match load_input(&project.root().join(name), false).unwrap() {
        Input::Graph(graph) => engine.sync_graph(&graph, &NullProgress).await.unwrap(),
        Input::Payload(payload) => engine.sync(&payload, &NullProgress).await.unwrap(),
    }
}

#[tokio::test]
async fn test_graph_file_to_store_file() {
    let project = TestProject::new();
    project.write_graph("tokens.json", &two_brand_graph());

    let report = sync_file(&project, "tokens.json").await;
    assert!(report.success);
    project.assert_file_exists(".tokensync/store.json");

    let document = StoreDocument::read(&project.store_path()).unwrap();
    let state = &document.state;
    assert_eq!(state.collections.len(), 5);
    assert!(state.dangling_aliases().is_empty());

    let value = state
        .value("Components", "button/filled-bg", "Acme Light")
        .unwrap();
    assert_eq!(
        state.resolve_value(value, "Acme Light"),
        Some(VariableValue::Color(Rgba::parse("#1971C2").unwrap()))
    );
}

#[tokio::test]
async fn test_yaml_graph_is_accepted() {
    let project = TestProject::new();
    save_document(&project.root().join("tokens.yaml"), &two_brand_graph()).unwrap();

    let report = sync_file(&project, "tokens.yaml").await;
    assert_eq!(report.modes_synced, 4);
}

#[tokio::test]
async fn test_payload_file_to_store_file() {
    let project = TestProject::new();
    project.write_payload("payload.json", &scenario_payload());

    let report = sync_file(&project, "payload.json").await;
    assert_eq!(report.brands_synced, vec!["acme"]);
    assert_eq!(
        StoreDocument::read(&project.store_path())
            .unwrap()
            .last_payload_fingerprint,
        Some(scenario_payload().fingerprint())
    );
}

#[tokio::test]
async fn test_editing_the_graph_converges() {
    let project = TestProject::new();
    let mut graph = two_brand_graph();
    project.write_graph("tokens.json", &graph);
    sync_file(&project, "tokens.json").await;
    let before = StoreDocument::read(&project.store_path()).unwrap().state;

    // point acme's accent at the light blue and drop zen entirely
    graph
        .brands
        .get_mut("acme")
        .unwrap()
        .semantic_map
        .insert("accent".into(), PrimitiveRef::new("blue", 0));
    graph.brands.remove("zen");
    project.write_graph("tokens.json", &graph);
    let report = sync_file(&project, "tokens.json").await;

    assert_eq!(report.removed_modes, 4);
    let after = StoreDocument::read(&project.store_path()).unwrap().state;
    assert_eq!(
        after.collection_named("Semantic").unwrap().mode_names(),
        vec!["Acme Light", "Acme Dark"]
    );
    // accent keeps its identity across the edit
    assert_eq!(
        before.variable_named("Semantic", "accent").unwrap().id,
        after.variable_named("Semantic", "accent").unwrap().id
    );
    let value = after.value("Semantic", "accent", "Acme Dark").unwrap();
    assert_eq!(
        after.resolve_value(value, "Acme Dark"),
        Some(VariableValue::Color(Rgba::parse("#E7F5FF").unwrap()))
    );
    assert!(after.dangling_aliases().is_empty());
}

#[tokio::test]
async fn test_project_config_renames_collections() {
    let project = TestProject::new();
    project.write_config(
        r#"
themes = ["light"]
store_path = "state/variables.json"

[collections]
semantic = "Tokens/Semantic"
components = "Tokens/Components"
"#,
    );
    project.write_graph("tokens.json", &two_brand_graph());

    let report = sync_file(&project, "tokens.json").await;
    assert_eq!(report.modes_synced, 2);

    project.assert_file_exists("state/variables.json");
    let document = StoreDocument::read(&project.root().join("state/variables.json")).unwrap();
    assert_eq!(
        document
            .state
            .collection_named("Tokens/Components")
            .unwrap()
            .mode_names(),
        vec!["Acme Light", "Zen Light"]
    );
    assert!(document.state.collection_named("Semantic").is_none());
}
