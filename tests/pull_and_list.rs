use std::sync::Arc;

use assert_matches::assert_matches;
use k8s_openapi::api::rbac::v1::{ClusterRole, PolicyRule, Role};

use crforge::assisted::agent::{self, Agent};
use crforge::lca::ImageBasedUpgrade;
use crforge::rbac::{clusterrole, role};
use crforge::testing::FakeStore;
use crforge::{Builder, BuilderError, ResourceKind, ValidationError};

use crate::testutils::logger::set_default_test_logger;

mod testutils;

fn pod_reader_rule() -> PolicyRule {
    from_json!({ "apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"] })
}

fn seed_role(store: &FakeStore, name: &str, nsname: &str) {
    store
        .seed(from_json!({
            "apiVersion": "rbac.authorization.k8s.io/v1",
            "kind": "Role",
            "metadata": { "name": name, "namespace": nsname },
            "rules": [{ "apiGroups": [""], "resources": ["pods"], "verbs": ["get"] }],
        }))
        .unwrap();
}

#[tokio::test]
async fn pull_observes_the_stored_object() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    seed_role(&store, "pod-reader", "prod");

    let builder = Builder::<Role>::pull(store.clone(), "pod-reader", "prod")
        .await
        .unwrap();

    assert_eq!(builder.name(), "pod-reader");
    assert_eq!(builder.namespace(), Some("prod"));
    let observed = builder.object().expect("observed object");
    assert_eq!(observed, builder.definition());
    assert_eq!(observed.rules.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn a_pulled_builder_can_update_right_away() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    seed_role(&store, "pod-reader", "prod");

    let mut builder = Builder::<Role>::pull(store.clone(), "pod-reader", "prod")
        .await
        .unwrap();
    builder
        .definition_mut()
        .rules
        .get_or_insert_with(Vec::new)
        .push(pod_reader_rule());
    builder.update(false).await.unwrap();

    let stored = store
        .peek(&Role::gvk(), Some("prod"), "pod-reader")
        .expect("stored role");
    assert_eq!(stored.data["rules"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn pull_misses_name_the_namespace() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());

    let err = Builder::<Role>::pull(store, "ghost", "prod").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "role object ghost does not exist in namespace prod");
}

#[tokio::test]
async fn cluster_scoped_pull_misses_omit_the_namespace() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());

    let err = Builder::<ImageBasedUpgrade>::pull(store).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "imagebasedupgrade object upgrade does not exist");
}

#[tokio::test]
async fn pull_rejects_an_empty_identity_without_store_calls() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());

    let err = Builder::<Role>::pull(store.clone(), "", "prod").await.unwrap_err();
    assert_matches!(
        err,
        BuilderError::Validation(ValidationError::EmptyName { kind: "role" })
    );

    let err = Builder::<Role>::pull(store.clone(), "pod-reader", "").await.unwrap_err();
    assert_matches!(
        err,
        BuilderError::Validation(ValidationError::EmptyNamespace { kind: "role" })
    );

    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn list_is_scoped_to_one_namespace() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    seed_role(&store, "alpha", "prod");
    seed_role(&store, "beta", "prod");
    seed_role(&store, "gamma", "staging");

    let builders = role::list(store.clone(), "prod").await.unwrap();

    let names: Vec<_> = builders.iter().map(Builder::name).collect();
    assert_eq!(names, ["alpha", "beta"]);
    assert!(builders.iter().all(|builder| builder.object().is_some()));

    let everywhere = role::list_in_all_namespaces(store).await.unwrap();
    assert_eq!(everywhere.len(), 3);
}

#[tokio::test]
async fn list_requires_a_namespace() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());

    let err = role::list(store, "").await.unwrap_err();

    assert_matches!(
        err,
        BuilderError::Validation(ValidationError::EmptyNamespace { kind: "role" })
    );
}

#[tokio::test]
async fn kinds_sharing_a_name_stay_separate() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());

    Builder::<Role>::new(store.clone(), "admin", "prod", pod_reader_rule())
        .create()
        .await
        .unwrap();
    Builder::<ClusterRole>::new(store.clone(), "admin", pod_reader_rule())
        .create()
        .await
        .unwrap();

    let roles = role::list(store.clone(), "prod").await.unwrap();
    assert_eq!(roles.len(), 1);

    let clusterroles = clusterrole::list(store).await.unwrap();
    assert_eq!(clusterroles.len(), 1);
}

#[tokio::test]
async fn agents_list_across_namespaces() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    for (name, nsname) in [("host-0", "prod"), ("host-1", "prod"), ("host-2", "staging")] {
        store
            .seed(from_json!({
                "apiVersion": "agent-install.openshift.io/v1beta1",
                "kind": "Agent",
                "metadata": { "name": name, "namespace": nsname },
                "spec": { "approved": false },
            }))
            .unwrap();
    }

    let in_prod = agent::list(store.clone(), "prod").await.unwrap();
    assert_eq!(in_prod.len(), 2);

    let everywhere = agent::list_in_all_namespaces(store).await.unwrap();
    assert_eq!(everywhere.len(), 3);
}

#[tokio::test]
async fn kinds_register_once_no_matter_how_many_builders() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());

    for _ in 0..3 {
        let _ = Builder::<Role>::new(store.clone(), "pod-reader", "prod", pod_reader_rule());
        let _ = Builder::<Agent>::pull(store.clone(), "ghost", "prod").await;
    }

    assert_eq!(
        store.registered_kinds(),
        vec![
            "agent-install.openshift.io/v1beta1/Agent",
            "rbac.authorization.k8s.io/v1/Role",
        ]
    );
}
