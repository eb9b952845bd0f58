use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use k8s_openapi::api::core::v1::PersistentVolumeClaimSpec;
use k8s_openapi::api::rbac::v1::{PolicyRule, Role};
use tokio::time::sleep;

use crforge::argocd::Application;
use crforge::assisted::agent::Agent;
use crforge::assisted::agentclusterinstall::AgentClusterInstall;
use crforge::assisted::agentserviceconfig::AgentServiceConfig;
use crforge::assisted::infraenv::InfraEnv;
use crforge::lca::ImageBasedUpgrade;
use crforge::ocm::managedcluster::ManagedCluster;
use crforge::ocm::multiclusterengine::MultiClusterEngine;
use crforge::testing::FakeStore;
use crforge::{Builder, BuilderError, ObjectStore, ResourceKind};

use crate::testutils::logger::set_default_test_logger;

mod testutils;

fn pod_reader_rule() -> PolicyRule {
    from_json!({ "apiGroups": [""], "resources": ["pods"], "verbs": ["get", "list"] })
}

fn pvc(size: &str) -> PersistentVolumeClaimSpec {
    from_json!({ "resources": { "requests": { "storage": size } } })
}

#[tokio::test(start_paused = true)]
async fn deletion_wait_ends_when_the_object_goes_away() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut role = Builder::<Role>::new(store.clone(), "pod-reader", "prod", pod_reader_rule());
    role.create().await.unwrap();

    let deleter = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            store
                .delete(&Role::gvk(), Some("prod"), "pod-reader")
                .await
                .unwrap();
        })
    };

    role.wait_until_deleted(Duration::from_secs(30)).await.unwrap();
    deleter.await.unwrap();
    assert!(store.peek(&Role::gvk(), Some("prod"), "pod-reader").is_none());
}

#[tokio::test(start_paused = true)]
async fn deletion_wait_times_out_while_the_object_stays() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut role = Builder::<Role>::new(store.clone(), "pod-reader", "prod", pod_reader_rule());
    role.create().await.unwrap();

    let err = role
        .wait_until_deleted(Duration::from_secs(10))
        .await
        .unwrap_err();

    assert_matches!(err, BuilderError::WaitTimeout { .. });
    assert_eq!(err.to_string(), "timed out after 10s waiting for role pod-reader");
}

#[tokio::test(start_paused = true)]
async fn delete_and_wait_returns_once_the_object_is_gone() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut role = Builder::<Role>::new(store.clone(), "pod-reader", "prod", pod_reader_rule());
    role.create().await.unwrap();

    role.delete_and_wait(Duration::from_secs(30)).await.unwrap();
    assert!(store.peek(&Role::gvk(), Some("prod"), "pod-reader").is_none());
}

#[tokio::test(start_paused = true)]
async fn condition_wait_sees_a_status_published_later() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut cluster = Builder::<ManagedCluster>::new(store.clone(), "spoke-1");
    cluster.create().await.unwrap();

    let hub = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(7)).await;
            store
                .seed(from_json!({
                    "apiVersion": "cluster.open-cluster-management.io/v1",
                    "kind": "ManagedCluster",
                    "metadata": { "name": "spoke-1" },
                    "spec": { "hubAcceptsClient": true },
                    "status": {
                        "conditions": [{
                            "type": "ManagedClusterConditionAvailable",
                            "status": "True",
                            "reason": "ManagedClusterAvailable",
                            "message": "Managed cluster is available",
                            "lastTransitionTime": "2026-08-25T12:00:00Z",
                        }],
                    },
                }))
                .unwrap();
        })
    };

    cluster
        .wait_until_available(Duration::from_secs(30))
        .await
        .unwrap();
    hub.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn scalar_wait_tolerates_initial_absence() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let application = Builder::<Application>::new(store.clone(), "app", "argocd");

    let argo = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            store
                .seed(from_json!({
                    "apiVersion": "argoproj.io/v1alpha1",
                    "kind": "Application",
                    "metadata": { "name": "app", "namespace": "argocd" },
                    "spec": { "project": "default" },
                    "status": { "sync": { "status": "Synced" } },
                }))
                .unwrap();
        })
    };

    application
        .wait_until_sync_status("Synced", Duration::from_secs(30))
        .await
        .unwrap();
    argo.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn population_wait_counts_labeled_agents() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let infraenv = Builder::<InfraEnv>::new(store.clone(), "infra", "prod", "pull-secret");

    let discovery = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            for name in ["host-0", "host-1"] {
                store
                    .seed(from_json!({
                        "apiVersion": "agent-install.openshift.io/v1beta1",
                        "kind": "Agent",
                        "metadata": {
                            "name": name,
                            "namespace": "prod",
                            "labels": { "infraenvs.agent-install.openshift.io": "infra" },
                        },
                        "spec": { "approved": true },
                    }))
                    .unwrap();
            }
        })
    };

    infraenv
        .wait_until_agent_count(2, Duration::from_secs(30))
        .await
        .unwrap();
    discovery.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn population_wait_times_out_when_agents_never_appear() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let infraenv = Builder::<InfraEnv>::new(store.clone(), "infra", "prod", "pull-secret");

    let err = infraenv
        .wait_until_agent_count(2, Duration::from_secs(10))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "timed out after 10s waiting for infraenv infra");
}

#[tokio::test(start_paused = true)]
async fn phase_wait_sees_the_engine_become_available() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut engine = Builder::<MultiClusterEngine>::new(store.clone(), "engine")
        .with_availability_config("High");
    engine.create().await.unwrap();

    let operator = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            store
                .seed(from_json!({
                    "apiVersion": "multicluster.openshift.io/v1",
                    "kind": "MultiClusterEngine",
                    "metadata": { "name": "engine" },
                    "spec": { "availabilityConfig": "High" },
                    "status": { "phase": "Available" },
                }))
                .unwrap();
        })
    };

    engine
        .wait_until_phase("Available", Duration::from_secs(30))
        .await
        .unwrap();
    operator.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn install_state_wait_reads_the_nested_debug_info() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut install = Builder::<AgentClusterInstall>::new(store.clone(), "aci", "prod", "cluster");
    install.create().await.unwrap();

    let installer = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            store
                .seed(from_json!({
                    "apiVersion": "extensions.hive.openshift.io/v1beta1",
                    "kind": "AgentClusterInstall",
                    "metadata": { "name": "aci", "namespace": "prod" },
                    "spec": { "clusterDeploymentRef": { "name": "cluster" } },
                    "status": {
                        "debugInfo": {
                            "state": "adding-hosts",
                            "stateInfo": "Cluster is ready for hosts",
                        },
                    },
                }))
                .unwrap();
        })
    };

    install
        .wait_until_state("adding-hosts", Duration::from_secs(30))
        .await
        .unwrap();
    installer.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn iso_wait_ends_once_the_created_time_is_stamped() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut infraenv = Builder::<InfraEnv>::new(store.clone(), "infra", "prod", "pull-secret");
    infraenv.create().await.unwrap();

    let imager = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            store
                .seed(from_json!({
                    "apiVersion": "agent-install.openshift.io/v1beta1",
                    "kind": "InfraEnv",
                    "metadata": { "name": "infra", "namespace": "prod" },
                    "spec": { "pullSecretRef": { "name": "pull-secret" } },
                    "status": {
                        "createdTime": "2026-08-25T12:00:00Z",
                        "isoDownloadURL": "https://assisted.example.com/images/infra.iso",
                    },
                }))
                .unwrap();
        })
    };

    infraenv
        .wait_until_iso_created(Duration::from_secs(30))
        .await
        .unwrap();
    imager.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn agent_state_wait_sees_the_host_become_known() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    store
        .seed(from_json!({
            "apiVersion": "agent-install.openshift.io/v1beta1",
            "kind": "Agent",
            "metadata": { "name": "host-0", "namespace": "prod" },
            "spec": { "approved": false },
        }))
        .unwrap();
    let agent = Builder::<Agent>::pull(store.clone(), "host-0", "prod")
        .await
        .unwrap();

    let discovery = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            store
                .seed(from_json!({
                    "apiVersion": "agent-install.openshift.io/v1beta1",
                    "kind": "Agent",
                    "metadata": { "name": "host-0", "namespace": "prod" },
                    "spec": { "approved": false },
                    "status": { "debugInfo": { "state": "known" } },
                }))
                .unwrap();
        })
    };

    agent
        .wait_until_state("known", Duration::from_secs(30))
        .await
        .unwrap();
    discovery.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn deployment_wait_matches_the_healthy_condition() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut config = Builder::<AgentServiceConfig>::new(store.clone(), pvc("10Gi"), pvc("20Gi"));
    config.create().await.unwrap();

    let operator = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(7)).await;
            store
                .seed(from_json!({
                    "apiVersion": "agent-install.openshift.io/v1beta1",
                    "kind": "AgentServiceConfig",
                    "metadata": { "name": "agent" },
                    "spec": {
                        "databaseStorage": { "resources": { "requests": { "storage": "10Gi" } } },
                        "filesystemStorage": { "resources": { "requests": { "storage": "20Gi" } } },
                    },
                    "status": {
                        "conditions": [{
                            "type": "DeploymentsHealthy",
                            "status": "True",
                            "reason": "DeploymentSucceeded",
                            "message": "assisted-service deployment is healthy",
                            "lastTransitionTime": "2026-08-25T12:00:00Z",
                        }],
                    },
                }))
                .unwrap();
        })
    };

    config
        .wait_until_deployed(Duration::from_secs(30))
        .await
        .unwrap();
    operator.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stage_wait_expects_the_completed_condition_for_the_stage() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let mut upgrade = Builder::<ImageBasedUpgrade>::new(store.clone())
        .with_seed_image("quay.io/seed/sno:4.17.0", "4.17.0")
        .with_stage("Prep");
    upgrade.create().await.unwrap();

    let lifecycle_agent = {
        let store = store.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            store
                .seed(from_json!({
                    "apiVersion": "lca.openshift.io/v1",
                    "kind": "ImageBasedUpgrade",
                    "metadata": { "name": "upgrade" },
                    "spec": {
                        "stage": "Prep",
                        "seedImageRef": { "image": "quay.io/seed/sno:4.17.0", "version": "4.17.0" },
                    },
                    "status": {
                        "conditions": [{
                            "type": "PrepCompleted",
                            "status": "True",
                            "reason": "Completed",
                            "message": "Prep stage completed successfully",
                            "lastTransitionTime": "2026-08-25T12:00:00Z",
                        }],
                    },
                }))
                .unwrap();
        })
    };

    upgrade
        .wait_until_stage_complete(Duration::from_secs(30))
        .await
        .unwrap();
    lifecycle_agent.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn waits_refuse_an_invalid_builder() {
    let _logger = set_default_test_logger();
    let store = Arc::new(FakeStore::new());
    let role = Builder::<Role>::new(store.clone(), "", "prod", pod_reader_rule());

    let result = role.wait_until_deleted(Duration::from_secs(10)).await;

    assert_matches!(result, Err(BuilderError::Validation(_)));
    assert!(store.calls().is_empty());
}
