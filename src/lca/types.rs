use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Lifecycle Agent ImageBasedUpgrade (`lca.openshift.io/v1`).
///
/// Cluster-scoped singleton; the agent only honors the instance named
/// `upgrade`.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default)]
#[kube(
    group = "lca.openshift.io",
    version = "v1",
    kind = "ImageBasedUpgrade",
    plural = "imagebasedupgrades",
    status = "ImageBasedUpgradeStatus",
    schema = "disabled",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct ImageBasedUpgradeSpec {
    #[serde(default)]
    pub stage: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_image_ref: Option<SeedImageRef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeedImageRef {
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub version: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImageBasedUpgradeStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}
