use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// OVN-Kubernetes EgressService (`k8s.ovn.org/v1`).
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default)]
#[kube(
    group = "k8s.ovn.org",
    version = "v1",
    kind = "EgressService",
    plural = "egressservices",
    namespaced,
    status = "EgressServiceStatus",
    schema = "disabled",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct EgressServiceSpec {
    #[serde(default, rename = "sourceIPBy")]
    pub source_ip_by: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<LabelSelector>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct EgressServiceStatus {
    /// Node currently carrying the service's egress traffic.
    #[serde(default)]
    pub host: String,
}
