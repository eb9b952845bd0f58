//! Builder for the OVN-Kubernetes EgressService kind.

mod types;

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ApiResource;
use kube::discovery::Scope;
use strum::VariantNames;
use strum_macros::{EnumString, VariantNames};

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use self::types::{EgressService, EgressServiceSpec, EgressServiceStatus};

/// How the egress source IP is assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, VariantNames)]
pub enum SourceIpBy {
    #[strum(serialize = "LoadBalancerIP")]
    LoadBalancerIp,
    Network,
}

impl ResourceKind for EgressService {
    const KIND_LABEL: &'static str = "egressservice";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<EgressService> {
    /// Drafts an egress service. `source_ip_by` is checked up front; a bad
    /// spelling leaves the builder unusable until inspected.
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, nsname: &str, source_ip_by: &str) -> Self {
        let spec = EgressServiceSpec {
            source_ip_by: source_ip_by.to_owned(),
            ..EgressServiceSpec::default()
        };
        let mut definition = EgressService::new(name, spec);
        definition.metadata.namespace = Some(nsname.to_owned());

        let mut builder = Self::draft(store, definition);

        if SourceIpBy::from_str(source_ip_by).is_err() {
            builder.record_error(ValidationError::Invalid {
                kind: EgressService::KIND_LABEL,
                message: format!(
                    "egressservice 'sourceIPBy' must be one of: {}",
                    SourceIpBy::VARIANTS.join(", ")
                ),
            });
        }

        builder
    }

    pub async fn pull(
        store: Arc<dyn ObjectStore>,
        name: &str,
        nsname: &str,
    ) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, Some(nsname)).await
    }

    /// Routes egress through the named secondary network.
    pub fn with_network(mut self, network: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if network.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: EgressService::KIND_LABEL,
                field: "network",
            });
            return self;
        }

        self.definition_mut().spec.network = Some(network.to_owned());
        self
    }

    /// Restricts the nodes eligible to carry the egress traffic.
    pub fn with_node_selector(mut self, match_labels: BTreeMap<String, String>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if match_labels.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: EgressService::KIND_LABEL,
                field: "nodeSelector",
            });
            return self;
        }

        self.definition_mut().spec.node_selector = Some(LabelSelector {
            match_labels: Some(match_labels),
            ..LabelSelector::default()
        });
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }
}
