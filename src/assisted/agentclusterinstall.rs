//! AgentClusterInstall builder.

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ipnet::IpNet;
use k8s_openapi::api::core::v1::LocalObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::condition::HasConditions;
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use super::types::{
    AgentClusterInstall, AgentClusterInstallSpec, AgentClusterInstallStatus, ClusterNetworkEntry,
    DebugInfo, MachineNetworkEntry, Networking, ProvisionRequirements,
};

impl ResourceKind for AgentClusterInstall {
    const KIND_LABEL: &'static str = "agentclusterinstall";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for AgentClusterInstall {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<AgentClusterInstall> {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        name: &str,
        nsname: &str,
        cluster_deployment: &str,
    ) -> Self {
        let spec = AgentClusterInstallSpec {
            cluster_deployment_ref: LocalObjectReference {
                name: cluster_deployment.to_owned(),
            },
            ..AgentClusterInstallSpec::default()
        };
        let mut definition = AgentClusterInstall::new(name, spec);
        definition.metadata.namespace = Some(nsname.to_owned());

        let mut builder = Self::draft(store, definition);

        if cluster_deployment.is_empty() {
            builder.record_error(ValidationError::EmptyField {
                kind: AgentClusterInstall::KIND_LABEL,
                field: "clusterDeploymentRef",
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

    pub fn with_api_vip(mut self, vip: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if IpAddr::from_str(vip).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: AgentClusterInstall::KIND_LABEL,
                message: String::from("agentclusterinstall 'apiVIP' is not a valid IP"),
            });
            return self;
        }

        self.definition_mut().spec.api_vip = Some(vip.to_owned());
        self
    }

    pub fn with_ingress_vip(mut self, vip: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if IpAddr::from_str(vip).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: AgentClusterInstall::KIND_LABEL,
                message: String::from("agentclusterinstall 'ingressVIP' is not a valid IP"),
            });
            return self;
        }

        self.definition_mut().spec.ingress_vip = Some(vip.to_owned());
        self
    }

    pub fn with_image_set_ref(mut self, image_set: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if image_set.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: AgentClusterInstall::KIND_LABEL,
                field: "imageSetRef",
            });
            return self;
        }

        self.definition_mut().spec.image_set_ref = Some(LocalObjectReference {
            name: image_set.to_owned(),
        });
        self
    }

    pub fn with_cluster_network(mut self, cidr: &str, host_prefix: i32) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if IpNet::from_str(cidr).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: AgentClusterInstall::KIND_LABEL,
                message: String::from("agentclusterinstall 'clusterNetwork' is not a valid CIDR"),
            });
            return self;
        }

        self.definition_mut()
            .spec
            .networking
            .cluster_network
            .push(ClusterNetworkEntry {
                cidr: cidr.to_owned(),
                host_prefix: Some(host_prefix),
            });
        self
    }

    pub fn with_service_network(mut self, cidr: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if IpNet::from_str(cidr).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: AgentClusterInstall::KIND_LABEL,
                message: String::from("agentclusterinstall 'serviceNetwork' is not a valid CIDR"),
            });
            return self;
        }

        self.definition_mut()
            .spec
            .networking
            .service_network
            .push(cidr.to_owned());
        self
    }

    pub fn with_machine_network(mut self, cidr: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if IpNet::from_str(cidr).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: AgentClusterInstall::KIND_LABEL,
                message: String::from("agentclusterinstall 'machineNetwork' is not a valid CIDR"),
            });
            return self;
        }

        self.definition_mut()
            .spec
            .networking
            .machine_network
            .push(MachineNetworkEntry {
                cidr: cidr.to_owned(),
            });
        self
    }

    pub fn with_provision_requirements(mut self, control_plane: i32, workers: i32) -> Self {
        if self.validate().is_err() {
            return self;
        }

        self.definition_mut().spec.provision_requirements = Some(ProvisionRequirements {
            control_plane_agents: control_plane,
            worker_agents: Some(workers),
        });
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }

    /// Waits until `status.debugInfo.state` equals the given value.
    pub async fn wait_until_state(
        &self,
        state: &str,
        deadline: Duration,
    ) -> Result<(), BuilderError> {
        self.wait_until(deadline, |install| {
            install
                .status
                .as_ref()
                .and_then(|status| status.debug_info.as_ref())
                .and_then(|info| info.state.as_deref())
                == Some(state)
        })
        .await
    }
}
