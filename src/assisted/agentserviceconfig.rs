//! AgentServiceConfig builder. The operator watches a single cluster-scoped
//! instance with a fixed name, so constructors take no name argument.

use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::core::v1::PersistentVolumeClaimSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::condition::{ExpectedCondition, HasConditions};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use super::types::{AgentServiceConfig, AgentServiceConfigSpec, AgentServiceConfigStatus, OsImage};

/// The only name the assisted-service operator reconciles.
pub const AGENT_SERVICE_CONFIG_NAME: &str = "agent";

impl ResourceKind for AgentServiceConfig {
    const KIND_LABEL: &'static str = "agentserviceconfig";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for AgentServiceConfig {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<AgentServiceConfig> {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        database_storage: PersistentVolumeClaimSpec,
        filesystem_storage: PersistentVolumeClaimSpec,
    ) -> Self {
        let spec = AgentServiceConfigSpec {
            database_storage,
            filesystem_storage,
            ..AgentServiceConfigSpec::default()
        };
        let definition = AgentServiceConfig::new(AGENT_SERVICE_CONFIG_NAME, spec);

        Self::draft(store, definition)
    }

    pub async fn pull(store: Arc<dyn ObjectStore>) -> Result<Self, BuilderError> {
        Self::pull_from(store, AGENT_SERVICE_CONFIG_NAME, None).await
    }

    pub fn with_image_storage(mut self, storage: PersistentVolumeClaimSpec) -> Self {
        if self.validate().is_err() {
            return self;
        }

        self.definition_mut().spec.image_storage = Some(storage);
        self
    }

    pub fn with_os_image(mut self, image: OsImage) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if image.openshift_version.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: AgentServiceConfig::KIND_LABEL,
                field: "osImage openshiftVersion",
            });
            return self;
        }
        if image.url.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: AgentServiceConfig::KIND_LABEL,
                field: "osImage url",
            });
            return self;
        }

        self.definition_mut()
            .spec
            .os_images
            .get_or_insert_with(Vec::new)
            .push(image);
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }

    pub async fn wait_until_deployed(&self, deadline: Duration) -> Result<(), BuilderError> {
        let expected = ExpectedCondition {
            type_: String::from("DeploymentsHealthy"),
            status: String::from("True"),
            ..ExpectedCondition::default()
        };
        self.wait_for_condition(expected, deadline).await
    }
}
