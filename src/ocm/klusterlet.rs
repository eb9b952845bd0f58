//! Klusterlet builder.

use std::str::FromStr;
use std::sync::Arc;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::ApiResource;
use kube::discovery::Scope;
use strum::VariantNames;
use strum_macros::{EnumString, VariantNames};

use crate::builder::{Builder, ResourceKind};
use crate::condition::HasConditions;
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use super::types::{Klusterlet, KlusterletDeployOption, KlusterletSpec, KlusterletStatus};

/// Supported agent deployment modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, VariantNames)]
pub enum DeployMode {
    Default,
    Hosted,
    Singleton,
}

impl ResourceKind for Klusterlet {
    const KIND_LABEL: &'static str = "klusterlet";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for Klusterlet {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<Klusterlet> {
    pub fn new(store: Arc<dyn ObjectStore>, name: &str) -> Self {
        let definition = Klusterlet::new(name, KlusterletSpec::default());
        Self::draft(store, definition)
    }

    pub async fn pull(store: Arc<dyn ObjectStore>, name: &str) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, None).await
    }

    pub fn with_deploy_mode(mut self, mode: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if DeployMode::from_str(mode).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: Klusterlet::KIND_LABEL,
                message: format!(
                    "klusterlet 'deployMode' must be one of: {}",
                    DeployMode::VARIANTS.join(", ")
                ),
            });
            return self;
        }

        self.definition_mut()
            .spec
            .deploy_option
            .get_or_insert_with(KlusterletDeployOption::default)
            .mode = mode.to_owned();
        self
    }

    /// Deleting a Klusterlet tears the agent off the cluster, so the
    /// recreate fallback is not offered here.
    pub async fn update(&mut self) -> Result<&mut Self, BuilderError> {
        self.update_inner(false).await
    }
}
