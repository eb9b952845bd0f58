//! MultiClusterEngine builder.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::ApiResource;
use kube::discovery::Scope;
use strum::VariantNames;
use strum_macros::{EnumString, VariantNames};

use crate::builder::{Builder, ResourceKind};
use crate::condition::HasConditions;
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use super::types::{MultiClusterEngine, MultiClusterEngineSpec, MultiClusterEngineStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, VariantNames)]
pub enum AvailabilityConfig {
    High,
    Basic,
}

impl ResourceKind for MultiClusterEngine {
    const KIND_LABEL: &'static str = "multiclusterengine";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for MultiClusterEngine {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<MultiClusterEngine> {
    pub fn new(store: Arc<dyn ObjectStore>, name: &str) -> Self {
        let definition = MultiClusterEngine::new(name, MultiClusterEngineSpec::default());
        Self::draft(store, definition)
    }

    pub async fn pull(store: Arc<dyn ObjectStore>, name: &str) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, None).await
    }

    pub fn with_availability_config(mut self, config: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if AvailabilityConfig::from_str(config).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: MultiClusterEngine::KIND_LABEL,
                message: format!(
                    "multiclusterengine 'availabilityConfig' must be one of: {}",
                    AvailabilityConfig::VARIANTS.join(", ")
                ),
            });
            return self;
        }

        self.definition_mut().spec.availability_config = Some(config.to_owned());
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }

    /// Waits until `status.phase` equals the given value.
    pub async fn wait_until_phase(
        &self,
        phase: &str,
        deadline: Duration,
    ) -> Result<(), BuilderError> {
        self.wait_until(deadline, |engine| {
            engine
                .status
                .as_ref()
                .and_then(|status| status.phase.as_deref())
                == Some(phase)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;

    fn store() -> Arc<dyn ObjectStore> {
        Arc::new(FakeStore::new())
    }

    #[test]
    fn should_reject_an_unknown_availability_config() {
        let builder = Builder::<MultiClusterEngine>::new(store(), "engine")
            .with_availability_config("Medium");

        let err = builder.error().expect("validation error");
        assert_eq!(
            err.to_string(),
            "multiclusterengine 'availabilityConfig' must be one of: High, Basic"
        );
    }

    #[test]
    fn should_keep_a_valid_availability_config() {
        let builder =
            Builder::<MultiClusterEngine>::new(store(), "engine").with_availability_config("High");

        assert!(builder.error().is_none());
        assert_eq!(
            builder.definition().spec.availability_config.as_deref(),
            Some("High")
        );
    }
}
