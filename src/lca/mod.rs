//! Builder for the Lifecycle Agent ImageBasedUpgrade kind.

mod types;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use kube::api::ApiResource;
use kube::discovery::Scope;
use strum::VariantNames;
use strum_macros::{EnumString, VariantNames};

use crate::builder::{Builder, ResourceKind};
use crate::condition::{ExpectedCondition, HasConditions};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use self::types::{
    ImageBasedUpgrade, ImageBasedUpgradeSpec, ImageBasedUpgradeStatus, SeedImageRef,
};

/// The only instance name the lifecycle agent acts on.
pub const IMAGE_BASED_UPGRADE_NAME: &str = "upgrade";

/// Stages of an image based upgrade, in the order the agent walks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, VariantNames)]
pub enum Stage {
    Idle,
    Prep,
    Upgrade,
    Rollback,
}

impl ResourceKind for ImageBasedUpgrade {
    const KIND_LABEL: &'static str = "imagebasedupgrade";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for ImageBasedUpgrade {
    fn conditions(&self) -> &[k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<ImageBasedUpgrade> {
    /// Drafts the singleton upgrade resource at the Idle stage.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        let spec = ImageBasedUpgradeSpec {
            stage: String::from("Idle"),
            ..ImageBasedUpgradeSpec::default()
        };
        let definition = ImageBasedUpgrade::new(IMAGE_BASED_UPGRADE_NAME, spec);

        Self::draft(store, definition)
    }

    pub async fn pull(store: Arc<dyn ObjectStore>) -> Result<Self, BuilderError> {
        Self::pull_from(store, IMAGE_BASED_UPGRADE_NAME, None).await
    }

    pub fn with_seed_image(mut self, image: &str, version: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if image.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: ImageBasedUpgrade::KIND_LABEL,
                field: "seedImage image",
            });
            return self;
        }
        if version.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: ImageBasedUpgrade::KIND_LABEL,
                field: "seedImage version",
            });
            return self;
        }

        self.definition_mut().spec.seed_image_ref = Some(SeedImageRef {
            image: image.to_owned(),
            version: version.to_owned(),
        });
        self
    }

    /// Moves the upgrade to another stage. Spelled exactly as the agent
    /// expects: Idle, Prep, Upgrade or Rollback.
    pub fn with_stage(mut self, stage: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if Stage::from_str(stage).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: ImageBasedUpgrade::KIND_LABEL,
                message: format!(
                    "imagebasedupgrade 'stage' must be one of: {}",
                    Stage::VARIANTS.join(", ")
                ),
            });
            return self;
        }

        self.definition_mut().spec.stage = stage.to_owned();
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }

    /// Waits until the agent reports the drafted stage as done. Idle
    /// completes through the `Idle` condition, every other stage through
    /// its `<Stage>Completed` one.
    pub async fn wait_until_stage_complete(&self, deadline: Duration) -> Result<(), BuilderError> {
        let stage = self.definition().spec.stage.as_str();
        let type_ = if stage == "Idle" {
            String::from("Idle")
        } else {
            format!("{stage}Completed")
        };

        let expected = ExpectedCondition {
            type_,
            status: String::from("True"),
            ..ExpectedCondition::default()
        };
        self.wait_for_condition(expected, deadline).await
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
    fn should_draft_the_singleton_at_idle() {
        let builder = Builder::<ImageBasedUpgrade>::new(store());

        assert!(builder.error().is_none());
        assert_eq!(builder.name(), IMAGE_BASED_UPGRADE_NAME);
        assert_eq!(builder.definition().spec.stage, "Idle");
    }

    #[test]
    fn should_reject_an_unknown_stage() {
        let builder = Builder::<ImageBasedUpgrade>::new(store()).with_stage("Finalize");

        let err = builder.error().expect("validation error");
        assert_eq!(
            err.to_string(),
            "imagebasedupgrade 'stage' must be one of: Idle, Prep, Upgrade, Rollback"
        );
    }

    #[test]
    fn should_accept_every_stage() {
        for stage in Stage::VARIANTS {
            let builder = Builder::<ImageBasedUpgrade>::new(store()).with_stage(stage);

            assert!(builder.error().is_none(), "stage {stage}");
            assert_eq!(builder.definition().spec.stage, *stage);
        }
    }

    #[test]
    fn should_require_both_seed_image_parts() {
        let builder = Builder::<ImageBasedUpgrade>::new(store())
            .with_seed_image("quay.io/seed/sno:4.17.0", "");

        assert_matches!(
            builder.error(),
            Some(ValidationError::EmptyField {
                kind: "imagebasedupgrade",
                field: "seedImage version"
            })
        );
    }
}
