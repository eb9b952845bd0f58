//! ManagedCluster builder.

use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::condition::{ExpectedCondition, HasConditions};
use crate::error::BuilderError;
use crate::store::ObjectStore;

pub use super::types::{
    ManagedCluster, ManagedClusterSpec, ManagedClusterStatus, ManagedClusterVersion,
};

impl ResourceKind for ManagedCluster {
    const KIND_LABEL: &'static str = "managedcluster";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for ManagedCluster {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<ManagedCluster> {
    pub fn new(store: Arc<dyn ObjectStore>, name: &str) -> Self {
        let definition = ManagedCluster::new(name, ManagedClusterSpec::default());
        Self::draft(store, definition)
    }

    pub async fn pull(store: Arc<dyn ObjectStore>, name: &str) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, None).await
    }

    pub fn with_hub_accepts_client(mut self, accepts: bool) -> Self {
        if self.validate().is_err() {
            return self;
        }

        self.definition_mut().spec.hub_accepts_client = accepts;
        self
    }

    /// Deleting a ManagedCluster detaches it from the hub, so the recreate
    /// fallback is not offered here.
    pub async fn update(&mut self) -> Result<&mut Self, BuilderError> {
        self.update_inner(false).await
    }

    pub async fn wait_until_available(&self, deadline: Duration) -> Result<(), BuilderError> {
        let expected = ExpectedCondition {
            type_: String::from("ManagedClusterConditionAvailable"),
            status: String::from("True"),
            ..ExpectedCondition::default()
        };
        self.wait_for_condition(expected, deadline).await
    }
}
