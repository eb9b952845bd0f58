//! Cluster-scoped ClusterRole builder.

use std::sync::Arc;

use k8s_openapi::api::rbac::v1::{ClusterRole, PolicyRule};
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::error::BuilderError;
use crate::store::ObjectStore;

impl ResourceKind for ClusterRole {
    const KIND_LABEL: &'static str = "clusterrole";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<ClusterRole> {
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, rule: PolicyRule) -> Self {
        let mut definition = ClusterRole::default();
        definition.metadata.name = Some(name.to_owned());

        Self::draft(store, definition).with_rules(vec![rule])
    }

    pub async fn pull(store: Arc<dyn ObjectStore>, name: &str) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, None).await
    }

    pub fn with_rules(mut self, rules: Vec<PolicyRule>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if let Err(err) = super::validate_rules(ClusterRole::KIND_LABEL, &rules) {
            self.record_error(err);
            return self;
        }

        self.definition_mut()
            .rules
            .get_or_insert_with(Vec::new)
            .extend(rules);
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }
}

pub async fn list(store: Arc<dyn ObjectStore>) -> Result<Vec<Builder<ClusterRole>>, BuilderError> {
    Builder::list_in(store, None, None).await
}
