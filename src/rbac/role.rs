//! Namespaced Role builder.

use std::sync::Arc;

use k8s_openapi::api::rbac::v1::{PolicyRule, Role};
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

impl ResourceKind for Role {
    const KIND_LABEL: &'static str = "role";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<Role> {
    /// Drafts a role around a single rule. The rule goes through the same
    /// validation as [`Builder::with_rules`].
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, nsname: &str, rule: PolicyRule) -> Self {
        let mut definition = Role::default();
        definition.metadata.name = Some(name.to_owned());
        definition.metadata.namespace = Some(nsname.to_owned());

        Self::draft(store, definition).with_rules(vec![rule])
    }

    pub async fn pull(
        store: Arc<dyn ObjectStore>,
        name: &str,
        nsname: &str,
    ) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, Some(nsname)).await
    }

    pub fn with_rules(mut self, rules: Vec<PolicyRule>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if let Err(err) = super::validate_rules(Role::KIND_LABEL, &rules) {
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

pub async fn list(
    store: Arc<dyn ObjectStore>,
    nsname: &str,
) -> Result<Vec<Builder<Role>>, BuilderError> {
    if nsname.is_empty() {
        return Err(ValidationError::EmptyNamespace {
            kind: Role::KIND_LABEL,
        }
        .into());
    }

    Builder::list_in(store, Some(nsname), None).await
}

pub async fn list_in_all_namespaces(
    store: Arc<dyn ObjectStore>,
) -> Result<Vec<Builder<Role>>, BuilderError> {
    Builder::list_in(store, None, None).await
}
