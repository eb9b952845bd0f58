//! Namespaced RoleBinding builder.

use std::str::FromStr;
use std::sync::Arc;

use k8s_openapi::api::rbac::v1::{RoleBinding, RoleRef, Subject};
use kube::api::ApiResource;
use kube::discovery::Scope;
use strum::VariantNames;
use strum_macros::{EnumString, VariantNames};

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

const RBAC_GROUP: &str = "rbac.authorization.k8s.io";

/// Kinds a binding may reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, VariantNames)]
pub enum RoleRefKind {
    Role,
    ClusterRole,
}

impl ResourceKind for RoleBinding {
    const KIND_LABEL: &'static str = "rolebinding";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<RoleBinding> {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        name: &str,
        nsname: &str,
        role_kind: &str,
        role_name: &str,
    ) -> Self {
        let mut definition = RoleBinding::default();
        definition.metadata.name = Some(name.to_owned());
        definition.metadata.namespace = Some(nsname.to_owned());
        definition.role_ref = RoleRef {
            api_group: RBAC_GROUP.to_owned(),
            kind: role_kind.to_owned(),
            name: role_name.to_owned(),
        };

        let mut builder = Self::draft(store, definition);

        if RoleRefKind::from_str(role_kind).is_err() {
            builder.record_error(ValidationError::Invalid {
                kind: RoleBinding::KIND_LABEL,
                message: format!(
                    "rolebinding 'roleRef kind' must be one of: {}",
                    RoleRefKind::VARIANTS.join(", ")
                ),
            });
        }

        if role_name.is_empty() {
            builder.record_error(ValidationError::EmptyField {
                kind: RoleBinding::KIND_LABEL,
                field: "roleRef name",
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

    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if let Err(err) = super::validate_subjects(RoleBinding::KIND_LABEL, &subjects) {
            self.record_error(err);
            return self;
        }

        self.definition_mut()
            .subjects
            .get_or_insert_with(Vec::new)
            .extend(subjects);
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }
}

pub async fn list(
    store: Arc<dyn ObjectStore>,
    nsname: &str,
) -> Result<Vec<Builder<RoleBinding>>, BuilderError> {
    if nsname.is_empty() {
        return Err(ValidationError::EmptyNamespace {
            kind: RoleBinding::KIND_LABEL,
        }
        .into());
    }

    Builder::list_in(store, Some(nsname), None).await
}
