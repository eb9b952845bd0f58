//! Cluster-scoped ClusterRoleBinding builder.

use std::sync::Arc;

use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

impl ResourceKind for ClusterRoleBinding {
    const KIND_LABEL: &'static str = "clusterrolebinding";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<ClusterRoleBinding> {
    /// The referenced kind is always ClusterRole; only the name varies.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        name: &str,
        clusterrole: &str,
        subject: Subject,
    ) -> Self {
        let mut definition = ClusterRoleBinding::default();
        definition.metadata.name = Some(name.to_owned());
        definition.role_ref = RoleRef {
            api_group: String::from("rbac.authorization.k8s.io"),
            kind: String::from("ClusterRole"),
            name: clusterrole.to_owned(),
        };

        let mut builder = Self::draft(store, definition);

        if clusterrole.is_empty() {
            builder.record_error(ValidationError::EmptyField {
                kind: ClusterRoleBinding::KIND_LABEL,
                field: "clusterrole",
            });
        }

        builder.with_subjects(vec![subject])
    }

    pub async fn pull(store: Arc<dyn ObjectStore>, name: &str) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, None).await
    }

    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if let Err(err) = super::validate_subjects(ClusterRoleBinding::KIND_LABEL, &subjects) {
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
) -> Result<Vec<Builder<ClusterRoleBinding>>, BuilderError> {
    Builder::list_in(store, None, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;

    macro_rules! from_json {
        ($($json:tt)+) => {
            ::serde_json::from_value(::serde_json::json!($($json)+)).expect("Invalid json")
        };
    }

    fn store() -> Arc<dyn ObjectStore> {
        Arc::new(FakeStore::new())
    }

    fn admin_sa() -> Subject {
        from_json!({ "kind": "ServiceAccount", "name": "admin", "namespace": "kube-system" })
    }

    #[test]
    fn should_fix_the_role_ref_kind() {
        let builder = Builder::<ClusterRoleBinding>::new(store(), "crb", "cluster-admin", admin_sa());

        assert!(builder.error().is_none());
        assert_eq!(builder.definition().role_ref.kind, "ClusterRole");
        assert_eq!(builder.definition().role_ref.name, "cluster-admin");
    }

    #[test]
    fn should_record_empty_clusterrole_name() {
        let builder = Builder::<ClusterRoleBinding>::new(store(), "crb", "", admin_sa());

        assert_matches!(
            builder.error(),
            Some(ValidationError::EmptyField { kind: "clusterrolebinding", field: "clusterrole" })
        );
    }
}
