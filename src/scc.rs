//! SecurityContextConstraints builder (`security.openshift.io/v1`).
//!
//! The kind predates CRD conventions and keeps every field at the top level
//! with no spec wrapper, so the type and its [`kube::Resource`] impl are
//! written by hand instead of derived.

use std::borrow::Cow;
use std::sync::Arc;

use k8s_openapi::ClusterResourceScope;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::ApiResource;
use kube::discovery::Scope;
use serde::{Deserialize, Serialize};

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContextConstraints {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    #[serde(default)]
    pub allow_privileged_container: bool,

    #[serde(default)]
    pub allow_host_network: bool,

    #[serde(default)]
    pub allow_host_ports: bool,

    #[serde(default)]
    pub run_as_user: RunAsUserOptions,

    #[serde(default)]
    pub se_linux_context: SeLinuxContextOptions,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunAsUserOptions {
    #[serde(rename = "type", default)]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SeLinuxContextOptions {
    #[serde(rename = "type", default)]
    pub type_: String,
}

impl kube::Resource for SecurityContextConstraints {
    type DynamicType = ();
    type Scope = ClusterResourceScope;

    fn kind(_dt: &()) -> Cow<'_, str> {
        Cow::Borrowed("SecurityContextConstraints")
    }

    fn group(_dt: &()) -> Cow<'_, str> {
        Cow::Borrowed("security.openshift.io")
    }

    fn version(_dt: &()) -> Cow<'_, str> {
        Cow::Borrowed("v1")
    }

    fn plural(_dt: &()) -> Cow<'_, str> {
        Cow::Borrowed("securitycontextconstraints")
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl ResourceKind for SecurityContextConstraints {
    const KIND_LABEL: &'static str = "securitycontextconstraints";
    const SCOPE: Scope = Scope::Cluster;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<SecurityContextConstraints> {
    /// Both strategy types are required by the api server, so they are
    /// constructor arguments rather than mutators.
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, run_as_user: &str, selinux: &str) -> Self {
        let definition = SecurityContextConstraints {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                ..ObjectMeta::default()
            },
            run_as_user: RunAsUserOptions {
                type_: run_as_user.to_owned(),
                uid: None,
            },
            se_linux_context: SeLinuxContextOptions {
                type_: selinux.to_owned(),
            },
            ..SecurityContextConstraints::default()
        };

        let mut builder = Self::draft(store, definition);

        if run_as_user.is_empty() {
            builder.record_error(ValidationError::EmptyField {
                kind: SecurityContextConstraints::KIND_LABEL,
                field: "runAsUser",
            });
        }

        if selinux.is_empty() {
            builder.record_error(ValidationError::EmptyField {
                kind: SecurityContextConstraints::KIND_LABEL,
                field: "seLinuxContext",
            });
        }

        builder
    }

    pub async fn pull(store: Arc<dyn ObjectStore>, name: &str) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, None).await
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        if self.validate().is_err() {
            return self;
        }

        self.definition_mut().priority = Some(priority);
        self
    }

    pub fn with_users(mut self, users: Vec<String>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if users.is_empty() || users.iter().any(String::is_empty) {
            self.record_error(ValidationError::EmptyField {
                kind: SecurityContextConstraints::KIND_LABEL,
                field: "users",
            });
            return self;
        }

        self.definition_mut().users.extend(users);
        self
    }

    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if groups.is_empty() || groups.iter().any(String::is_empty) {
            self.record_error(ValidationError::EmptyField {
                kind: SecurityContextConstraints::KIND_LABEL,
                field: "groups",
            });
            return self;
        }

        self.definition_mut().groups.extend(groups);
        self
    }

    pub fn with_volumes(mut self, volumes: Vec<String>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if volumes.is_empty() || volumes.iter().any(String::is_empty) {
            self.record_error(ValidationError::EmptyField {
                kind: SecurityContextConstraints::KIND_LABEL,
                field: "volumes",
            });
            return self;
        }

        self.definition_mut().volumes.extend(volumes);
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }
}

pub async fn list(
    store: Arc<dyn ObjectStore>,
) -> Result<Vec<Builder<SecurityContextConstraints>>, BuilderError> {
    Builder::list_in(store, None, None).await
}
