//! InfraEnv builder.

use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::core::v1::LocalObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::condition::HasConditions;
use crate::error::{BuilderError, ValidationError};
use crate::poll::{PollError, STATUS_INTERVAL, poll_until};
use crate::store::ObjectStore;

use super::agent::Agent;

pub use super::types::{ClusterReference, InfraEnv, InfraEnvSpec, InfraEnvStatus};

/// Label the assisted service stamps on every agent discovered through an
/// InfraEnv; the value is the InfraEnv name.
pub const AGENT_INFRAENV_LABEL: &str = "infraenvs.agent-install.openshift.io";

impl ResourceKind for InfraEnv {
    const KIND_LABEL: &'static str = "infraenv";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for InfraEnv {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<InfraEnv> {
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, nsname: &str, pull_secret: &str) -> Self {
        let spec = InfraEnvSpec {
            pull_secret_ref: LocalObjectReference {
                name: pull_secret.to_owned(),
            },
            ..InfraEnvSpec::default()
        };
        let mut definition = InfraEnv::new(name, spec);
        definition.metadata.namespace = Some(nsname.to_owned());

        let mut builder = Self::draft(store, definition);

        if pull_secret.is_empty() {
            builder.record_error(ValidationError::EmptyField {
                kind: InfraEnv::KIND_LABEL,
                field: "pullSecretRef",
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

    pub fn with_cluster_ref(mut self, cluster: &str, nsname: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if cluster.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: InfraEnv::KIND_LABEL,
                field: "clusterRef name",
            });
            return self;
        }
        if nsname.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: InfraEnv::KIND_LABEL,
                field: "clusterRef namespace",
            });
            return self;
        }

        self.definition_mut().spec.cluster_ref = Some(ClusterReference {
            name: cluster.to_owned(),
            namespace: nsname.to_owned(),
        });
        self
    }

    pub fn with_ssh_authorized_key(mut self, key: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if key.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: InfraEnv::KIND_LABEL,
                field: "sshAuthorizedKey",
            });
            return self;
        }

        self.definition_mut().spec.ssh_authorized_key = Some(key.to_owned());
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }

    /// Waits until the assisted service reports the discovery ISO built,
    /// which it signals by stamping `status.createdTime`.
    pub async fn wait_until_iso_created(&self, deadline: Duration) -> Result<(), BuilderError> {
        self.wait_until(deadline, |env| {
            env.status
                .as_ref()
                .is_some_and(|status| status.created_time.is_some())
        })
        .await
    }

    /// Waits until exactly `count` agents labeled for this InfraEnv exist in
    /// its namespace.
    pub async fn wait_until_agent_count(
        &self,
        count: usize,
        deadline: Duration,
    ) -> Result<(), BuilderError> {
        self.validate()?;

        let store = self.store().clone();
        let namespace = self.namespace().map(str::to_owned);
        let selector = format!("{AGENT_INFRAENV_LABEL}={}", self.name());

        let poll = poll_until(STATUS_INTERVAL, deadline, || {
            let store = store.clone();
            let namespace = namespace.clone();
            let selector = selector.clone();
            async move {
                let agents =
                    Builder::<Agent>::list_in(store, namespace.as_deref(), Some(&selector)).await?;
                Ok::<bool, BuilderError>(agents.len() == count)
            }
        })
        .await;

        match poll {
            Ok(()) => Ok(()),
            Err(PollError::DeadlineExceeded) => Err(self.wait_timeout(deadline)),
            Err(PollError::Predicate(err)) => Err(err),
        }
    }
}
