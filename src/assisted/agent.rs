//! Agent builder. Agents are created by the assisted service when hosts
//! boot the discovery ISO, so there is no drafting constructor; callers pull
//! an existing agent, adjust approval or role, and push the change back.

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

pub use super::types::{Agent, AgentSpec, AgentStatus};

/// Roles a host may be assigned before installation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum AgentRole {
    #[strum(serialize = "auto-assign")]
    AutoAssign,
    Master,
    Worker,
}

impl ResourceKind for Agent {
    const KIND_LABEL: &'static str = "agent";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl HasConditions for Agent {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|status| status.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl Builder<Agent> {
    pub async fn pull(
        store: Arc<dyn ObjectStore>,
        name: &str,
        nsname: &str,
    ) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, Some(nsname)).await
    }

    pub fn with_approval(mut self, approved: bool) -> Self {
        if self.validate().is_err() {
            return self;
        }

        self.definition_mut().spec.approved = approved;
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if AgentRole::from_str(role).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: Agent::KIND_LABEL,
                message: format!(
                    "agent 'role' must be one of: {}",
                    AgentRole::VARIANTS.join(", ")
                ),
            });
            return self;
        }

        self.definition_mut().spec.role = Some(role.to_owned());
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }

    /// Waits until `status.debugInfo.state` equals the given value.
    pub async fn wait_until_state(
        &self,
        state: &str,
        deadline: Duration,
    ) -> Result<(), BuilderError> {
        self.wait_until(deadline, |agent| {
            agent
                .status
                .as_ref()
                .and_then(|status| status.debug_info.as_ref())
                .and_then(|info| info.state.as_deref())
                == Some(state)
        })
        .await
    }
}

pub async fn list(
    store: Arc<dyn ObjectStore>,
    nsname: &str,
) -> Result<Vec<Builder<Agent>>, BuilderError> {
    if nsname.is_empty() {
        return Err(ValidationError::EmptyNamespace {
            kind: Agent::KIND_LABEL,
        }
        .into());
    }

    Builder::list_in(store, Some(nsname), None).await
}

pub async fn list_in_all_namespaces(
    store: Arc<dyn ObjectStore>,
) -> Result<Vec<Builder<Agent>>, BuilderError> {
    Builder::list_in(store, None, None).await
}
