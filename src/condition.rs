use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use tracing::debug;

use crate::builder::{Builder, ResourceKind};
use crate::error::BuilderError;
use crate::poll::STATUS_INTERVAL;

/// Kinds whose status publishes a `metav1.Condition` array.
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];
}

/// A partially-specified condition to wait for. Empty fields are wildcards;
/// the message matches by containment, everything else by equality.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedCondition {
    pub type_: String,
    pub status: String,
    pub reason: String,
    pub message: String,
}

impl ExpectedCondition {
    pub fn matches(&self, observed: &Condition) -> bool {
        if !self.type_.is_empty() && self.type_ != observed.type_ {
            return false;
        }
        if !self.status.is_empty() && self.status != observed.status {
            return false;
        }
        if !self.reason.is_empty() && self.reason != observed.reason {
            return false;
        }
        if !self.message.is_empty() && !observed.message.contains(&self.message) {
            return false;
        }

        true
    }
}

impl<K: ResourceKind + HasConditions> Builder<K> {
    /// Polls until any observed condition matches the expected skeleton.
    /// The first matching tick ends the wait.
    pub async fn wait_for_condition(
        &self,
        expected: ExpectedCondition,
        deadline: Duration,
    ) -> Result<(), BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name(),
            expected = ?expected,
            deadline = ?deadline,
            "waiting for condition",
        );

        self.wait_with(STATUS_INTERVAL, deadline, |observed| {
            observed.is_some_and(|k| k.conditions().iter().any(|c| expected.matches(c)))
        })
        .await
    }
}
