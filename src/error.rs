use std::time::Duration;

use thiserror::Error;

use crate::store::StoreError;

/// Deferred argument-validation failure carried by a builder.
///
/// Recorded by constructors and mutators instead of being returned; every
/// validated operation surfaces it until the builder is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} 'name' cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("{kind} 'nsname' cannot be empty")]
    EmptyNamespace { kind: &'static str },

    #[error("{kind} '{field}' cannot be empty")]
    EmptyField {
        kind: &'static str,
        field: &'static str,
    },

    /// Malformed argument (bad IP, bad CIDR, value outside an enumerated
    /// set). The message is already fully formatted.
    #[error("{message}")]
    Invalid {
        kind: &'static str,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} object {name} does not exist in namespace {namespace}")]
    NotFoundInNamespace {
        kind: &'static str,
        name: String,
        namespace: String,
    },

    #[error("{kind} object {name} does not exist")]
    NotFound { kind: &'static str, name: String },

    #[error("cannot update non-existent {kind}")]
    UpdateNonExistent { kind: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("timed out after {timeout:?} waiting for {kind} {name}")]
    WaitTimeout {
        kind: &'static str,
        name: String,
        timeout: Duration,
    },

    #[error("failed to encode {kind} for the store")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {kind} returned by the store")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl BuilderError {
    /// The canonical pull-miss error for the given identity.
    pub(crate) fn pull_miss(
        kind: &'static str,
        name: &str,
        namespace: Option<&str>,
    ) -> Self {
        match namespace {
            Some(namespace) => BuilderError::NotFoundInNamespace {
                kind,
                name: name.to_owned(),
                namespace: namespace.to_owned(),
            },
            None => BuilderError::NotFound {
                kind,
                name: name.to_owned(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BuilderError::NotFoundInNamespace { .. }
                | BuilderError::NotFound { .. }
                | BuilderError::Store(StoreError::NotFound)
        )
    }
}
