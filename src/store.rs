use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersionKind;
use kube::discovery::Scope;
use thiserror::Error;
use tracing::debug;

use crate::error_codes::is_transient_error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,

    #[error("object already exists")]
    AlreadyExists,

    #[error("resource version conflict")]
    Conflict,

    #[error("kind {0} is not registered with the store")]
    KindNotRegistered(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Api(#[from] kube::Error),
}

impl StoreError {
    /// Whether retrying the same call later could reasonably succeed.
    /// The builders never retry on their own; this is for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Conflict => true,
            StoreError::Api(err) => is_transient_error(err),
            _ => false,
        }
    }
}

/// The object server consumed by every builder.
///
/// Implementations must be safe for concurrent use; builders sharing a store
/// issue calls from independent tasks. Kinds are keyed by group/version/kind
/// and must be registered through [`ObjectStore::attach_scheme`] before the
/// first call that touches them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Registers a kind. First registration wins, repeats are no-ops.
    fn attach_scheme(&self, resource: &ApiResource, scope: Scope) -> Result<(), StoreError>;

    async fn get(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, StoreError>;

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError>;

    /// Inserts the object, failing with [`StoreError::AlreadyExists`] if the
    /// identity is taken. Returns the stored object with the server-assigned
    /// metadata filled in.
    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError>;

    /// Replaces the stored object. A stale `metadata.resourceVersion` in the
    /// payload is a [`StoreError::Conflict`].
    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError>;

    async fn delete(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), StoreError>;
}

pub(crate) fn gvk_key(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() {
        format!("{}/{}", gvk.version, gvk.kind)
    } else {
        format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
    }
}

/// Extracts the group/version/kind from the object's type metadata.
pub(crate) fn object_gvk(object: &DynamicObject) -> Result<GroupVersionKind, StoreError> {
    let Some(types) = object.types.as_ref() else {
        return Err(StoreError::Invalid(String::from(
            "object has no type metadata",
        )));
    };

    let (group, version) = match types.api_version.split_once('/') {
        Some((group, version)) => (group.to_owned(), version.to_owned()),
        None => (String::new(), types.api_version.clone()),
    };

    Ok(GroupVersionKind {
        group,
        version,
        kind: types.kind.clone(),
    })
}

#[derive(Clone, Debug)]
pub(crate) struct Registration {
    pub resource: ApiResource,
    pub scope: Scope,
}

/// Process-wide kind registry shared by a store and every builder using it.
#[derive(Default)]
pub struct SchemeRegistry {
    inner: RwLock<HashMap<String, Registration>>,
}

impl SchemeRegistry {
    pub fn attach(&self, resource: &ApiResource, scope: Scope) {
        let gvk = GroupVersionKind {
            group: resource.group.clone(),
            version: resource.version.clone(),
            kind: resource.kind.clone(),
        };
        let key = gvk_key(&gvk);

        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if inner.contains_key(&key) {
            return;
        }

        debug!(gvk = %key, scope = ?scope, "registering kind");
        inner.insert(
            key,
            Registration {
                resource: resource.clone(),
                scope,
            },
        );
    }

    pub(crate) fn lookup(&self, gvk: &GroupVersionKind) -> Result<Registration, StoreError> {
        let key = gvk_key(gvk);
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner
            .get(&key)
            .cloned()
            .ok_or(StoreError::KindNotRegistered(key))
    }

    /// Registered gvk keys, sorted for deterministic assertions.
    pub fn keys(&self) -> Vec<String> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut keys: Vec<_> = inner.keys().cloned().collect();
        keys.sort();
        keys
    }
}
