use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersionKind;
use kube::discovery::Scope;
use kube::Resource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{BuilderError, ValidationError};
use crate::poll::{DEFAULT_INTERVAL, PollError, STATUS_INTERVAL, poll_until};
use crate::store::{ObjectStore, StoreError};

/// One managed kind. Implementations supply the identity constants and the
/// typed api descriptor; everything else is inherited from [`Builder`].
pub trait ResourceKind:
    Resource<DynamicType = ()>
    + Clone
    + Debug
    + Default
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + Sized
    + 'static
{
    /// Lowercase token substituted into error messages, e.g. `clusterrole`.
    const KIND_LABEL: &'static str;

    const SCOPE: Scope;

    fn api_resource() -> ApiResource;

    fn gvk() -> GroupVersionKind {
        let resource = Self::api_resource();
        GroupVersionKind {
            group: resource.group,
            version: resource.version,
            kind: resource.kind,
        }
    }
}

/// Fluent client for a single resource.
///
/// Holds the desired state (`definition`), the last observed state
/// (`object`), and a deferred validation error. Mutators record failures
/// instead of returning them; the recorded error surfaces from the next
/// validated operation and is never cleared.
pub struct Builder<K: ResourceKind> {
    store: Arc<dyn ObjectStore>,
    name: String,
    namespace: Option<String>,
    definition: K,
    object: Option<K>,
    error: Option<ValidationError>,
}

impl<K: ResourceKind> Builder<K> {
    /// Wraps an already-populated definition without validating it.
    pub(crate) fn from_definition(store: Arc<dyn ObjectStore>, definition: K) -> Self {
        let name = definition.meta().name.clone().unwrap_or_default();
        let namespace = definition.meta().namespace.clone();
        Self {
            store,
            name,
            namespace,
            definition,
            object: None,
            error: None,
        }
    }

    /// Common constructor tail: registers the kind and validates identity.
    pub(crate) fn draft(store: Arc<dyn ObjectStore>, definition: K) -> Self {
        let mut builder = Self::from_definition(store, definition);

        if let Err(err) = builder
            .store
            .attach_scheme(&K::api_resource(), K::SCOPE)
        {
            builder.record_error(ValidationError::Invalid {
                kind: K::KIND_LABEL,
                message: format!("failed to register {} scheme: {err}", K::KIND_LABEL),
            });
        }

        if builder.name.is_empty() {
            builder.record_error(ValidationError::EmptyName { kind: K::KIND_LABEL });
        }

        if matches!(K::SCOPE, Scope::Namespaced)
            && builder.namespace.as_deref().unwrap_or_default().is_empty()
        {
            builder.record_error(ValidationError::EmptyNamespace { kind: K::KIND_LABEL });
        }

        builder
    }

    /// Builds from the store's current state. The observed object replaces
    /// the definition wholesale.
    pub(crate) async fn pull_from(
        store: Arc<dyn ObjectStore>,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Self, BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name,
            namespace = ?namespace,
            "pulling existing object",
        );

        store.attach_scheme(&K::api_resource(), K::SCOPE)?;

        if name.is_empty() {
            return Err(ValidationError::EmptyName { kind: K::KIND_LABEL }.into());
        }
        if matches!(K::SCOPE, Scope::Namespaced) && namespace.unwrap_or_default().is_empty() {
            return Err(ValidationError::EmptyNamespace { kind: K::KIND_LABEL }.into());
        }

        let mut definition = K::default();
        definition.meta_mut().name = Some(name.to_owned());
        definition.meta_mut().namespace = namespace.map(str::to_owned);

        let mut builder = Self::from_definition(store, definition);
        match builder.fetch().await {
            Ok(observed) => {
                builder.definition = observed.clone();
                builder.object = Some(observed);
                Ok(builder)
            }
            Err(BuilderError::Store(StoreError::NotFound)) => {
                Err(BuilderError::pull_miss(K::KIND_LABEL, name, namespace))
            }
            Err(err) => Err(err),
        }
    }

    /// Wraps every stored object of this kind in an observed builder.
    pub(crate) async fn list_in(
        store: Arc<dyn ObjectStore>,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<Self>, BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            namespace = ?namespace,
            selector = ?selector,
            "listing objects",
        );

        store.attach_scheme(&K::api_resource(), K::SCOPE)?;

        let objects = store.list(&K::gvk(), namespace, selector).await?;
        let mut builders = Vec::with_capacity(objects.len());
        for object in &objects {
            let observed: K = from_dynamic(object)?;
            let mut builder = Self::from_definition(store.clone(), observed.clone());
            builder.object = Some(observed);
            builders.push(builder);
        }

        Ok(builders)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn definition(&self) -> &K {
        &self.definition
    }

    /// Direct access for callers mutating fields no fluent method covers.
    /// Identity edits are not honored; name and namespace are fixed at
    /// construction.
    pub fn definition_mut(&mut self) -> &mut K {
        &mut self.definition
    }

    pub fn object(&self) -> Option<&K> {
        self.object.as_ref()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub(crate) fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// First error wins: once the builder is invalid, later failures are
    /// logged and dropped.
    pub(crate) fn record_error(&mut self, error: ValidationError) {
        if let Some(existing) = &self.error {
            debug!(
                kind = K::KIND_LABEL,
                name = %self.name,
                existing = %existing,
                dropped = %error,
                "builder already carries an error",
            );
            return;
        }

        self.error = Some(error);
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Whether the object currently exists on the store. The observation is
    /// kept. Errors other than not-found also count as presence so that a
    /// transport blip is not mistaken for absence; [`Builder::try_get`]
    /// makes the distinction observable.
    pub async fn exists(&mut self) -> bool {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            "checking whether object exists",
        );

        if self.validate().is_err() {
            return false;
        }

        match self.fetch().await {
            Ok(observed) => {
                self.object = Some(observed);
                true
            }
            Err(BuilderError::Store(StoreError::NotFound)) => {
                self.object = None;
                false
            }
            Err(err) => {
                warn!(
                    kind = K::KIND_LABEL,
                    name = %self.name,
                    %err,
                    "existence check failed, reporting presence",
                );
                self.object = None;
                true
            }
        }
    }

    /// Fetches the current state without touching the cached observation.
    pub async fn get(&self) -> Result<K, BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            "getting object",
        );

        self.validate()?;
        self.fetch().await
    }

    /// Like [`Builder::get`], but absence is `Ok(None)` instead of an error.
    pub async fn try_get(&self) -> Result<Option<K>, BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            "getting object if present",
        );

        self.validate()?;

        match self.fetch().await {
            Ok(observed) => Ok(Some(observed)),
            Err(BuilderError::Store(StoreError::NotFound)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Submits the definition unless the object already exists.
    pub async fn create(&mut self) -> Result<&mut Self, BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            "creating object",
        );

        self.validate()?;

        if self.exists().await {
            return Ok(self);
        }

        let payload = to_dynamic(&self.definition)?;
        let stored = self.store.create(&payload).await?;
        self.definition = from_dynamic(&stored)?;
        self.object = Some(self.definition.clone());
        Ok(self)
    }

    pub(crate) async fn update_inner(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            force,
            "updating object",
        );

        self.validate()?;

        let Some(object) = self.object.as_ref() else {
            return Err(BuilderError::UpdateNonExistent { kind: K::KIND_LABEL });
        };

        // Carry the observed optimistic-concurrency token; the store rejects
        // the replace when it went stale.
        self.definition.meta_mut().resource_version = object.meta().resource_version.clone();

        let payload = to_dynamic(&self.definition)?;
        let err = match self.store.update(&payload).await {
            Ok(stored) => {
                self.definition = from_dynamic(&stored)?;
                self.object = Some(self.definition.clone());
                return Ok(self);
            }
            Err(err) => err,
        };

        if !force {
            return Err(err.into());
        }

        warn!(
            kind = K::KIND_LABEL,
            name = %self.name,
            %err,
            "update failed, falling back to delete and recreate",
        );

        self.definition.meta_mut().resource_version = None;
        self.definition.meta_mut().creation_timestamp = None;
        self.delete().await?;
        self.create().await
    }

    /// Removes the object. Deleting an absent object is not an error; the
    /// cached observation is dropped either way, and the definition sheds
    /// its server-owned metadata so the builder can be reused.
    pub async fn delete(&mut self) -> Result<(), BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            "deleting object",
        );

        self.validate()?;

        if !self.exists().await {
            self.object = None;
            return Ok(());
        }

        self.store
            .delete(&K::gvk(), self.namespace.as_deref(), &self.name)
            .await?;

        self.object = None;
        let meta = self.definition.meta_mut();
        meta.resource_version = None;
        meta.creation_timestamp = None;
        Ok(())
    }

    pub async fn delete_and_wait(&mut self, deadline: Duration) -> Result<(), BuilderError> {
        self.delete().await?;
        self.wait_until_deleted(deadline).await
    }

    /// Polls until the store reports the object gone or the deadline expires.
    pub async fn wait_until_deleted(&self, deadline: Duration) -> Result<(), BuilderError> {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            deadline = ?deadline,
            "waiting until object is deleted",
        );

        self.wait_with(DEFAULT_INTERVAL, deadline, |observed| observed.is_none())
            .await
    }

    /// Polls until the observed object satisfies `predicate`. Absence keeps
    /// the wait going; the object may be created while waiting.
    pub async fn wait_until<F>(&self, deadline: Duration, predicate: F) -> Result<(), BuilderError>
    where
        F: Fn(&K) -> bool,
    {
        debug!(
            kind = K::KIND_LABEL,
            name = %self.name,
            namespace = ?self.namespace,
            deadline = ?deadline,
            "waiting for object to satisfy predicate",
        );

        self.wait_with(STATUS_INTERVAL, deadline, |observed| {
            observed.is_some_and(|k| predicate(k))
        })
        .await
    }

    /// Bridges a store fetch onto [`poll_until`]. Each tick hands `check`
    /// the observed object, or `None` when it is absent; store failures
    /// other than not-found end the wait.
    pub(crate) async fn wait_with<F>(
        &self,
        interval: Duration,
        deadline: Duration,
        check: F,
    ) -> Result<(), BuilderError>
    where
        F: Fn(Option<&K>) -> bool,
    {
        self.validate()?;

        let check = &check;
        let poll = poll_until(interval, deadline, move || async move {
            match self.fetch().await {
                Ok(observed) => Ok(check(Some(&observed))),
                Err(BuilderError::Store(StoreError::NotFound)) => Ok(check(None)),
                Err(err) => Err(err),
            }
        })
        .await;

        match poll {
            Ok(()) => Ok(()),
            Err(PollError::DeadlineExceeded) => Err(self.wait_timeout(deadline)),
            Err(PollError::Predicate(err)) => Err(err),
        }
    }

    /// Applies options in order; the first failure is recorded and stops
    /// the chain.
    pub fn with_options<I, F>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(&mut Self) -> Result<(), ValidationError>,
    {
        if self.validate().is_err() {
            return self;
        }

        for option in options {
            if let Err(err) = option(&mut self) {
                self.record_error(err);
                break;
            }
        }

        self
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if key.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: K::KIND_LABEL,
                field: "label key",
            });
            return self;
        }

        self.definition
            .meta_mut()
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_owned(), value.to_owned());
        self
    }

    pub(crate) fn wait_timeout(&self, deadline: Duration) -> BuilderError {
        BuilderError::WaitTimeout {
            kind: K::KIND_LABEL,
            name: self.name.clone(),
            timeout: deadline,
        }
    }

    async fn fetch(&self) -> Result<K, BuilderError> {
        let stored = self
            .store
            .get(&K::gvk(), self.namespace.as_deref(), &self.name)
            .await?;
        from_dynamic(&stored)
    }
}

impl<K: ResourceKind> fmt::Debug for Builder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("kind", &K::KIND_LABEL)
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("definition", &self.definition)
            .field("object", &self.object)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Typed definition to wire representation. The type metadata is stamped
/// from the api descriptor so hand-rolled kinds need no serde ceremony.
pub(crate) fn to_dynamic<K: ResourceKind>(resource: &K) -> Result<DynamicObject, BuilderError> {
    let descriptor = K::api_resource();
    let mut value = serde_json::to_value(resource).map_err(|err| BuilderError::Encode {
        kind: K::KIND_LABEL,
        source: err,
    })?;
    value["apiVersion"] = serde_json::Value::String(descriptor.api_version);
    value["kind"] = serde_json::Value::String(descriptor.kind);

    serde_json::from_value(value).map_err(|err| BuilderError::Encode {
        kind: K::KIND_LABEL,
        source: err,
    })
}

pub(crate) fn from_dynamic<K: ResourceKind>(object: &DynamicObject) -> Result<K, BuilderError> {
    let value = serde_json::to_value(object).map_err(|err| BuilderError::Decode {
        kind: K::KIND_LABEL,
        source: err,
    })?;

    serde_json::from_value(value).map_err(|err| BuilderError::Decode {
        kind: K::KIND_LABEL,
        source: err,
    })
}
