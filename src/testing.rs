//! In-memory [`ObjectStore`] for tests. No api server required.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersionKind;
use kube::discovery::Scope;
use uuid::Uuid;

use crate::store::{ObjectStore, SchemeRegistry, StoreError, gvk_key, object_gvk};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallVerb {
    Get,
    List,
    Create,
    Update,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub verb: CallVerb,
    pub kind: String,
    pub name: String,
}

type ObjectKey = (String, Option<String>, String);

#[derive(Default)]
struct State {
    objects: BTreeMap<ObjectKey, DynamicObject>,
    revision: u64,
    journal: Vec<RecordedCall>,
}

/// An [`ObjectStore`] living entirely in process memory.
///
/// Behaves like a tiny api server: it assigns uid, resourceVersion and
/// creationTimestamp on create, refuses replaces carrying a stale
/// resourceVersion, and honors equality label selectors on list. Every call
/// is journaled so tests can assert that an operation never reached the
/// store.
#[derive(Default)]
pub struct FakeStore {
    registry: SchemeRegistry,
    state: Mutex<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites an object as an external writer would,
    /// advancing its resourceVersion. Not journaled, and the kind does not
    /// need to be registered yet. Returns the object as stored.
    pub fn seed(&self, object: DynamicObject) -> Result<DynamicObject, StoreError> {
        let gvk = object_gvk(&object)?;
        let key = object_key(&gvk, &object)?;

        let mut state = self.lock();
        state.revision += 1;

        let mut stored = object;
        stored.metadata.resource_version = Some(state.revision.to_string());
        if stored.metadata.uid.is_none() {
            stored.metadata.uid = Some(Uuid::new_v4().to_string());
        }
        if stored.metadata.creation_timestamp.is_none() {
            stored.metadata.creation_timestamp = Some(Time(Utc::now()));
        }

        state.objects.insert(key, stored.clone());
        Ok(stored)
    }

    /// Reads the stored object without journaling a call.
    pub fn peek(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<DynamicObject> {
        let key = (gvk_key(gvk), namespace.map(str::to_owned), name.to_owned());
        self.lock().objects.get(&key).cloned()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().journal.clone()
    }

    pub fn take_calls(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut self.lock().journal)
    }

    pub fn registered_kinds(&self) -> Vec<String> {
        self.registry.keys()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(state: &mut State, verb: CallVerb, kind: &str, name: &str) {
        state.journal.push(RecordedCall {
            verb,
            kind: kind.to_owned(),
            name: name.to_owned(),
        });
    }
}

fn object_key(gvk: &GroupVersionKind, object: &DynamicObject) -> Result<ObjectKey, StoreError> {
    let name = object
        .metadata
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StoreError::Invalid(String::from("object has no name")))?;

    Ok((gvk_key(gvk), object.metadata.namespace.clone(), name))
}

fn selector_matches(selector: &str, labels: Option<&BTreeMap<String, String>>) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => {
                let value = value.strip_prefix('=').unwrap_or(value);
                labels.is_some_and(|labels| {
                    labels.get(key.trim()).map(String::as_str) == Some(value.trim())
                })
            }
            None => labels.is_some_and(|labels| labels.contains_key(term)),
        })
}

#[async_trait]
impl ObjectStore for FakeStore {
    fn attach_scheme(&self, resource: &ApiResource, scope: Scope) -> Result<(), StoreError> {
        self.registry.attach(resource, scope);
        Ok(())
    }

    async fn get(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, StoreError> {
        self.registry.lookup(gvk)?;

        let mut state = self.lock();
        Self::record(&mut state, CallVerb::Get, &gvk.kind, name);

        let key = (gvk_key(gvk), namespace.map(str::to_owned), name.to_owned());
        state.objects.get(&key).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        self.registry.lookup(gvk)?;

        let mut state = self.lock();
        Self::record(&mut state, CallVerb::List, &gvk.kind, "");

        let wanted = gvk_key(gvk);
        let items = state
            .objects
            .iter()
            .filter(|((key_gvk, key_namespace, _), _)| {
                *key_gvk == wanted
                    && namespace.map_or(true, |namespace| {
                        key_namespace.as_deref() == Some(namespace)
                    })
            })
            .filter(|(_, object)| {
                selector.map_or(true, |selector| {
                    selector_matches(selector, object.metadata.labels.as_ref())
                })
            })
            .map(|(_, object)| object.clone())
            .collect();

        Ok(items)
    }

    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        let gvk = object_gvk(object)?;
        self.registry.lookup(&gvk)?;
        let key = object_key(&gvk, object)?;

        let mut state = self.lock();
        Self::record(&mut state, CallVerb::Create, &gvk.kind, &key.2);

        if state.objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }

        state.revision += 1;
        let mut stored = object.clone();
        stored.metadata.resource_version = Some(state.revision.to_string());
        stored.metadata.uid = Some(Uuid::new_v4().to_string());
        stored.metadata.creation_timestamp = Some(Time(Utc::now()));

        state.objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        let gvk = object_gvk(object)?;
        self.registry.lookup(&gvk)?;
        let key = object_key(&gvk, object)?;

        let mut state = self.lock();
        Self::record(&mut state, CallVerb::Update, &gvk.kind, &key.2);

        let Some(current) = state.objects.get(&key).cloned() else {
            return Err(StoreError::NotFound);
        };

        let supplied = object
            .metadata
            .resource_version
            .as_deref()
            .filter(|revision| !revision.is_empty());
        if let Some(supplied) = supplied {
            if Some(supplied) != current.metadata.resource_version.as_deref() {
                return Err(StoreError::Conflict);
            }
        }

        state.revision += 1;
        let mut stored = object.clone();
        stored.metadata.resource_version = Some(state.revision.to_string());
        stored.metadata.uid = current.metadata.uid;
        stored.metadata.creation_timestamp = current.metadata.creation_timestamp;

        state.objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), StoreError> {
        self.registry.lookup(gvk)?;

        let mut state = self.lock();
        Self::record(&mut state, CallVerb::Delete, &gvk.kind, name);

        let key = (gvk_key(gvk), namespace.map(str::to_owned), name.to_owned());
        match state.objects.remove(&key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! from_json {
        ($($json:tt)+) => {
            ::serde_json::from_value(::serde_json::json!($($json)+)).expect("Invalid json")
        };
    }

    fn role_resource() -> ApiResource {
        ApiResource {
            group: String::from("rbac.authorization.k8s.io"),
            version: String::from("v1"),
            api_version: String::from("rbac.authorization.k8s.io/v1"),
            kind: String::from("Role"),
            plural: String::from("roles"),
        }
    }

    fn role_gvk() -> GroupVersionKind {
        GroupVersionKind {
            group: String::from("rbac.authorization.k8s.io"),
            version: String::from("v1"),
            kind: String::from("Role"),
        }
    }

    fn role_object(name: &str, namespace: &str) -> DynamicObject {
        from_json!({
            "apiVersion": "rbac.authorization.k8s.io/v1",
            "kind": "Role",
            "metadata": { "name": name, "namespace": namespace },
            "rules": [],
        })
    }

    fn registered_store() -> FakeStore {
        let store = FakeStore::new();
        store
            .attach_scheme(&role_resource(), Scope::Namespaced)
            .unwrap();
        store
    }

    #[tokio::test]
    async fn should_stamp_server_metadata_on_create() {
        let store = registered_store();

        let stored = store.create(&role_object("r", "ns")).await.unwrap();

        assert_eq!(stored.metadata.resource_version.as_deref(), Some("1"));
        assert!(stored.metadata.uid.is_some());
        assert!(stored.metadata.creation_timestamp.is_some());
    }

    #[tokio::test]
    async fn should_refuse_create_for_taken_identity() {
        let store = registered_store();
        store.create(&role_object("r", "ns")).await.unwrap();

        let result = store.create(&role_object("r", "ns")).await;
        assert_matches!(result, Err(StoreError::AlreadyExists));
    }

    #[tokio::test]
    async fn should_conflict_on_stale_resource_version() {
        let store = registered_store();
        let stored = store.create(&role_object("r", "ns")).await.unwrap();

        // an external writer moves the object forward
        store.seed(stored.clone()).unwrap();

        let result = store.update(&stored).await;
        assert_matches!(result, Err(StoreError::Conflict));
    }

    #[tokio::test]
    async fn should_accept_update_without_resource_version() {
        let store = registered_store();
        store.create(&role_object("r", "ns")).await.unwrap();

        let updated = store.update(&role_object("r", "ns")).await.unwrap();
        assert_eq!(updated.metadata.resource_version.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn should_preserve_uid_and_creation_timestamp_on_update() {
        let store = registered_store();
        let created = store.create(&role_object("r", "ns")).await.unwrap();

        let updated = store.update(&role_object("r", "ns")).await.unwrap();

        assert_eq!(updated.metadata.uid, created.metadata.uid);
        assert_eq!(
            updated.metadata.creation_timestamp,
            created.metadata.creation_timestamp
        );
    }

    #[tokio::test]
    async fn should_fail_for_unregistered_kind() {
        let store = FakeStore::new();

        let result = store.get(&role_gvk(), Some("ns"), "r").await;
        assert_matches!(result, Err(StoreError::KindNotRegistered(_)));
    }

    #[tokio::test]
    async fn should_list_by_namespace_and_selector() {
        let store = registered_store();

        let mut labeled = role_object("a", "ns");
        labeled.metadata.labels =
            Some(BTreeMap::from([(String::from("team"), String::from("infra"))]));
        store.create(&labeled).await.unwrap();
        store.create(&role_object("b", "ns")).await.unwrap();
        store.create(&role_object("c", "other")).await.unwrap();

        let in_namespace = store.list(&role_gvk(), Some("ns"), None).await.unwrap();
        assert_eq!(in_namespace.len(), 2);

        let selected = store
            .list(&role_gvk(), Some("ns"), Some("team=infra"))
            .await
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].metadata.name.as_deref(), Some("a"));

        let everywhere = store.list(&role_gvk(), None, None).await.unwrap();
        assert_eq!(everywhere.len(), 3);
    }

    #[tokio::test]
    async fn should_journal_every_call() {
        let store = registered_store();
        store.create(&role_object("r", "ns")).await.unwrap();
        let _ = store.get(&role_gvk(), Some("ns"), "r").await;
        let _ = store.delete(&role_gvk(), Some("ns"), "r").await;

        let verbs: Vec<_> = store.calls().into_iter().map(|call| call.verb).collect();
        assert_eq!(verbs, vec![CallVerb::Create, CallVerb::Get, CallVerb::Delete]);
    }

    #[test]
    fn should_match_existence_and_equality_selectors() {
        let labels = BTreeMap::from([
            (String::from("app"), String::from("web")),
            (String::from("tier"), String::from("front")),
        ]);

        assert!(selector_matches("app=web", Some(&labels)));
        assert!(selector_matches("app==web", Some(&labels)));
        assert!(selector_matches("app=web,tier=front", Some(&labels)));
        assert!(selector_matches("app", Some(&labels)));
        assert!(!selector_matches("app=api", Some(&labels)));
        assert!(!selector_matches("missing", Some(&labels)));
        assert!(!selector_matches("app=web", None));
    }
}
