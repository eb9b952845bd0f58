use std::path::Path;

use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::api::{ApiResource, DynamicObject};
use kube::config::{InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::core::GroupVersionKind;
use kube::discovery::Scope;
use kube::{Api, Client, Config};
use thiserror::Error;
use tracing::debug;

use crate::error_codes::{
    is_404_not_found_error, is_409_already_exists_error, is_409_conflict_error,
    is_422_unprocessable_entity_error,
};
use crate::store::{ObjectStore, SchemeRegistry, StoreError, object_gvk};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to infer the kubernetes configuration")]
    InferConfig(#[from] InferConfigError),

    #[error("failed to load the kubeconfig")]
    Kubeconfig(#[from] KubeconfigError),

    #[error(transparent)]
    Client(#[from] kube::Error),
}

/// [`ObjectStore`] backed by a live api server.
///
/// Routing goes through the scheme registry: builders register their kind's
/// api descriptor once, and every call resolves the right endpoint from it.
pub struct ApiClient {
    client: Client,
    registry: SchemeRegistry,
}

impl ApiClient {
    pub fn try_new(config: Config) -> Result<Self, ClientError> {
        let client = Client::try_from(config)?;
        Ok(Self {
            client,
            registry: SchemeRegistry::default(),
        })
    }

    /// Connects using the inferred environment: the in-cluster service
    /// account when running in a pod, the local kubeconfig otherwise.
    pub async fn try_default() -> Result<Self, ClientError> {
        let config = Config::infer().await?;
        Self::try_new(config)
    }

    pub async fn from_kubeconfig(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let kubeconfig = Kubeconfig::read_from(path.as_ref())?;
        let config =
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        Self::try_new(config)
    }

    pub fn registry(&self) -> &SchemeRegistry {
        &self.registry
    }

    fn api_for(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Api<DynamicObject>, StoreError> {
        let registration = self.registry.lookup(gvk)?;
        let api = match (&registration.scope, namespace) {
            (Scope::Namespaced, Some(namespace)) => {
                Api::namespaced_with(self.client.clone(), namespace, &registration.resource)
            }
            _ => Api::all_with(self.client.clone(), &registration.resource),
        };

        Ok(api)
    }
}

fn to_store_error(err: kube::Error) -> StoreError {
    if is_404_not_found_error(&err) {
        StoreError::NotFound
    } else if is_409_already_exists_error(&err) {
        StoreError::AlreadyExists
    } else if is_409_conflict_error(&err) {
        StoreError::Conflict
    } else if is_422_unprocessable_entity_error(&err) {
        StoreError::Invalid(err.to_string())
    } else {
        StoreError::Api(err)
    }
}

#[async_trait]
impl ObjectStore for ApiClient {
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
        let api = self.api_for(gvk, namespace)?;
        api.get(name).await.map_err(to_store_error)
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        let api = self.api_for(gvk, namespace)?;

        let mut params = ListParams::default();
        if let Some(selector) = selector {
            params = params.labels(selector);
        }

        let list = api.list(&params).await.map_err(to_store_error)?;
        Ok(list.items)
    }

    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        let gvk = object_gvk(object)?;
        let api = self.api_for(&gvk, object.metadata.namespace.as_deref())?;
        api.create(&PostParams::default(), object)
            .await
            .map_err(to_store_error)
    }

    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        let gvk = object_gvk(object)?;
        let Some(name) = object.metadata.name.as_deref() else {
            return Err(StoreError::Invalid(String::from("object has no name")));
        };

        let api = self.api_for(&gvk, object.metadata.namespace.as_deref())?;
        api.replace(name, &PostParams::default(), object)
            .await
            .map_err(to_store_error)
    }

    async fn delete(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<(), StoreError> {
        let api = self.api_for(gvk, namespace)?;
        let result = api.delete(name, &DeleteParams::default()).await;
        match result {
            Ok(_status_or_object) => Ok(()),
            Err(err) if is_404_not_found_error(&err) => {
                debug!(gvk = ?gvk, name, "object was already gone");
                Err(StoreError::NotFound)
            }
            Err(err) => Err(to_store_error(err)),
        }
    }
}
