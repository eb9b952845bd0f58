//! Builder for the Prometheus Operator ServiceMonitor kind.

mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use self::types::{Endpoint, ServiceMonitor, ServiceMonitorSpec};

impl ResourceKind for ServiceMonitor {
    const KIND_LABEL: &'static str = "servicemonitor";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<ServiceMonitor> {
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, nsname: &str) -> Self {
        let mut definition = ServiceMonitor::new(name, ServiceMonitorSpec::default());
        definition.metadata.namespace = Some(nsname.to_owned());

        Self::draft(store, definition)
    }

    pub async fn pull(
        store: Arc<dyn ObjectStore>,
        name: &str,
        nsname: &str,
    ) -> Result<Self, BuilderError> {
        Self::pull_from(store, name, Some(nsname)).await
    }

    /// Selects the services to scrape by label.
    pub fn with_selector(mut self, match_labels: BTreeMap<String, String>) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if match_labels.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: ServiceMonitor::KIND_LABEL,
                field: "selector",
            });
            return self;
        }

        self.definition_mut().spec.selector = LabelSelector {
            match_labels: Some(match_labels),
            ..LabelSelector::default()
        };
        self
    }

    /// Appends a scrape endpoint on the named service port.
    pub fn with_endpoint(mut self, port: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if port.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: ServiceMonitor::KIND_LABEL,
                field: "endpoint port",
            });
            return self;
        }

        self.definition_mut().spec.endpoints.push(Endpoint {
            port: Some(port.to_owned()),
            ..Endpoint::default()
        });
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }
}

pub async fn list(
    store: Arc<dyn ObjectStore>,
    nsname: &str,
) -> Result<Vec<Builder<ServiceMonitor>>, BuilderError> {
    if nsname.is_empty() {
        return Err(ValidationError::EmptyNamespace {
            kind: ServiceMonitor::KIND_LABEL,
        }
        .into());
    }

    Builder::list_in(store, Some(nsname), None).await
}
