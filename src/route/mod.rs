//! Builder for the OpenShift Route kind.

mod types;

use std::str::FromStr;
use std::sync::Arc;

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ApiResource;
use kube::discovery::Scope;
use strum::VariantNames;
use strum_macros::{EnumString, VariantNames};

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use self::types::{
    Route, RouteIngress, RoutePort, RouteSpec, RouteStatus, RouteTargetReference, RouteTls,
};

/// Accepted TLS termination modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum TlsTermination {
    Edge,
    Passthrough,
    Reencrypt,
}

impl ResourceKind for Route {
    const KIND_LABEL: &'static str = "route";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<Route> {
    /// Drafts a route forwarding to the named service.
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, nsname: &str, service: &str) -> Self {
        let spec = RouteSpec {
            to: RouteTargetReference {
                kind: String::from("Service"),
                name: service.to_owned(),
                weight: None,
            },
            ..RouteSpec::default()
        };
        let mut definition = Route::new(name, spec);
        definition.metadata.namespace = Some(nsname.to_owned());

        let mut builder = Self::draft(store, definition);

        if service.is_empty() {
            builder.record_error(ValidationError::EmptyField {
                kind: Route::KIND_LABEL,
                field: "serviceName",
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

    pub fn with_host(mut self, host: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if host.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: Route::KIND_LABEL,
                field: "host",
            });
            return self;
        }

        self.definition_mut().spec.host = Some(host.to_owned());
        self
    }

    pub fn with_target_port(mut self, port: IntOrString) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if matches!(&port, IntOrString::String(name) if name.is_empty()) {
            self.record_error(ValidationError::EmptyField {
                kind: Route::KIND_LABEL,
                field: "targetPort",
            });
            return self;
        }

        self.definition_mut().spec.port = Some(RoutePort { target_port: port });
        self
    }

    /// Termination must be one of the router's supported modes; the given
    /// spelling is kept as-is once it parses.
    pub fn with_tls_termination(mut self, termination: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if TlsTermination::from_str(termination).is_err() {
            self.record_error(ValidationError::Invalid {
                kind: Route::KIND_LABEL,
                message: format!(
                    "route 'termination' must be one of: {}",
                    TlsTermination::VARIANTS.join(", ")
                ),
            });
            return self;
        }

        let tls = self
            .definition_mut()
            .spec
            .tls
            .get_or_insert_with(RouteTls::default);
        tls.termination = termination.to_owned();
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }
}

pub async fn list(
    store: Arc<dyn ObjectStore>,
    nsname: &str,
) -> Result<Vec<Builder<Route>>, BuilderError> {
    if nsname.is_empty() {
        return Err(ValidationError::EmptyNamespace {
            kind: Route::KIND_LABEL,
        }
        .into());
    }

    Builder::list_in(store, Some(nsname), None).await
}
