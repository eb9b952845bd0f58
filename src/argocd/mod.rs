//! Builder for the Argo CD Application kind.

mod types;

use std::sync::Arc;
use std::time::Duration;

use kube::api::ApiResource;
use kube::discovery::Scope;

use crate::builder::{Builder, ResourceKind};
use crate::error::{BuilderError, ValidationError};
use crate::store::ObjectStore;

pub use self::types::{
    Application, ApplicationDestination, ApplicationSource, ApplicationSpec, ApplicationStatus,
    HealthStatus, SyncPolicy, SyncPolicyAutomated, SyncStatus,
};

impl ResourceKind for Application {
    const KIND_LABEL: &'static str = "application";
    const SCOPE: Scope = Scope::Namespaced;

    fn api_resource() -> ApiResource {
        ApiResource::erase::<Self>(&())
    }
}

impl Builder<Application> {
    /// Drafts an application in the default Argo CD project.
    pub fn new(store: Arc<dyn ObjectStore>, name: &str, nsname: &str) -> Self {
        let spec = ApplicationSpec {
            project: String::from("default"),
            ..ApplicationSpec::default()
        };
        let mut definition = Application::new(name, spec);
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

    /// Points the application at a git source. The branch becomes the
    /// tracked target revision.
    pub fn with_git_details(mut self, repo_url: &str, branch: &str, path: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        let missing = if repo_url.is_empty() {
            Some("gitRepo")
        } else if branch.is_empty() {
            Some("gitBranch")
        } else if path.is_empty() {
            Some("gitPath")
        } else {
            None
        };
        if let Some(field) = missing {
            self.record_error(ValidationError::EmptyField {
                kind: Application::KIND_LABEL,
                field,
            });
            return self;
        }

        self.definition_mut().spec.source = Some(ApplicationSource {
            repo_url: repo_url.to_owned(),
            path: path.to_owned(),
            target_revision: branch.to_owned(),
        });
        self
    }

    pub fn with_destination(mut self, server: &str, nsname: &str) -> Self {
        if self.validate().is_err() {
            return self;
        }

        if server.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: Application::KIND_LABEL,
                field: "destination server",
            });
            return self;
        }
        if nsname.is_empty() {
            self.record_error(ValidationError::EmptyField {
                kind: Application::KIND_LABEL,
                field: "destination namespace",
            });
            return self;
        }

        self.definition_mut().spec.destination = ApplicationDestination {
            server: Some(server.to_owned()),
            namespace: Some(nsname.to_owned()),
        };
        self
    }

    pub async fn update(&mut self, force: bool) -> Result<&mut Self, BuilderError> {
        self.update_inner(force).await
    }

    /// Waits until the reported sync status equals `status`, e.g. `Synced`.
    pub async fn wait_until_sync_status(
        &self,
        status: &str,
        deadline: Duration,
    ) -> Result<(), BuilderError> {
        self.wait_until(deadline, |application| {
            application
                .status
                .as_ref()
                .and_then(|reported| reported.sync.as_ref())
                .and_then(|sync| sync.status.as_deref())
                == Some(status)
        })
        .await
    }
}

pub async fn list(
    store: Arc<dyn ObjectStore>,
    nsname: &str,
) -> Result<Vec<Builder<Application>>, BuilderError> {
    if nsname.is_empty() {
        return Err(ValidationError::EmptyNamespace {
            kind: Application::KIND_LABEL,
        }
        .into());
    }

    Builder::list_in(store, Some(nsname), None).await
}
