mod kubernetes;

use k8s_openapi::api::core::v1::{Pod, Secret, Service};

use crate::error::LaunchResult;

pub use kubernetes::{infer_client, KubernetesControlPlane};

/// The outcome of deleting a resource by name.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Deletion {
    Deleted,
    NotFound,
}

/// The control plane operations the launcher needs, scoped to one namespace.
#[async_trait::async_trait]
pub trait ControlPlane: Send + Sync + 'static {
    /// The host of the API server the client is connected to.
    fn endpoint_host(&self) -> String;

    async fn create_pod(&self, pod: &Pod) -> LaunchResult<()>;

    /// Deletes a pod by name. A missing pod is not an error.
    async fn delete_pod(&self, name: &str) -> LaunchResult<Deletion>;

    async fn create_service(&self, service: &Service) -> LaunchResult<()>;

    /// Deletes a service by name. A missing service is not an error.
    async fn delete_service(&self, name: &str) -> LaunchResult<Deletion>;

    /// Looks up a secret by name, returning `None` if it does not exist.
    async fn get_secret(&self, name: &str) -> LaunchResult<Option<Secret>>;
}
