use std::future::Future;

use fastrace::future::FutureExt;
use fastrace::Span;
use k8s_openapi::api::core::v1::{Pod, Secret, Service};
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client, Config};
use log::debug;
use sail_telemetry::common::{SpanAttribute, SpanKind};
use sail_telemetry::recorder::record_error;

use crate::control_plane::{ControlPlane, Deletion};
use crate::error::{LaunchError, LaunchResult};

pub struct KubernetesControlPlane {
    namespace: String,
    host: String,
    pods: Api<Pod>,
    services: Api<Service>,
    secrets: Api<Secret>,
}

impl KubernetesControlPlane {
    /// Connects using the ambient Kubernetes configuration.
    pub async fn try_new(namespace: impl Into<String>) -> LaunchResult<Self> {
        let (client, host) = infer_client().await?;
        Ok(Self::with_client(client, namespace, host))
    }

    pub fn with_client(client: Client, namespace: impl Into<String>, host: String) -> Self {
        let namespace = namespace.into();
        debug!("using Kubernetes API server {host} in namespace {namespace}");
        Self {
            pods: Api::namespaced(client.clone(), &namespace),
            services: Api::namespaced(client.clone(), &namespace),
            secrets: Api::namespaced(client, &namespace),
            namespace,
            host,
        }
    }

    fn span(&self, name: &'static str, attribute: &'static str, value: &str) -> Span {
        Span::enter_with_local_parent(name).with_properties(|| {
            [
                (SpanAttribute::SPAN_KIND, SpanKind::CLIENT.to_string()),
                (SpanAttribute::KUBERNETES_NAMESPACE, self.namespace.clone()),
                (attribute, value.to_string()),
            ]
        })
    }
}

/// Creates a client from the kubeconfig file or the in-cluster service account,
/// and returns it together with the API server host.
pub async fn infer_client() -> LaunchResult<(Client, String)> {
    let config = Config::infer()
        .await
        .map_err(|e| LaunchError::remote(format!("failed to infer Kubernetes config: {e}")))?;
    let host = config
        .cluster_url
        .host()
        .ok_or_else(|| {
            LaunchError::remote(format!(
                "missing host in Kubernetes API server URL: {}",
                config.cluster_url
            ))
        })?
        .to_string();
    let client = Client::try_from(config)?;
    Ok((client, host))
}

async fn traced<T, F>(span: Span, f: F) -> LaunchResult<T>
where
    F: Future<Output = Result<T, kube::Error>>,
{
    let result = f
        .in_span(Span::enter_with_parent("kube::Api", &span))
        .await
        .map_err(LaunchError::from);
    record_error(&span, &result);
    result
}

fn deletion<T>(result: LaunchResult<T>) -> LaunchResult<Deletion> {
    match result {
        Ok(_) => Ok(Deletion::Deleted),
        Err(LaunchError::KubeError(kube::Error::Api(e))) if e.code == 404 => Ok(Deletion::NotFound),
        Err(e) => Err(e),
    }
}

#[async_trait::async_trait]
impl ControlPlane for KubernetesControlPlane {
    fn endpoint_host(&self) -> String {
        self.host.clone()
    }

    async fn create_pod(&self, pod: &Pod) -> LaunchResult<()> {
        let name = pod.metadata.name.as_deref().unwrap_or_default();
        let span = self.span(
            "KubernetesControlPlane::create_pod",
            SpanAttribute::KUBERNETES_POD_NAME,
            name,
        );
        traced(span, self.pods.create(&PostParams::default(), pod)).await?;
        Ok(())
    }

    async fn delete_pod(&self, name: &str) -> LaunchResult<Deletion> {
        let span = self.span(
            "KubernetesControlPlane::delete_pod",
            SpanAttribute::KUBERNETES_POD_NAME,
            name,
        );
        deletion(traced(span, self.pods.delete(name, &DeleteParams::default())).await)
    }

    async fn create_service(&self, service: &Service) -> LaunchResult<()> {
        let name = service.metadata.name.as_deref().unwrap_or_default();
        let span = self.span(
            "KubernetesControlPlane::create_service",
            SpanAttribute::KUBERNETES_SERVICE_NAME,
            name,
        );
        traced(span, self.services.create(&PostParams::default(), service)).await?;
        Ok(())
    }

    async fn delete_service(&self, name: &str) -> LaunchResult<Deletion> {
        let span = self.span(
            "KubernetesControlPlane::delete_service",
            SpanAttribute::KUBERNETES_SERVICE_NAME,
            name,
        );
        deletion(traced(span, self.services.delete(name, &DeleteParams::default())).await)
    }

    async fn get_secret(&self, name: &str) -> LaunchResult<Option<Secret>> {
        let span = self.span(
            "KubernetesControlPlane::get_secret",
            SpanAttribute::KUBERNETES_SECRET_NAME,
            name,
        );
        traced(span, self.secrets.get_opt(name)).await
    }
}
