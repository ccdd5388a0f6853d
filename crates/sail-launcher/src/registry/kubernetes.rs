use fastrace::future::FutureExt;
use fastrace::Span;
use kube::api::{ApiResource, DynamicObject, PostParams};
use kube::{Api, Client};
use sail_common::config::JobRegistryConfig;
use sail_telemetry::common::{SpanAttribute, SpanKind};
use sail_telemetry::recorder::record_error;

use crate::error::{LaunchError, LaunchResult};
use crate::registry::{JobRecord, JobRegistry};

/// Stores job records as namespaced custom objects,
/// with the record fields under `spec`.
pub struct KubernetesJobRegistry {
    namespace: String,
    resource: ApiResource,
    api: Api<DynamicObject>,
}

impl KubernetesJobRegistry {
    pub fn new(client: Client, namespace: impl Into<String>, config: &JobRegistryConfig) -> Self {
        let namespace = namespace.into();
        let resource = ApiResource {
            group: config.group.clone(),
            version: config.version.clone(),
            api_version: format!("{}/{}", config.group, config.version),
            kind: config.kind.clone(),
            plural: config.plural.clone(),
        };
        Self {
            api: Api::namespaced_with(client, &namespace, &resource),
            namespace,
            resource,
        }
    }
}

#[async_trait::async_trait]
impl JobRegistry for KubernetesJobRegistry {
    async fn create_record(&self, record: &JobRecord) -> LaunchResult<()> {
        let span = Span::enter_with_local_parent("KubernetesJobRegistry::create_record")
            .with_properties(|| {
                [
                    (SpanAttribute::SPAN_KIND, SpanKind::CLIENT.to_string()),
                    (SpanAttribute::KUBERNETES_NAMESPACE, self.namespace.clone()),
                    (SpanAttribute::LAUNCHER_JOB_NAME, record.name.clone()),
                ]
            });
        let object = DynamicObject::new(&record.name, &self.resource)
            .within(&self.namespace)
            .data(serde_json::json!({ "spec": record.fields }));
        let result = self
            .api
            .create(&PostParams::default(), &object)
            .in_span(Span::enter_with_parent("kube::Api", &span))
            .await
            .map_err(LaunchError::from);
        record_error(&span, &result);
        result?;
        Ok(())
    }
}
