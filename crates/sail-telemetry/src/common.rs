/// Common span attribute names.
/// The names either follow the OpenTelemetry semantic conventions,
/// or are specific to the launcher.
pub struct SpanAttribute;

impl SpanAttribute {
    pub const SPAN_KIND: &'static str = "span.kind";
    pub const SPAN_STATUS_CODE: &'static str = "span.status_code";
    pub const EXCEPTION_MESSAGE: &'static str = "exception.message";
    pub const KUBERNETES_NAMESPACE: &'static str = "k8s.namespace.name";
    pub const KUBERNETES_POD_NAME: &'static str = "k8s.pod.name";
    pub const KUBERNETES_SERVICE_NAME: &'static str = "k8s.service.name";
    pub const KUBERNETES_SECRET_NAME: &'static str = "k8s.secret.name";
    pub const LAUNCHER_JOB_NAME: &'static str = "launcher.job.name";
}

pub struct SpanKind;

impl SpanKind {
    pub const CLIENT: &'static str = "CLIENT";
    pub const INTERNAL: &'static str = "INTERNAL";
}
