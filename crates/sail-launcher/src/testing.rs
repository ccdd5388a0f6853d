//! Recording stubs for the launcher collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use k8s_openapi::api::core::v1::{Pod, Secret, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::control_plane::{ControlPlane, Deletion};
use crate::error::{LaunchError, LaunchResult};
use crate::identity::{NameGenerator, ResourceKind};
use crate::registry::{JobRecord, JobRegistry};

pub const STUB_ENDPOINT_HOST: &str = "10.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneCall {
    CreatePod(String),
    DeletePod(String),
    CreateService(String),
    DeleteService(String),
    GetSecret(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBehavior {
    Found,
    NotFound,
    Fail,
}

pub struct StubControlPlane {
    calls: Mutex<Vec<ControlPlaneCall>>,
    pods: Mutex<Vec<Pod>>,
    services: Mutex<Vec<Service>>,
    secret: SecretBehavior,
    fail_create_pod: bool,
    fail_create_service: bool,
    fail_delete_pod: bool,
}

impl StubControlPlane {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(vec![]),
            pods: Mutex::new(vec![]),
            services: Mutex::new(vec![]),
            secret: SecretBehavior::NotFound,
            fail_create_pod: false,
            fail_create_service: false,
            fail_delete_pod: false,
        }
    }

    pub fn with_secret(mut self, secret: SecretBehavior) -> Self {
        self.secret = secret;
        self
    }

    pub fn with_failed_pod_creation(mut self) -> Self {
        self.fail_create_pod = true;
        self
    }

    pub fn with_failed_service_creation(mut self) -> Self {
        self.fail_create_service = true;
        self
    }

    pub fn with_failed_pod_deletion(mut self) -> Self {
        self.fail_delete_pod = true;
        self
    }

    pub fn calls(&self) -> Vec<ControlPlaneCall> {
        self.calls.lock().map(|x| x.clone()).unwrap_or_default()
    }

    pub fn pods(&self) -> Vec<Pod> {
        self.pods.lock().map(|x| x.clone()).unwrap_or_default()
    }

    pub fn services(&self) -> Vec<Service> {
        self.services.lock().map(|x| x.clone()).unwrap_or_default()
    }

    fn record(&self, call: ControlPlaneCall) -> LaunchResult<()> {
        self.calls.lock()?.push(call);
        Ok(())
    }
}

impl Default for StubControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

fn name_of(metadata: &ObjectMeta) -> String {
    metadata.name.clone().unwrap_or_default()
}

#[async_trait::async_trait]
impl ControlPlane for StubControlPlane {
    fn endpoint_host(&self) -> String {
        STUB_ENDPOINT_HOST.to_string()
    }

    async fn create_pod(&self, pod: &Pod) -> LaunchResult<()> {
        self.record(ControlPlaneCall::CreatePod(name_of(&pod.metadata)))?;
        if self.fail_create_pod {
            return Err(LaunchError::remote("pod creation rejected"));
        }
        self.pods.lock()?.push(pod.clone());
        Ok(())
    }

    async fn delete_pod(&self, name: &str) -> LaunchResult<Deletion> {
        self.record(ControlPlaneCall::DeletePod(name.to_string()))?;
        if self.fail_delete_pod {
            return Err(LaunchError::remote("pod deletion rejected"));
        }
        let mut pods = self.pods.lock()?;
        let count = pods.len();
        pods.retain(|x| x.metadata.name.as_deref() != Some(name));
        Ok(if pods.len() < count {
            Deletion::Deleted
        } else {
            Deletion::NotFound
        })
    }

    async fn create_service(&self, service: &Service) -> LaunchResult<()> {
        self.record(ControlPlaneCall::CreateService(name_of(&service.metadata)))?;
        if self.fail_create_service {
            return Err(LaunchError::remote("service creation rejected"));
        }
        self.services.lock()?.push(service.clone());
        Ok(())
    }

    async fn delete_service(&self, name: &str) -> LaunchResult<Deletion> {
        self.record(ControlPlaneCall::DeleteService(name.to_string()))?;
        let mut services = self.services.lock()?;
        let count = services.len();
        services.retain(|x| x.metadata.name.as_deref() != Some(name));
        Ok(if services.len() < count {
            Deletion::Deleted
        } else {
            Deletion::NotFound
        })
    }

    async fn get_secret(&self, name: &str) -> LaunchResult<Option<Secret>> {
        self.record(ControlPlaneCall::GetSecret(name.to_string()))?;
        match self.secret {
            SecretBehavior::Found => Ok(Some(Secret {
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            })),
            SecretBehavior::NotFound => Ok(None),
            SecretBehavior::Fail => Err(LaunchError::remote("secrets is forbidden")),
        }
    }
}

pub struct StubJobRegistry {
    records: Mutex<Vec<JobRecord>>,
    fail: bool,
}

impl StubJobRegistry {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(vec![]),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<JobRecord> {
        self.records.lock().map(|x| x.clone()).unwrap_or_default()
    }
}

impl Default for StubJobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl JobRegistry for StubJobRegistry {
    async fn create_record(&self, record: &JobRecord) -> LaunchResult<()> {
        if self.fail {
            return Err(LaunchError::remote("job registry unavailable"));
        }
        self.records.lock()?.push(record.clone());
        Ok(())
    }
}

/// Generates `spark-<kind>-<n>` with an increasing counter.
pub struct SequentialNameGenerator {
    next: AtomicUsize,
}

impl SequentialNameGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicUsize::new(1),
        }
    }
}

impl Default for SequentialNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator for SequentialNameGenerator {
    fn generate(&self, kind: ResourceKind) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("spark-{kind}-{n:05}")
    }
}
