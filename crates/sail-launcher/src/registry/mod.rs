mod kubernetes;

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::error::LaunchResult;

pub use kubernetes::KubernetesJobRegistry;

pub const JOB_RECORD_INSTANCES: &str = "instances";
pub const JOB_RECORD_IMAGE: &str = "image";
pub const JOB_RECORD_STATE: &str = "state";
/// The state of a job record that has been submitted but not yet picked up.
pub const JOB_STATE_QUEUED: &str = "QUEUED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum JobRecordValue {
    Integer(i64),
    String(String),
}

/// A tracked submission, independent of the driver resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub name: String,
    pub fields: BTreeMap<String, JobRecordValue>,
}

impl JobRecord {
    pub fn queued(name: impl Into<String>, instances: u32, image: impl Into<String>) -> Self {
        let fields = BTreeMap::from([
            (
                JOB_RECORD_INSTANCES.to_string(),
                JobRecordValue::Integer(i64::from(instances)),
            ),
            (
                JOB_RECORD_IMAGE.to_string(),
                JobRecordValue::String(image.into()),
            ),
            (
                JOB_RECORD_STATE.to_string(),
                JobRecordValue::String(JOB_STATE_QUEUED.to_string()),
            ),
        ]);
        Self {
            name: name.into(),
            fields,
        }
    }
}

#[async_trait::async_trait]
pub trait JobRegistry: Send + Sync + 'static {
    async fn create_record(&self, record: &JobRecord) -> LaunchResult<()>;
}

/// A registry used when job tracking is turned off.
pub struct DisabledJobRegistry;

#[async_trait::async_trait]
impl JobRegistry for DisabledJobRegistry {
    async fn create_record(&self, record: &JobRecord) -> LaunchResult<()> {
        debug!("job registry disabled, skipping job record {}", record.name);
        Ok(())
    }
}
