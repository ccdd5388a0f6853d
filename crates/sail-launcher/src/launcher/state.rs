use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::identity::LaunchIdentities;

/// The progress of a driver launch.
/// Each state is reached only after the previous step succeeded,
/// except for [`LaunchState::JobRecordPosted`] which is reached even if
/// the job record could not be posted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    Idle,
    JobRecordPosted,
    DriverPodCreated,
    ServiceCreated,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum JobRecordOutcome {
    Posted,
    /// The record could not be posted and the failure was ignored.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchSummary {
    pub namespace: String,
    #[serde(flatten)]
    pub identities: LaunchIdentities,
    pub job_record: JobRecordOutcome,
    pub image_pull_secret: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
