use sail_common::config::{FailurePolicy, LaunchConfig};

#[derive(Debug, Clone, Default)]
pub struct DriverLauncherOptions {
    /// What to do when the job record cannot be posted.
    pub job_record_failure: FailurePolicy,
    /// What to do when the image pull secret lookup fails for a reason
    /// other than the secret being absent.
    pub secret_lookup_failure: FailurePolicy,
}

impl From<&LaunchConfig> for DriverLauncherOptions {
    fn from(config: &LaunchConfig) -> Self {
        Self {
            job_record_failure: config.job_record_failure,
            secret_lookup_failure: config.secret_lookup_failure,
        }
    }
}
