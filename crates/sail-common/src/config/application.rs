use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

const DEFAULT_CONFIG: &str = include_str!("application.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub job_registry: JobRegistryConfig,
    pub launch: LaunchConfig,
}

impl AppConfig {
    /// Loads the embedded defaults and applies overrides from `SAIL__`-prefixed
    /// environment variables, where `__` separates nested keys
    /// (e.g. `SAIL__LAUNCH__JOB_RECORD_FAILURE=abort`).
    pub fn load() -> CommonResult<Self> {
        Figment::from(Toml::string(DEFAULT_CONFIG))
            .admerge(Env::prefixed("SAIL__").map(|p| p.as_str().replace("__", ".").into()))
            .extract()
            .map_err(|e| CommonError::InvalidArgument(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub trace_to_console: bool,
}

/// The custom resource used to track submitted jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRegistryConfig {
    pub enabled: bool,
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub job_record_failure: FailurePolicy,
    pub secret_lookup_failure: FailurePolicy,
}

/// What the launcher does when a best-effort step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure and continue the launch.
    #[default]
    Ignore,
    /// Abort the launch with the failure.
    Abort,
}
