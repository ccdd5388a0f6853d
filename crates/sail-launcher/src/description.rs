use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::conf::{SparkConf, SparkConfKey};
use crate::error::{LaunchError, LaunchResult};
use crate::translator::is_pass_through;

pub const DEFAULT_DRIVER_NAME: &str = "default";
/// Same default as Spark.
pub const DEFAULT_DRIVER_MEMORY_MB: u64 = 1024;
pub const DEFAULT_DRIVER_CORES: f64 = 1.0;
pub const DEFAULT_DRIVER_SUPERVISE: bool = false;

const PATH_SEPARATOR: char = ':';

/// The application submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchRequest {
    /// The location of the application archive.
    pub jar: String,
    pub main_class: String,
    pub args: Vec<String>,
}

impl LaunchRequest {
    pub fn new(jar: impl Into<String>, main_class: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            jar: jar.into(),
            main_class: main_class.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverCommand {
    pub main_class: String,
    pub args: Vec<String>,
    pub class_path_entries: Vec<String>,
    pub library_path_entries: Vec<String>,
    pub java_options: Vec<String>,
}

/// Everything needed to launch one driver, resolved against defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverDescription {
    pub name: String,
    pub jar: String,
    pub memory_mb: u64,
    pub cores: f64,
    pub supervise: bool,
    pub command: DriverCommand,
    pub submitted_at: DateTime<Utc>,
}

/// Validates the request and resolves the optional driver settings.
/// Nothing here talks to the control plane, so a bad request is rejected
/// before any resource is created.
pub fn build_driver_description(
    conf: &SparkConf,
    request: &LaunchRequest,
) -> LaunchResult<DriverDescription> {
    if request.jar.trim().is_empty() {
        return Err(LaunchError::missing("application jar"));
    }
    if request.main_class.trim().is_empty() {
        return Err(LaunchError::missing("main class"));
    }

    let name = conf.get_or(SparkConfKey::APP_NAME, DEFAULT_DRIVER_NAME);
    let memory_mb = conf.get_memory_mb(SparkConfKey::DRIVER_MEMORY, DEFAULT_DRIVER_MEMORY_MB)?;
    if memory_mb == 0 {
        return Err(LaunchError::malformed(
            SparkConfKey::DRIVER_MEMORY,
            conf.get_or(SparkConfKey::DRIVER_MEMORY, ""),
            "expected a positive amount of at least 1m",
        ));
    }
    let cores = conf.get_parsed(SparkConfKey::DRIVER_CORES, DEFAULT_DRIVER_CORES)?;
    if !(cores.is_finite() && cores > 0.0) {
        return Err(LaunchError::malformed(
            SparkConfKey::DRIVER_CORES,
            cores.to_string(),
            "expected a positive number",
        ));
    }
    let supervise = conf.get_bool(SparkConfKey::DRIVER_SUPERVISE, DEFAULT_DRIVER_SUPERVISE)?;

    let command = DriverCommand {
        main_class: request.main_class.clone(),
        args: request.args.clone(),
        class_path_entries: split_paths(conf.get(SparkConfKey::DRIVER_EXTRA_CLASS_PATH)),
        library_path_entries: split_paths(conf.get(SparkConfKey::DRIVER_EXTRA_LIBRARY_PATH)),
        java_options: java_options(conf),
    };

    Ok(DriverDescription {
        name: name.to_string(),
        jar: request.jar.clone(),
        memory_mb,
        cores,
        supervise,
        command,
        submitted_at: Utc::now(),
    })
}

fn split_paths(value: Option<&str>) -> Vec<String> {
    value
        .into_iter()
        .flat_map(|x| x.split(PATH_SEPARATOR))
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

/// The Spark settings as system properties, followed by the user-supplied
/// driver JVM options. The settings are the same ones passed as `--conf` arguments.
fn java_options(conf: &SparkConf) -> Vec<String> {
    let properties = conf
        .iter()
        .filter(|(k, _)| is_pass_through(k))
        .map(|(k, v)| format!("-D{k}={v}"));
    let extra = conf
        .get(SparkConfKey::DRIVER_EXTRA_JAVA_OPTIONS)
        .into_iter()
        .flat_map(|x| x.split_whitespace())
        .map(|x| x.to_string());
    properties.chain(extra).collect()
}
