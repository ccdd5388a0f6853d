use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{LaunchError, LaunchResult};

/// Spark configuration keys recognized by the launcher.
pub struct SparkConfKey;

impl SparkConfKey {
    pub const MASTER: &'static str = "spark.master";
    pub const DEPLOY_MODE: &'static str = "spark.submit.deployMode";
    pub const APP_NAME: &'static str = "spark.app.name";
    pub const EXECUTOR_JAR: &'static str = "spark.executor.jar";
    pub const EXECUTOR_INSTANCES: &'static str = "spark.executor.instances";
    pub const DYNAMIC_ALLOCATION_ENABLED: &'static str = "spark.dynamicAllocation.enabled";
    pub const SHUFFLE_SERVICE_ENABLED: &'static str = "spark.shuffle.service.enabled";
    pub const DRIVER_MEMORY: &'static str = "spark.driver.memory";
    pub const DRIVER_CORES: &'static str = "spark.driver.cores";
    pub const DRIVER_SUPERVISE: &'static str = "spark.driver.supervise";
    pub const DRIVER_EXTRA_CLASS_PATH: &'static str = "spark.driver.extraClassPath";
    pub const DRIVER_EXTRA_LIBRARY_PATH: &'static str = "spark.driver.extraLibraryPath";
    pub const DRIVER_EXTRA_JAVA_OPTIONS: &'static str = "spark.driver.extraJavaOptions";
    pub const KUBERNETES_NAMESPACE: &'static str = "spark.kubernetes.namespace";
    pub const KUBERNETES_SERVICE_ACCOUNT_NAME: &'static str =
        "spark.kubernetes.serviceAccountName";
    pub const KUBERNETES_SPARK_IMAGE: &'static str = "spark.kubernetes.sparkImage";
    pub const KUBERNETES_IMAGE_PULL_SECRET: &'static str = "spark.kubernetes.imagePullSecret";
}

/// A flat Spark configuration mapping.
/// Entries are kept in key order so that anything derived from the
/// configuration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparkConf {
    entries: BTreeMap<String, String>,
}

impl SparkConf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|x| x.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Returns the value for the key, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|x| !x.trim().is_empty())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> LaunchResult<bool> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value.trim() {
            x if x.eq_ignore_ascii_case("true") => Ok(true),
            x if x.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(LaunchError::malformed(key, value, "expected a boolean")),
        }
    }

    pub fn get_parsed<T>(&self, key: &str, default: T) -> LaunchResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| LaunchError::malformed(key, value, e)),
        }
    }

    /// Returns a memory amount in MiB.
    /// A value without a unit suffix is interpreted as MiB.
    pub fn get_memory_mb(&self, key: &str, default: u64) -> LaunchResult<u64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => {
                parse_memory_mb(value).map_err(|reason| LaunchError::malformed(key, value, reason))
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SparkConf {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut conf = SparkConf::new();
        conf.extend(iter);
        conf
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for SparkConf {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

fn parse_memory_mb(value: &str) -> Result<u64, String> {
    let value = value.trim().to_ascii_lowercase();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    if number.is_empty() {
        return Err("expected a memory amount such as 512m or 2g".to_string());
    }
    let number: u64 = number.parse().map_err(|e| format!("{e}"))?;
    // The shift is applied to the byte count and then converted back to MiB.
    let shift = match unit {
        "" | "m" | "mb" => return Ok(number),
        "b" => 0,
        "k" | "kb" => 10,
        "g" | "gb" => 30,
        "t" | "tb" => 40,
        "p" | "pb" => 50,
        _ => return Err(format!("unknown memory unit: {unit}")),
    };
    number
        .checked_mul(1 << shift)
        .map(|bytes| bytes >> 20)
        .ok_or_else(|| "memory amount overflow".to_string())
}
