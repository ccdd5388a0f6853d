use serde::Serialize;

use crate::conf::{SparkConf, SparkConfKey};
use crate::description::DriverDescription;
use crate::error::{LaunchError, LaunchResult};

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_SERVICE_ACCOUNT_NAME: &str = "default";
pub const DEFAULT_EXECUTOR_INSTANCES: u32 = 1;

/// The bootstrap archive baked into the driver image.
/// The driver entrypoint script expects it right after the Spark arguments.
pub const CLIENT_BOOTSTRAP_JAR: &str = "/opt/spark/kubernetes/client.jar";

/// Keys that are never forwarded to the driver process.
/// They are either redundant in the driver or re-injected explicitly.
pub const FORWARD_DENY_LIST: &[&str] = &[
    SparkConfKey::DEPLOY_MODE,
    SparkConfKey::MASTER,
    SparkConfKey::APP_NAME,
    SparkConfKey::EXECUTOR_JAR,
    SparkConfKey::DYNAMIC_ALLOCATION_ENABLED,
    SparkConfKey::SHUFFLE_SERVICE_ENABLED,
];

/// Keys consumed by the launcher itself.
pub const LAUNCHER_PRIVATE_KEYS: &[&str] = &[
    SparkConfKey::KUBERNETES_NAMESPACE,
    SparkConfKey::KUBERNETES_SERVICE_ACCOUNT_NAME,
    SparkConfKey::KUBERNETES_SPARK_IMAGE,
    SparkConfKey::KUBERNETES_IMAGE_PULL_SECRET,
];

/// Keys emitted as dedicated driver arguments.
const EXPLICIT_KEYS: &[&str] = &[SparkConfKey::EXECUTOR_INSTANCES, SparkConfKey::DRIVER_MEMORY];

pub fn is_forwardable(key: &str) -> bool {
    !FORWARD_DENY_LIST.contains(&key) && !LAUNCHER_PRIVATE_KEYS.contains(&key)
}

/// Whether the key is handed to the driver as a generic Spark setting,
/// both as a `--conf` argument and as a JVM system property.
/// Keys outside the `spark.` namespace are never handed over.
pub fn is_pass_through(key: &str) -> bool {
    key.starts_with("spark.") && is_forwardable(key) && !EXPLICIT_KEYS.contains(&key)
}

/// The structured launch settings read from the Spark configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchParameters {
    pub namespace: String,
    pub service_account_name: String,
    pub image: String,
    /// The image pull secret name, or `None` when the feature is not configured.
    pub image_pull_secret: Option<String>,
    pub executor_instances: u32,
    pub dynamic_allocation: bool,
}

impl LaunchParameters {
    pub fn try_from_conf(conf: &SparkConf) -> LaunchResult<Self> {
        let image = conf
            .get_non_empty(SparkConfKey::KUBERNETES_SPARK_IMAGE)
            .ok_or_else(|| LaunchError::missing(SparkConfKey::KUBERNETES_SPARK_IMAGE))?;
        Ok(Self {
            namespace: conf
                .get_non_empty(SparkConfKey::KUBERNETES_NAMESPACE)
                .unwrap_or(DEFAULT_NAMESPACE)
                .to_string(),
            service_account_name: conf
                .get_non_empty(SparkConfKey::KUBERNETES_SERVICE_ACCOUNT_NAME)
                .unwrap_or(DEFAULT_SERVICE_ACCOUNT_NAME)
                .to_string(),
            image: image.to_string(),
            image_pull_secret: conf
                .get_non_empty(SparkConfKey::KUBERNETES_IMAGE_PULL_SECRET)
                .map(|x| x.to_string()),
            executor_instances: conf
                .get_parsed(SparkConfKey::EXECUTOR_INSTANCES, DEFAULT_EXECUTOR_INSTANCES)?,
            dynamic_allocation: conf.get_bool(SparkConfKey::DYNAMIC_ALLOCATION_ENABLED, false)?,
        })
    }
}

fn conf_arg(key: &str, value: impl std::fmt::Display) -> String {
    format!("--conf={key}={value}")
}

/// Builds the driver process arguments.
///
/// The driver entrypoint script reads the arguments positionally, so the order is fixed:
/// 1. the application jar, main class, master, memory, executor jar, executor instances,
///    namespace and image,
/// 2. the remaining forwardable configuration in key order,
/// 3. the dynamic allocation flags, if enabled,
/// 4. the client bootstrap jar and the space-joined program arguments.
pub fn build_driver_arguments(
    conf: &SparkConf,
    params: &LaunchParameters,
    description: &DriverDescription,
    master: &str,
) -> Vec<String> {
    let mut args = vec![
        description.jar.clone(),
        format!("--class={}", description.command.main_class),
        format!("--master={master}"),
        format!("--driver-memory={}m", description.memory_mb),
        conf_arg(SparkConfKey::EXECUTOR_JAR, &description.jar),
        conf_arg(SparkConfKey::EXECUTOR_INSTANCES, params.executor_instances),
        conf_arg(SparkConfKey::KUBERNETES_NAMESPACE, &params.namespace),
        conf_arg(SparkConfKey::KUBERNETES_SPARK_IMAGE, &params.image),
    ];
    args.extend(
        conf.iter()
            .filter(|(k, _)| is_pass_through(k))
            .map(|(k, v)| conf_arg(k, v)),
    );
    if params.dynamic_allocation {
        args.push(conf_arg(SparkConfKey::DYNAMIC_ALLOCATION_ENABLED, true));
        args.push(conf_arg(SparkConfKey::SHUFFLE_SERVICE_ENABLED, true));
    }
    args.push(CLIENT_BOOTSTRAP_JAR.to_string());
    args.push(description.command.args.join(" "));
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{build_driver_description, LaunchRequest};

    const MASTER: &str = "k8s://10.0.0.1";
    const FIXED_BLOCK_LEN: usize = 8;

    fn arguments(conf: &SparkConf) -> LaunchResult<Vec<String>> {
        let params = LaunchParameters::try_from_conf(conf)?;
        let request = LaunchRequest::new("app.jar", "Main", vec!["a".to_string(), "b".to_string()]);
        let description = build_driver_description(conf, &request)?;
        Ok(build_driver_arguments(conf, &params, &description, MASTER))
    }

    fn base_conf() -> SparkConf {
        SparkConf::new()
            .with(SparkConfKey::KUBERNETES_SPARK_IMAGE, "img:1")
            .with(SparkConfKey::KUBERNETES_NAMESPACE, "ns1")
    }

    #[test]
    fn test_launch_parameters_defaults() -> LaunchResult<()> {
        let expected = LaunchParameters {
            namespace: "default".to_string(),
            service_account_name: "default".to_string(),
            image: "img:1".to_string(),
            image_pull_secret: None,
            executor_instances: 1,
            dynamic_allocation: false,
        };
        let conf = SparkConf::new().with(SparkConfKey::KUBERNETES_SPARK_IMAGE, "img:1");
        assert_eq!(LaunchParameters::try_from_conf(&conf)?, expected);

        let conf = conf
            .with(SparkConfKey::KUBERNETES_NAMESPACE, "")
            .with(SparkConfKey::KUBERNETES_SERVICE_ACCOUNT_NAME, "  ")
            .with(SparkConfKey::KUBERNETES_IMAGE_PULL_SECRET, "");
        assert_eq!(LaunchParameters::try_from_conf(&conf)?, expected);
        Ok(())
    }

    #[test]
    fn test_launch_parameters_missing_image() {
        for conf in [
            SparkConf::new(),
            SparkConf::new().with(SparkConfKey::KUBERNETES_SPARK_IMAGE, ""),
        ] {
            assert!(matches!(
                LaunchParameters::try_from_conf(&conf),
                Err(LaunchError::MissingRequiredField(key)) if key == SparkConfKey::KUBERNETES_SPARK_IMAGE
            ));
        }
    }

    #[test]
    fn test_launch_parameters_malformed_instances() {
        let conf = base_conf().with(SparkConfKey::EXECUTOR_INSTANCES, "three");
        assert!(matches!(
            LaunchParameters::try_from_conf(&conf),
            Err(LaunchError::MalformedValue { key, .. }) if key == SparkConfKey::EXECUTOR_INSTANCES
        ));
    }

    #[test]
    fn test_fixed_arguments() -> LaunchResult<()> {
        let args = arguments(&base_conf().with(SparkConfKey::EXECUTOR_INSTANCES, "3"))?;
        assert_eq!(
            args,
            vec![
                "app.jar",
                "--class=Main",
                "--master=k8s://10.0.0.1",
                "--driver-memory=1024m",
                "--conf=spark.executor.jar=app.jar",
                "--conf=spark.executor.instances=3",
                "--conf=spark.kubernetes.namespace=ns1",
                "--conf=spark.kubernetes.sparkImage=img:1",
                "/opt/spark/kubernetes/client.jar",
                "a b",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_pass_through_arguments() -> LaunchResult<()> {
        let conf = base_conf()
            .with("spark.sql.shuffle.partitions", "8")
            .with("spark.eventLog.enabled", "true")
            .with(SparkConfKey::KUBERNETES_SERVICE_ACCOUNT_NAME, "spark");
        let args = arguments(&conf)?;
        assert_eq!(
            &args[FIXED_BLOCK_LEN..],
            &[
                "--conf=spark.eventLog.enabled=true",
                "--conf=spark.sql.shuffle.partitions=8",
                "/opt/spark/kubernetes/client.jar",
                "a b",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_non_spark_keys_are_not_forwarded() -> LaunchResult<()> {
        let conf = base_conf()
            .with("hadoop.fs.defaultFS", "hdfs://nn")
            .with("spark.sql.shuffle.partitions", "8");
        let args = arguments(&conf)?;
        assert!(args.iter().all(|x| !x.contains("hadoop.fs.defaultFS")));
        assert!(args.contains(&"--conf=spark.sql.shuffle.partitions=8".to_string()));
        Ok(())
    }

    #[test]
    fn test_pass_through_keys() {
        assert!(is_pass_through("spark.sql.shuffle.partitions"));
        assert!(!is_pass_through("hadoop.fs.defaultFS"));
        assert!(!is_pass_through(SparkConfKey::MASTER));
        assert!(!is_pass_through(SparkConfKey::KUBERNETES_NAMESPACE));
        assert!(!is_pass_through(SparkConfKey::EXECUTOR_INSTANCES));
        assert!(!is_pass_through(SparkConfKey::DRIVER_MEMORY));
    }

    #[test]
    fn test_deny_listed_keys_are_not_forwarded() -> LaunchResult<()> {
        let mut conf = base_conf();
        for key in FORWARD_DENY_LIST {
            conf.set(*key, "sentinel-value");
        }
        // the dynamic allocation toggle must be a valid boolean
        conf.set(SparkConfKey::DYNAMIC_ALLOCATION_ENABLED, "false");
        conf.set(SparkConfKey::SHUFFLE_SERVICE_ENABLED, "false");
        let args = arguments(&conf)?;
        for arg in &args {
            assert!(!arg.contains("sentinel-value"), "unexpected argument: {arg}");
            assert!(!arg.contains(SparkConfKey::MASTER), "unexpected argument: {arg}");
            assert!(!arg.contains(SparkConfKey::DEPLOY_MODE), "unexpected argument: {arg}");
            assert!(!arg.contains(SparkConfKey::APP_NAME), "unexpected argument: {arg}");
            assert!(
                !arg.contains(SparkConfKey::DYNAMIC_ALLOCATION_ENABLED),
                "unexpected argument: {arg}"
            );
            assert!(
                !arg.contains(SparkConfKey::SHUFFLE_SERVICE_ENABLED),
                "unexpected argument: {arg}"
            );
        }
        assert_eq!(
            args.iter()
                .filter(|x| x.contains(SparkConfKey::EXECUTOR_JAR))
                .collect::<Vec<_>>(),
            vec!["--conf=spark.executor.jar=app.jar"]
        );
        Ok(())
    }

    #[test]
    fn test_dynamic_allocation_arguments() -> LaunchResult<()> {
        let conf = base_conf()
            .with(SparkConfKey::DYNAMIC_ALLOCATION_ENABLED, "true")
            .with("spark.sql.shuffle.partitions", "8");
        let args = arguments(&conf)?;
        let position = |arg: &str| args.iter().position(|x| x == arg);
        let dynamic = position("--conf=spark.dynamicAllocation.enabled=true");
        let shuffle = position("--conf=spark.shuffle.service.enabled=true");
        let (Some(dynamic), Some(shuffle)) = (dynamic, shuffle) else {
            panic!("missing dynamic allocation arguments: {args:?}");
        };
        assert!(dynamic >= FIXED_BLOCK_LEN);
        assert_eq!(shuffle, dynamic + 1);
        assert_eq!(shuffle, args.len() - 3);
        assert_eq!(args[args.len() - 2], CLIENT_BOOTSTRAP_JAR);
        assert_eq!(args[args.len() - 1], "a b");
        Ok(())
    }

    #[test]
    fn test_dynamic_allocation_disabled() -> LaunchResult<()> {
        let args = arguments(&base_conf().with(SparkConfKey::DYNAMIC_ALLOCATION_ENABLED, "false"))?;
        assert!(args.iter().all(|x| !x.contains("dynamicAllocation")));
        assert!(args.iter().all(|x| !x.contains("shuffle.service")));
        Ok(())
    }
}
