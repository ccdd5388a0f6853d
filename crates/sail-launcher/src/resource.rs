use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, LocalObjectReference, Pod, PodSpec, ResourceRequirements,
    Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::description::DriverDescription;
use crate::identity::LaunchIdentities;

pub const DRIVER_LABEL_KEY: &str = "type";
pub const DRIVER_LABEL_VALUE: &str = "spark-driver";
pub const DRIVER_CONTAINER_NAME: &str = "spark-driver";
/// The entrypoint script shipped in the Spark image.
pub const DRIVER_ENTRYPOINT: &str = "/opt/driver.sh";
pub const DRIVER_IMAGE_PULL_POLICY: &str = "Always";
pub const DRIVER_UI_PORT_NAME: &str = "spark-ui";
pub const DRIVER_UI_PORT: i32 = 4040;
pub const DRIVER_SERVICE_TYPE: &str = "LoadBalancer";

/// Environment variables passed to the driver container.
pub struct DriverEnv;

impl DriverEnv {
    pub const JOB_RESOURCE_NAME: &'static str = "SPARK_JOB_RESOURCE_NAME";
    pub const IMAGE_PULL_SECRET: &'static str = "SPARK_IMAGE_PULL_SECRET";
    pub const DRIVER_CLASSPATH: &'static str = "SPARK_DRIVER_CLASSPATH";
    pub const DRIVER_LIBRARY_PATH: &'static str = "SPARK_DRIVER_LIBRARY_PATH";
    pub const DRIVER_JAVA_OPTS: &'static str = "SPARK_DRIVER_JAVA_OPTS";
}

const PATH_SEPARATOR: &str = ":";

#[derive(Debug, Clone)]
pub struct DriverResourceOptions<'a> {
    pub description: &'a DriverDescription,
    pub identities: &'a LaunchIdentities,
    pub namespace: &'a str,
    pub service_account_name: &'a str,
    pub image: &'a str,
    pub args: Vec<String>,
    /// The image pull secret, set only if the secret is known to exist.
    pub image_pull_secret: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverResources {
    pub pod: Pod,
    pub service: Service,
}

/// The labels shared by the driver pod and service.
/// The service selects the pod with the same labels.
pub fn driver_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(
        DRIVER_LABEL_KEY.to_string(),
        DRIVER_LABEL_VALUE.to_string(),
    )])
}

pub fn build_driver_resources(options: DriverResourceOptions<'_>) -> DriverResources {
    let labels = driver_labels();
    DriverResources {
        pod: build_driver_pod(&options, &labels),
        service: build_driver_service(&options, &labels),
    }
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}

fn build_driver_pod(options: &DriverResourceOptions<'_>, labels: &BTreeMap<String, String>) -> Pod {
    let description = options.description;
    let mut env = vec![env_var(
        DriverEnv::JOB_RESOURCE_NAME,
        &options.identities.job_name,
    )];
    if let Some(secret) = options.image_pull_secret {
        env.push(env_var(DriverEnv::IMAGE_PULL_SECRET, secret));
    }
    let command = &description.command;
    for (name, values, separator) in [
        (
            DriverEnv::DRIVER_CLASSPATH,
            &command.class_path_entries,
            PATH_SEPARATOR,
        ),
        (
            DriverEnv::DRIVER_LIBRARY_PATH,
            &command.library_path_entries,
            PATH_SEPARATOR,
        ),
        (DriverEnv::DRIVER_JAVA_OPTS, &command.java_options, " "),
    ] {
        if !values.is_empty() {
            env.push(env_var(name, &values.join(separator)));
        }
    }
    let requests = BTreeMap::from([
        ("cpu".to_string(), Quantity(description.cores.to_string())),
        (
            "memory".to_string(),
            Quantity(format!("{}Mi", description.memory_mb)),
        ),
    ]);
    let restart_policy = if description.supervise {
        "OnFailure"
    } else {
        "Never"
    };
    Pod {
        metadata: ObjectMeta {
            name: Some(options.identities.driver_name.clone()),
            namespace: Some(options.namespace.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            restart_policy: Some(restart_policy.to_string()),
            service_account_name: Some(options.service_account_name.to_string()),
            containers: vec![Container {
                name: DRIVER_CONTAINER_NAME.to_string(),
                image: Some(options.image.to_string()),
                image_pull_policy: Some(DRIVER_IMAGE_PULL_POLICY.to_string()),
                command: Some(vec![DRIVER_ENTRYPOINT.to_string()]),
                args: Some(options.args.clone()),
                env: Some(env),
                ports: Some(vec![ContainerPort {
                    name: Some(DRIVER_UI_PORT_NAME.to_string()),
                    container_port: DRIVER_UI_PORT,
                    ..Default::default()
                }]),
                resources: Some(ResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            image_pull_secrets: options.image_pull_secret.map(|name| {
                vec![LocalObjectReference {
                    name: name.to_string(),
                }]
            }),
            ..Default::default()
        }),
        status: None,
    }
}

fn build_driver_service(
    options: &DriverResourceOptions<'_>,
    labels: &BTreeMap<String, String>,
) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(options.identities.service_name.clone()),
            namespace: Some(options.namespace.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some(DRIVER_SERVICE_TYPE.to_string()),
            selector: Some(labels.clone()),
            ports: Some(vec![ServicePort {
                name: Some(DRIVER_UI_PORT_NAME.to_string()),
                port: DRIVER_UI_PORT,
                target_port: Some(IntOrString::Int(DRIVER_UI_PORT)),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    }
}
