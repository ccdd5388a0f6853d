mod options;
mod state;

use std::sync::Arc;

use fastrace::collector::SpanContext;
use fastrace::future::FutureExt;
use fastrace::Span;
use log::{error, info, warn};
pub use options::DriverLauncherOptions;
use sail_common::config::FailurePolicy;
use sail_telemetry::common::{SpanAttribute, SpanKind};
use sail_telemetry::recorder::record_error;
pub use state::{JobRecordOutcome, LaunchState, LaunchSummary};

use crate::conf::SparkConf;
use crate::control_plane::{ControlPlane, Deletion};
use crate::description::{build_driver_description, LaunchRequest};
use crate::error::{LaunchError, LaunchResult};
use crate::identity::{LaunchIdentities, NameGenerator, ResourceKind};
use crate::registry::{JobRecord, JobRegistry};
use crate::resource::{build_driver_resources, DriverResourceOptions};
use crate::secret::{lookup_secret, SecretLookup};
use crate::translator::{build_driver_arguments, LaunchParameters};

/// The scheme marker for the master address passed to the driver.
pub const KUBERNETES_MASTER_PREFIX: &str = "k8s://";

/// Launches one Spark driver pod and its service, and tears them down.
///
/// The driver and service names are generated once when the launcher is created,
/// so a launcher can start at most one driver. [`DriverLauncher::start`] takes
/// `&mut self` and fails if the launcher has already been started.
///
/// Resources are created one after another without rollback. If the service cannot
/// be created, the driver pod is left in place. [`DriverLauncher::stop`] removes
/// whatever exists and can be called in any state.
pub struct DriverLauncher {
    conf: SparkConf,
    params: LaunchParameters,
    options: DriverLauncherOptions,
    control_plane: Arc<dyn ControlPlane>,
    registry: Arc<dyn JobRegistry>,
    names: Arc<dyn NameGenerator>,
    driver_name: String,
    service_name: String,
    state: LaunchState,
}

impl DriverLauncher {
    /// Validates the launch parameters and generates the driver and service names.
    /// No remote call is made here.
    pub fn try_new(
        conf: SparkConf,
        control_plane: Arc<dyn ControlPlane>,
        registry: Arc<dyn JobRegistry>,
        names: Arc<dyn NameGenerator>,
        options: DriverLauncherOptions,
    ) -> LaunchResult<Self> {
        let params = LaunchParameters::try_from_conf(&conf)?;
        let driver_name = names.generate(ResourceKind::Driver);
        let service_name = names.generate(ResourceKind::Service);
        Ok(Self {
            conf,
            params,
            options,
            control_plane,
            registry,
            names,
            driver_name,
            service_name,
            state: LaunchState::Idle,
        })
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    pub async fn start(&mut self, request: &LaunchRequest) -> LaunchResult<LaunchSummary> {
        let span = self.root_span("DriverLauncher::start");
        let result = self
            .run(request)
            .in_span(Span::enter_with_parent("DriverLauncher::run", &span))
            .await;
        record_error(&span, &result);
        result
    }

    fn root_span(&self, name: &'static str) -> Span {
        Span::root(name, SpanContext::random()).with_properties(|| {
            [
                (SpanAttribute::SPAN_KIND, SpanKind::INTERNAL.to_string()),
                (SpanAttribute::KUBERNETES_NAMESPACE, self.params.namespace.clone()),
                (SpanAttribute::KUBERNETES_POD_NAME, self.driver_name.clone()),
                (SpanAttribute::KUBERNETES_SERVICE_NAME, self.service_name.clone()),
            ]
        })
    }

    async fn run(&mut self, request: &LaunchRequest) -> LaunchResult<LaunchSummary> {
        if self.state != LaunchState::Idle {
            return Err(LaunchError::InvalidState(format!(
                "driver {} has already been launched (state: {:?})",
                self.driver_name, self.state
            )));
        }
        let identities = LaunchIdentities {
            driver_name: self.driver_name.clone(),
            service_name: self.service_name.clone(),
            job_name: self.names.generate(ResourceKind::Job),
        };
        let description = build_driver_description(&self.conf, request)?;
        info!(
            "launching driver {} for {} ({}) in namespace {}",
            identities.driver_name, description.name, description.jar, self.params.namespace
        );

        let job_record = self.post_job_record(&identities.job_name).await?;
        self.state = LaunchState::JobRecordPosted;

        let image_pull_secret = self.resolve_image_pull_secret().await?;
        let master = format!(
            "{KUBERNETES_MASTER_PREFIX}{}",
            self.control_plane.endpoint_host()
        );
        info!("using Kubernetes master {master}");
        let args = build_driver_arguments(&self.conf, &self.params, &description, &master);
        let resources = build_driver_resources(DriverResourceOptions {
            description: &description,
            identities: &identities,
            namespace: &self.params.namespace,
            service_account_name: &self.params.service_account_name,
            image: &self.params.image,
            args,
            image_pull_secret: image_pull_secret.as_deref(),
        });

        if let Err(e) = self.control_plane.create_pod(&resources.pod).await {
            error!("failed to create driver pod {}: {e}", identities.driver_name);
            return Err(e);
        }
        self.state = LaunchState::DriverPodCreated;
        info!("created driver pod {}", identities.driver_name);

        if let Err(e) = self.control_plane.create_service(&resources.service).await {
            error!(
                "failed to create driver service {}, driver pod {} is left in place: {e}",
                identities.service_name, identities.driver_name
            );
            return Err(e);
        }
        self.state = LaunchState::ServiceCreated;
        info!("created driver service {}", identities.service_name);

        self.state = LaunchState::Running;
        Ok(LaunchSummary {
            namespace: self.params.namespace.clone(),
            identities,
            job_record,
            image_pull_secret,
            submitted_at: description.submitted_at,
        })
    }

    async fn post_job_record(&self, job_name: &str) -> LaunchResult<JobRecordOutcome> {
        let record = JobRecord::queued(
            job_name,
            self.params.executor_instances,
            &self.params.image,
        );
        match self.registry.create_record(&record).await {
            Ok(()) => {
                info!("posted job record {job_name}");
                Ok(JobRecordOutcome::Posted)
            }
            Err(e) => match self.options.job_record_failure {
                FailurePolicy::Ignore => {
                    warn!("failed to post job record {job_name}, continuing: {e}");
                    Ok(JobRecordOutcome::Failed(e.to_string()))
                }
                FailurePolicy::Abort => {
                    error!("failed to post job record {job_name}: {e}");
                    Err(e)
                }
            },
        }
    }

    /// Returns the image pull secret to reference from the driver pod.
    ///
    /// Under the ignore policy, a failed lookup is treated the same as a missing
    /// secret, so a permission or network problem silently disables the pull secret.
    async fn resolve_image_pull_secret(&self) -> LaunchResult<Option<String>> {
        let Some(name) = &self.params.image_pull_secret else {
            return Ok(None);
        };
        match lookup_secret(self.control_plane.as_ref(), name).await {
            SecretLookup::Found => Ok(Some(name.clone())),
            SecretLookup::NotConfigured | SecretLookup::NotFound => {
                info!("image pull secret {name} not found, launching without it");
                Ok(None)
            }
            SecretLookup::Failed(e) => match self.options.secret_lookup_failure {
                FailurePolicy::Ignore => {
                    warn!("failed to look up image pull secret {name}, launching without it: {e}");
                    Ok(None)
                }
                FailurePolicy::Abort => Err(LaunchError::remote(format!(
                    "failed to look up image pull secret {name}: {e}"
                ))),
            },
        }
    }

    /// Deletes the driver pod and the service, whether or not they were created.
    pub async fn stop(&mut self) -> LaunchResult<()> {
        let span = self.root_span("DriverLauncher::stop");
        let result = delete_driver_resources(
            self.control_plane.as_ref(),
            &self.driver_name,
            &self.service_name,
        )
        .in_span(Span::enter_with_parent("delete_driver_resources", &span))
        .await;
        record_error(&span, &result);
        self.state = LaunchState::Stopped;
        result
    }
}

/// Deletes the driver pod and then the service.
/// Both deletions are attempted even if the first one fails,
/// and resources that do not exist are skipped.
pub async fn delete_driver_resources(
    control_plane: &dyn ControlPlane,
    driver_name: &str,
    service_name: &str,
) -> LaunchResult<()> {
    let pod = control_plane.delete_pod(driver_name).await;
    log_deletion("driver pod", driver_name, &pod);
    let service = control_plane.delete_service(service_name).await;
    log_deletion("driver service", service_name, &service);
    pod?;
    service?;
    Ok(())
}

fn log_deletion(kind: &str, name: &str, result: &LaunchResult<Deletion>) {
    match result {
        Ok(Deletion::Deleted) => info!("deleted {kind} {name}"),
        Ok(Deletion::NotFound) => info!("{kind} {name} not found, nothing to delete"),
        Err(e) => error!("failed to delete {kind} {name}: {e}"),
    }
}
