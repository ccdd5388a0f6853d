use clap::Args;
use sail_common::config::AppConfig;
use sail_launcher::control_plane::KubernetesControlPlane;
use sail_launcher::delete_driver_resources;
use sail_launcher::translator::DEFAULT_NAMESPACE;
use sail_telemetry::telemetry::{init_telemetry, shutdown_telemetry};

#[derive(Debug, Clone, Args)]
pub struct StopArgs {
    #[arg(long, default_value = DEFAULT_NAMESPACE, help = "The namespace of the driver")]
    pub namespace: String,
    #[arg(long, help = "The name of the driver pod")]
    pub driver: String,
    #[arg(long, help = "The name of the driver service")]
    pub service: String,
}

pub fn run_stop(args: StopArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_telemetry(&config.telemetry)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let control_plane = KubernetesControlPlane::try_new(args.namespace).await?;
        delete_driver_resources(&control_plane, &args.driver, &args.service).await
    })?;

    shutdown_telemetry();

    Ok(())
}
