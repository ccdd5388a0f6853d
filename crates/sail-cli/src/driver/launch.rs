use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use log::info;
use sail_common::config::{load_properties, AppConfig};
use sail_common::error::CommonResult;
use sail_launcher::conf::SparkConf;
use sail_launcher::control_plane::{infer_client, KubernetesControlPlane};
use sail_launcher::description::LaunchRequest;
use sail_launcher::error::LaunchResult;
use sail_launcher::identity::RandomNameGenerator;
use sail_launcher::registry::{DisabledJobRegistry, JobRegistry, KubernetesJobRegistry};
use sail_launcher::translator::LaunchParameters;
use sail_launcher::{DriverLauncher, LaunchSummary};
use sail_telemetry::telemetry::{init_telemetry, shutdown_telemetry};

#[derive(Debug, Clone, Args)]
pub struct LaunchArgs {
    #[arg(long, value_name = "PATH", help = "A Spark properties file to load first")]
    pub properties_file: Option<PathBuf>,
    #[arg(
        long = "conf",
        value_name = "KEY=VALUE",
        value_parser = parse_conf_entry,
        help = "A Spark property that overrides the properties file"
    )]
    pub conf: Vec<(String, String)>,
    #[arg(long = "class", value_name = "MAIN", help = "The main class of the application")]
    pub main_class: String,
    #[arg(help = "The application jar")]
    pub jar: String,
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        help = "The arguments passed to the main class"
    )]
    pub args: Vec<String>,
}

fn parse_conf_entry(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got: {s}")),
    }
}

fn build_conf(args: &LaunchArgs) -> CommonResult<SparkConf> {
    let mut conf = SparkConf::new();
    if let Some(path) = &args.properties_file {
        info!("loading Spark properties from {}", path.display());
        conf.extend(load_properties(path)?);
    }
    conf.extend(args.conf.iter().cloned());
    Ok(conf)
}

async fn launch(
    config: &AppConfig,
    conf: SparkConf,
    request: LaunchRequest,
) -> LaunchResult<LaunchSummary> {
    // Validate before connecting so that configuration errors need no cluster access.
    let params = LaunchParameters::try_from_conf(&conf)?;
    let (client, host) = infer_client().await?;
    let control_plane = Arc::new(KubernetesControlPlane::with_client(
        client.clone(),
        &params.namespace,
        host,
    ));
    let registry: Arc<dyn JobRegistry> = if config.job_registry.enabled {
        Arc::new(KubernetesJobRegistry::new(
            client,
            &params.namespace,
            &config.job_registry,
        ))
    } else {
        Arc::new(DisabledJobRegistry)
    };
    let mut launcher = DriverLauncher::try_new(
        conf,
        control_plane,
        registry,
        Arc::new(RandomNameGenerator::new()),
        (&config.launch).into(),
    )?;
    launcher.start(&request).await
}

pub fn run_launch(args: LaunchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_telemetry(&config.telemetry)?;

    let conf = build_conf(&args)?;
    let request = LaunchRequest::new(args.jar, args.main_class, args.args);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(launch(&config, conf, request))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    shutdown_telemetry();

    Ok(())
}
