use clap::{Parser, Subcommand};

use crate::driver::{run_launch, run_stop, LaunchArgs, StopArgs};

#[derive(Parser)]
#[command(version, name = "sail-launch")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Launch a Spark driver and its service on Kubernetes")]
    Launch(LaunchArgs),
    #[command(about = "Delete the driver pod and service of a previous launch")]
    Stop(StopArgs),
}

pub fn main(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_from(args);

    match cli.command {
        Command::Launch(args) => run_launch(args),
        Command::Stop(args) => run_stop(args),
    }
}
