#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::commands::run;
use cli::config::{CliArgs, WorkerConfig};
use cli::telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = WorkerConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&config, &mut out)
}

fn log_startup_info(config: &WorkerConfig) {
    if cfg!(debug_assertions) {
        tracing::debug!("Starting ID worker with full config: {:#?}", config);
    } else {
        tracing::debug!(
            "Starting ID worker {}/{} with epoch {} ms",
            config.datacenter_id,
            config.worker_id,
            config.epoch.as_millis()
        );
    }
}
