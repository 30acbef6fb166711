use std::io::Write;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat};
use idworker::{LockIdWorker, OrderNumberFormatter, ShortIdIssuer, SnowflakeId, SystemClock};

use super::config::{Command, WorkerConfig};

/// Runs the configured command, writing one result per line to `out`.
pub fn run(config: &WorkerConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Next { count } => {
            let generator = build_generator(config)?;
            for _ in 0..*count {
                writeln!(out, "{}", generator.next_id()?)?;
            }
        }
        Command::Order { count, seller_code } => {
            let formatter =
                OrderNumberFormatter::with_seller_code(build_generator(config)?, seller_code.as_str())?;
            for _ in 0..*count {
                writeln!(out, "{}", formatter.next_order_number()?)?;
            }
        }
        Command::ShortId { count, digits } => {
            let issuer = ShortIdIssuer::with_digits(build_generator(config)?, *digits)?;
            for _ in 0..*count {
                writeln!(out, "{}", issuer.issue()?)?;
            }
        }
        Command::Decode { id } => decode(config, SnowflakeId::from_raw(*id), out)?,
    }
    Ok(())
}

fn build_generator(config: &WorkerConfig) -> anyhow::Result<LockIdWorker<SystemClock>> {
    let clock = SystemClock::with_epoch(config.epoch).context("invalid EPOCH_MS")?;
    let generator = LockIdWorker::new(config.datacenter_id, config.worker_id, clock)
        .context("failed to create ID worker")?
        .with_spin_policy(config.spin_policy);
    tracing::debug!(
        datacenter_id = generator.datacenter_id(),
        worker_id = generator.worker_id(),
        "ID worker ready"
    );
    Ok(generator)
}

fn decode(config: &WorkerConfig, id: SnowflakeId, out: &mut impl Write) -> anyhow::Result<()> {
    let millis = id.timestamp_millis(config.epoch);
    let issued_at = i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(
            || "out of range".to_owned(),
            |at| at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

    writeln!(out, "id:            {id}")?;
    writeln!(out, "timestamp:     {} ({issued_at})", id.timestamp())?;
    writeln!(out, "datacenter_id: {}", id.datacenter_id())?;
    writeln!(out, "worker_id:     {}", id.worker_id())?;
    writeln!(out, "sequence:      {}", id.sequence())?;
    Ok(())
}
