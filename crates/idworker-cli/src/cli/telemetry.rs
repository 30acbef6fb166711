//! Logging setup for the `idworker` binary.
//!
//! Events go to stderr through `tracing_subscriber::fmt`, leaving stdout for
//! the IDs themselves so the output can be piped. The level comes from
//! `RUST_LOG` and defaults to `info`; `RUST_LOG=idworker=trace` also shows a
//! span per generated ID.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;
    Ok(())
}
