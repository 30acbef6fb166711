use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use idworker::{DEFAULT_SELLER_CODE, DEFAULT_SHORT_ID_DIGITS, SnowflakeId, SpinPolicy};

/// Provisioning for one ID worker.
///
/// The `(datacenter, worker)` pair must be unique across every process that
/// mints IDs against the same epoch; nothing here coordinates that, it is up
/// to whoever deploys the service. All values come from CLI arguments or
/// environment variables (a `.env` file is honoured).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "idworker",
    version,
    about = "Mint and decode SecondHand marketplace Snowflake IDs"
)]
pub struct CliArgs {
    /// Datacenter ID encoded into every generated ID (0-31).
    ///
    /// Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", default_value_t = 1, global = true)]
    pub datacenter_id: u64,

    /// Worker ID encoded into every generated ID (0-31).
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", default_value_t = 1, global = true)]
    pub worker_id: u64,

    /// Epoch, in milliseconds since 1970-01-01 UTC, that timestamps are
    /// measured from. Defaults to the Twitter epoch.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = 1_288_834_974_657, global = true)]
    pub epoch_ms: u64,

    /// Give up with an error after this many clock re-reads when a
    /// millisecond's sequence numbers are exhausted. Unbounded if unset.
    ///
    /// Environment variable: `SPIN_LIMIT`
    #[arg(long, env = "SPIN_LIMIT", global = true)]
    pub spin_limit: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print new IDs, one per line.
    Next {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Print new merchant order numbers, one per line.
    Order {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Business code placed between the date and the ID.
        ///
        /// Environment variable: `SELLER_CODE`
        #[arg(long, env = "SELLER_CODE", default_value = DEFAULT_SELLER_CODE)]
        seller_code: String,
    },
    /// Print new collision-checked short user ids, one per line.
    ShortId {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        #[arg(long, default_value_t = DEFAULT_SHORT_ID_DIGITS)]
        digits: u32,
    },
    /// Break an existing ID into its fields.
    Decode { id: u64 },
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub epoch: Duration,
    pub spin_policy: SpinPolicy,
    pub command: Command,
}

impl TryFrom<CliArgs> for WorkerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.datacenter_id > SnowflakeId::max_datacenter_id() {
            bail!(
                "DATACENTER_ID ({}) exceeds the datacenter ID space (max = {})",
                args.datacenter_id,
                SnowflakeId::max_datacenter_id()
            );
        }

        if args.worker_id > SnowflakeId::max_worker_id() {
            bail!(
                "WORKER_ID ({}) exceeds the worker ID space (max = {})",
                args.worker_id,
                SnowflakeId::max_worker_id()
            );
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the UNIX epoch")?;
        let epoch = Duration::from_millis(args.epoch_ms);
        if epoch > now {
            bail!("EPOCH_MS ({}) is in the future", args.epoch_ms);
        }

        match &args.command {
            Command::Next { count } | Command::Order { count, .. } | Command::ShortId { count, .. }
                if *count == 0 =>
            {
                bail!("--count must be greater than 0");
            }
            Command::Decode { id } if *id > i64::MAX as u64 => {
                bail!("{id} is not a valid ID: the top bit is never set");
            }
            _ => {}
        }

        let spin_policy = args
            .spin_limit
            .map_or(SpinPolicy::Unbounded, SpinPolicy::Bounded);

        Ok(Self {
            datacenter_id: args.datacenter_id,
            worker_id: args.worker_id,
            epoch,
            spin_policy,
            command: args.command,
        })
    }
}
