//! Build, sign and schedule a single-clause Thor transaction.
//!
//! Usage:
//!   cargo run --bin schedule-tx -- --url http://localhost:8669 --time 2012-01-05T15:04:05Z
//!
//! Options:
//!   -c, --config            YAML config file (defaults match a solo node)
//!   -u, --url               Node URL (default: http://localhost:8669)
//!   -k, --private-key       Signer key hex (or THOR_PRIVATE_KEY env)
//!       --private-key-file  Path to file with signer key hex (or THOR_PRIVATE_KEY_FILE env)
//!       --from-chain        Take chain tag and block ref from the node
//!       --immediate         Submit to the pool instead of scheduling
//!       --dry-run           Print the request body instead of sending it
//!
//! A key given directly wins over a key file; either wins over the config file.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::{path::PathBuf, str::FromStr};
use thor_schedule_client::{config::Config, prepare, Client};
use thor_schedule_types::{
    api::{parse_time, rfc3339, RawTransaction, ScheduleRequest},
    primitives::{parse_address, parse_bytes32, parse_hex},
    BlockRef, U256,
};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "schedule-tx")]
#[command(about = "Build, sign and schedule a VeChain Thor transaction")]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Thor node URL
    #[arg(short, long)]
    url: Option<String>,

    /// Signer private key hex
    #[arg(short = 'k', long, env = "THOR_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// File holding the signer private key hex
    #[arg(long, env = "THOR_PRIVATE_KEY_FILE")]
    private_key_file: Option<String>,

    /// Clause recipient
    #[arg(long)]
    to: Option<String>,

    /// Clause value in wei, decimal or 0x hex
    #[arg(long, value_parser = parse_value)]
    value: Option<U256>,

    /// Clause data hex
    #[arg(long)]
    data: Option<String>,

    #[arg(long)]
    chain_tag: Option<u8>,

    #[arg(long)]
    block_ref: Option<String>,

    /// Expiration in blocks after the block ref
    #[arg(long)]
    expiration: Option<u32>,

    #[arg(long)]
    gas_price_coef: Option<u8>,

    /// Gas limit (defaults to the intrinsic gas)
    #[arg(long)]
    gas: Option<u64>,

    #[arg(long)]
    depends_on: Option<String>,

    #[arg(long, conflicts_with = "random_nonce")]
    nonce: Option<u64>,

    #[arg(long)]
    random_nonce: bool,

    /// Release time, RFC 3339
    #[arg(short, long, value_parser = parse_release_time)]
    time: Option<DateTime<Utc>>,

    #[arg(long)]
    from_chain: bool,

    #[arg(long)]
    immediate: bool,

    #[arg(long)]
    dry_run: bool,

    /// Total attempts per request
    #[arg(long)]
    retries: Option<u32>,

    #[arg(long)]
    log_level: Option<String>,
}

fn parse_value(value: &str) -> std::result::Result<U256, String> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|err| err.to_string()),
        None => U256::from_dec_str(value).map_err(|err| err.to_string()),
    };
    parsed.map_err(|err| format!("invalid value {value}: {err}"))
}

fn parse_release_time(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_time(value).map_err(|err| err.to_string())
}

fn read_secret_file(path: &str) -> Result<String> {
    let contents = std::fs::read_to_string(path).context("Failed to read secret file")?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Secret file is empty: {path}"));
    }
    Ok(trimmed.to_string())
}

/// `None` keeps the config file's key.
fn private_key_override(args: &Args) -> Result<Option<String>> {
    if let Some(value) = &args.private_key {
        return Ok(Some(value.clone()));
    }
    if let Some(file_path) = &args.private_key_file {
        return read_secret_file(file_path).map(Some);
    }
    Ok(None)
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if let Some(key) = private_key_override(args)? {
        config.private_key = key;
    }

    if args.to.is_some() || args.value.is_some() || args.data.is_some() {
        let mut clause = config.clauses.first().cloned().unwrap_or_default();
        if let Some(to) = &args.to {
            clause.to = Some(parse_address(to).context("Invalid recipient")?);
        }
        if let Some(value) = args.value {
            clause.value = value;
        }
        if let Some(data) = &args.data {
            clause.data = parse_hex(data).context("Invalid clause data")?;
        }
        config.clauses = vec![clause];
    }

    if let Some(chain_tag) = args.chain_tag {
        config.chain_tag = chain_tag;
    }
    if let Some(block_ref) = &args.block_ref {
        config.block_ref = BlockRef::from_str(block_ref).context("Invalid block ref")?;
    }
    if let Some(expiration) = args.expiration {
        config.expiration = expiration;
    }
    if let Some(gas_price_coef) = args.gas_price_coef {
        config.gas_price_coef = gas_price_coef;
    }
    if args.gas.is_some() {
        config.gas = args.gas;
    }
    if let Some(depends_on) = &args.depends_on {
        config.depends_on = Some(parse_bytes32(depends_on).context("Invalid depends-on id")?);
    }
    if args.random_nonce {
        config.nonce = None;
    } else if args.nonce.is_some() {
        config.nonce = args.nonce;
    }
    if let Some(time) = args.time {
        config.time = time;
    }
    if let Some(retries) = args.retries {
        config.retry.max_attempts = retries;
    }
    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = build_config(&args)?;

    let level = Level::from_str(&config.log_level)
        .map_err(|_| anyhow!("Invalid log level: {}", config.log_level))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    let client = Client::new(&config.url)
        .context("Invalid node URL")?
        .with_retry_policy(config.retry_policy());
    info!(url = %client.base_url(), dry_run = args.dry_run, "schedule-tx starting");

    if args.from_chain {
        let chain_tag = client.chain_tag().await.context("Failed to fetch genesis block")?;
        let best = client.best_block().await.context("Failed to fetch best block")?;
        config.chain_tag = chain_tag;
        config.block_ref = BlockRef::from_block_id(&best.id);
        info!(chain_tag, block_ref = %config.block_ref, best = best.number, "using chain state");
    }

    let key = config.signer().context("Invalid private key")?;
    let unsigned = config.transaction().context("Failed to build transaction")?;
    let intrinsic_gas = unsigned.intrinsic_gas()?;
    info!(
        signer = ?key.address(),
        chain_tag = unsigned.body.chain_tag,
        intrinsic_gas,
        gas = unsigned.body.gas,
        nonce = unsigned.body.nonce,
        "built transaction"
    );

    let prepared = prepare(unsigned, &key).context("Failed to prepare transaction")?;
    let decoded = serde_json::to_string_pretty(&prepared.decoded)?;
    info!(raw = %prepared.raw_hex(), "decoded transaction:\n{decoded}");

    if args.dry_run {
        let body = if args.immediate {
            serde_json::to_string_pretty(&RawTransaction::new(&prepared.tx))?
        } else {
            serde_json::to_string_pretty(&ScheduleRequest::new(&prepared.tx, config.time))?
        };
        println!("{body}");
        return Ok(());
    }

    if args.immediate {
        let id = client
            .submit_transaction(&prepared.tx)
            .await
            .context("Failed to submit transaction")?;
        info!(?id, "transaction submitted");
    } else {
        let id = client
            .schedule_transaction(&prepared.tx, config.time)
            .await
            .context("Failed to schedule transaction")?;
        info!(?id, time = %rfc3339::format(&config.time), "transaction scheduled");
    }
    Ok(())
}
