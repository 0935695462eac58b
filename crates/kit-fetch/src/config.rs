use std::time::Duration;

use clap::Parser;
use kit_env::Vars;
use kit_http::TransportOptions;
use kit_pool::{PoolConfig, PoolError};
use kit_std::{ReadEnv, ReadFile};

pub const ENV_PREFIX: &str = "FETCH_";
const ENV_TIMEOUT: &str = "TIMEOUT";
const ENV_JSON: &str = "JSON";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_NAME: &str = "fetch";

#[derive(Parser, Debug, Default)]
#[command(name = "kit-fetch", version)]
#[command(about = "Fetch URLs concurrently and report status, size and latency", long_about = None)]
pub struct Args {
    /// URLs to fetch, reported in the order given
    pub urls: Vec<String>,

    /// Number of concurrent workers [env: FETCH_MAX_WORKERS]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Do not keep idle connections for reuse [env: FETCH_POOLED=false]
    #[arg(long)]
    pub no_pool: bool,

    /// Cache DNS answers for the life of the process [env: FETCH_DNS_CACHE]
    #[arg(long)]
    pub dns_cache: bool,

    /// Accept invalid TLS certificates [env: FETCH_INSECURE_TLS]
    #[arg(long)]
    pub insecure: bool,

    /// Neither request nor decode compressed bodies [env: FETCH_DISABLE_COMPRESSION]
    #[arg(long)]
    pub no_compression: bool,

    /// Per-request timeout, e.g. `10s` or `1m30s` [env: FETCH_TIMEOUT]
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Skip the confirmation asked for large batches
    #[arg(short, long)]
    pub yes: bool,

    /// Do not print the startup banner
    #[arg(long)]
    pub no_banner: bool,

    /// Print results as a JSON array [env: FETCH_JSON]
    #[arg(long)]
    pub json: bool,
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    match kit_env::parse_duration(raw) {
        Ok(timeout) if timeout.is_zero() => Err("must be positive".to_string()),
        Ok(timeout) => Ok(timeout),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub urls: Vec<String>,
    pub pool: PoolConfig,
    pub transport: TransportOptions,
    pub timeout: Duration,
    pub assume_yes: bool,
    pub banner: bool,
    pub json: bool,
}

/// Flags win over `FETCH_*` variables, which win over defaults.
pub fn from_args<E: ReadEnv, F: ReadFile>(args: Args, vars: &Vars<E, F>) -> Result<FetchConfig, PoolError> {
    let vars = vars.scoped(ENV_PREFIX);

    let mut pool = PoolConfig::new(POOL_NAME).from_env(&vars, "");
    if let Some(workers) = args.workers {
        pool = pool.with_max_workers(workers);
    }
    pool.validate()?;

    let mut transport = TransportOptions::default().from_env(&vars);
    if args.no_pool {
        transport.pooled = false;
    }
    if args.dns_cache {
        transport.dns_cache = true;
    }
    if args.insecure {
        transport.insecure_tls = true;
    }
    if args.no_compression {
        transport.disable_compression = true;
    }

    let timeout = match args.timeout {
        Some(timeout) => timeout,
        None => vars
            .get(ENV_TIMEOUT)
            .duration()
            .validate(|d| if d.is_zero() { Err("must be positive") } else { Ok(()) })
            .unwrap_or_warn(DEFAULT_TIMEOUT),
    };

    let json = args.json || vars.get(ENV_JSON).bool().unwrap_or_warn(false);

    Ok(FetchConfig {
        urls: args.urls,
        pool,
        transport,
        timeout,
        assume_yes: args.yes,
        banner: !args.no_banner,
        json,
    })
}
