//! `kit-fetch`: fetch a batch of URLs through a worker pool and the shared
//! HTTP transports, printing one result per URL in input order.

mod config;
mod fetch;
mod signal;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use kit_cli::{Banner, PromptError, TerminalPrompt};
use kit_env::Vars;
use kit_pool::WorkerPool;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Args, FetchConfig};

const EXIT_INTERRUPTED: u8 = 130;

fn init_logger() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn banner(config: &FetchConfig) -> Banner {
    let transport = config.transport;
    Banner::new("kit-fetch")
        .version(env!("CARGO_PKG_VERSION"))
        .line(format!(
            "{} urls, {} workers, timeout {:?}",
            config.urls.len(),
            config.pool.max_workers,
            config.timeout
        ))
        .line(format!(
            "pooled={} dns_cache={} insecure={} compression={}",
            transport.pooled,
            transport.dns_cache,
            transport.insecure_tls,
            !transport.disable_compression
        ))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logger();

    let config = config::from_args(Args::parse(), &Vars::system())?;
    if config.banner {
        banner(&config).print();
    }
    if config.urls.is_empty() {
        bail!("no URLs given");
    }

    let count = config.urls.len();
    let proceed = match fetch::confirm_batch(
        &TerminalPrompt,
        count,
        config.assume_yes,
        TerminalPrompt::is_interactive(),
    ) {
        Err(PromptError::NotInteractive) => {
            bail!("refusing to fetch {count} URLs without --yes outside a terminal")
        }
        other => other.context("confirmation failed")?,
    };
    if !proceed {
        warn!(count, "fetch cancelled");
        return Ok(ExitCode::FAILURE);
    }

    let pool = WorkerPool::new(config.pool.clone())?;
    let client = Arc::new(kit_http::client(config.transport)?);

    let outcome = tokio::select! {
        results = fetch::run(&pool, client, config.urls, config.timeout) => Some(results),
        _ = signal::shutdown_signal() => None,
    };

    let Some(results) = outcome else {
        warn!("interrupted, abandoning in-flight fetches");
        pool.stop().await;
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    };
    let results = results?;
    pool.stop_and_wait().await;

    let output = if config.json {
        fetch::render_json(&results)? + "\n"
    } else {
        fetch::render_lines(&results)
    };
    std::io::stdout().lock().write_all(output.as_bytes())?;

    let failed = results.iter().filter(|r| r.is_failure()).count();
    info!(total = results.len(), failed, "fetch finished");
    if failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
