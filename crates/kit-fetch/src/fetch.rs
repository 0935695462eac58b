use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use kit_cli::{ConfirmPrompt, PromptConfirm, PromptError};
use kit_http::{RoundTrip, RoundTripExt};
use kit_pool::WorkerPool;
use kit_std::{GetElapsed, GetNow, SystemClock};
use serde::Serialize;
use tracing::{debug, warn};

/// Batches larger than this ask before fetching unless `--yes` is given.
pub const CONFIRM_THRESHOLD: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub bytes: usize,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResult {
    /// A transport error or a 4xx/5xx status.
    pub fn is_failure(&self) -> bool {
        self.error.is_some() || self.status.is_none_or(|status| status >= 400)
    }
}

/// Whether to go ahead with a batch of `count` URLs.
///
/// Small batches and `assume_yes` never ask. Outside a terminal a large
/// batch is refused rather than silently fetched.
pub fn confirm_batch<P: PromptConfirm>(
    prompt: &P,
    count: usize,
    assume_yes: bool,
    interactive: bool,
) -> Result<bool, PromptError> {
    if assume_yes || count <= CONFIRM_THRESHOLD {
        return Ok(true);
    }
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    prompt.confirm(&ConfirmPrompt::new(format!("Fetch {count} URLs?")))
}

pub async fn fetch_one<C: RoundTrip>(client: &C, url: String, timeout: Duration) -> FetchResult {
    let start = SystemClock.now();
    let outcome = tokio::time::timeout(timeout, client.get(&url)).await;
    let elapsed_ms = SystemClock.elapsed(start).as_millis() as u64;

    match outcome {
        Ok(Ok(response)) => {
            debug!(url = %url, status = response.status().as_u16(), "fetched");
            FetchResult {
                status: Some(response.status().as_u16()),
                bytes: response.body().len(),
                elapsed_ms,
                error: None,
                url,
            }
        }
        Ok(Err(e)) => {
            warn!(url = %url, error = %e, "fetch failed");
            FetchResult {
                status: None,
                bytes: 0,
                elapsed_ms,
                error: Some(e.to_string()),
                url,
            }
        }
        Err(_) => {
            warn!(url = %url, timeout_ms = timeout.as_millis() as u64, "fetch timed out");
            FetchResult {
                status: None,
                bytes: 0,
                elapsed_ms,
                error: Some(format!("timed out after {timeout:?}")),
                url,
            }
        }
    }
}

/// Fetch every URL on `pool`. Results come back in input order.
pub async fn run<C>(
    pool: &WorkerPool,
    client: Arc<C>,
    urls: Vec<String>,
    timeout: Duration,
) -> anyhow::Result<Vec<FetchResult>>
where
    C: RoundTrip + 'static,
{
    let mut group = pool.group();
    for url in urls {
        let client = Arc::clone(&client);
        group
            .submit(async move { fetch_one(client.as_ref(), url, timeout).await })
            .await?;
    }
    Ok(group.wait().await?)
}

/// One `status bytes elapsed url` line per result.
pub fn render_lines(results: &[FetchResult]) -> String {
    let mut out = String::new();
    for result in results {
        let status = result
            .status
            .map_or_else(|| "ERR".to_string(), |status| status.to_string());
        let _ = write!(
            out,
            "{status:>3} {:>9} {:>7}ms {}",
            result.bytes, result.elapsed_ms, result.url
        );
        if let Some(error) = &result.error {
            let _ = write!(out, " ({error})");
        }
        out.push('\n');
    }
    out
}

pub fn render_json(results: &[FetchResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}
