use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use kit_std::{GetElapsed, GetNow, SystemClock};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_DNS_TTL: Duration = Duration::from_secs(300);
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Hostname to IP resolution.
pub trait LookupHost: Send + Sync + 'static {
    fn lookup(&self, host: &str) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send;
}

/// Resolves through `tokio::net::lookup_host`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl LookupHost for SystemLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub hits: u64,
    pub misses: u64,
}

struct Entry<I> {
    addrs: Vec<IpAddr>,
    resolved_at: I,
    used: bool,
}

struct Inner<L, C: GetNow> {
    lookup: L,
    clock: C,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<C::Instant>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Caching DNS resolver usable as a `reqwest` resolver.
///
/// Fresh entries are served without a lookup. When a lookup fails and a
/// stale entry exists, the stale addresses are served instead.
pub struct CachingResolver<L = SystemLookup, C: GetNow = SystemClock> {
    inner: Arc<Inner<L, C>>,
}

impl<L, C: GetNow> Clone for CachingResolver<L, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: LookupHost> CachingResolver<L, SystemClock> {
    pub fn new(lookup: L) -> Self {
        Self::with_clock(lookup, SystemClock)
    }
}

impl<L, C> CachingResolver<L, C>
where
    L: LookupHost,
    C: GetNow + GetElapsed + Send + Sync + 'static,
{
    pub fn with_clock(lookup: L, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                lookup,
                clock,
                ttl: DEFAULT_DNS_TTL,
                entries: Mutex::new(HashMap::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// Must be called before the resolver is cloned or shared.
    pub fn with_ttl(self, ttl: Duration) -> Self {
        match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                inner.ttl = ttl;
                Self {
                    inner: Arc::new(inner),
                }
            }
            Err(inner) => {
                warn!("resolver already shared, ttl unchanged");
                Self { inner }
            }
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry<C::Instant>>> {
        self.inner.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn lookup_ip(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        {
            let mut entries = self.entries();
            if let Some(entry) = entries.get_mut(host)
                && self.inner.clock.elapsed(entry.resolved_at) < self.inner.ttl
            {
                entry.used = true;
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(entry.addrs.clone());
            }
        }

        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        match self.fresh_lookup(host).await {
            Ok(addrs) => {
                self.entries().insert(
                    host.to_string(),
                    Entry {
                        addrs: addrs.clone(),
                        resolved_at: self.inner.clock.now(),
                        used: true,
                    },
                );
                Ok(addrs)
            }
            Err(e) => {
                let mut entries = self.entries();
                match entries.get_mut(host) {
                    Some(stale) => {
                        warn!(host, error = %e, "dns lookup failed, serving stale entry");
                        stale.used = true;
                        Ok(stale.addrs.clone())
                    }
                    None => Err(e),
                }
            }
        }
    }

    async fn fresh_lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = self.inner.lookup.lookup(host).await?;
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses found for {host}"),
            ));
        }
        Ok(addrs)
    }

    /// Re-resolve every cached host. With `clear_unused`, hosts not used
    /// since the previous refresh are dropped instead.
    pub async fn refresh(&self, clear_unused: bool) {
        let hosts: Vec<(String, bool)> = self
            .entries()
            .iter()
            .map(|(host, entry)| (host.clone(), entry.used))
            .collect();

        for (host, used) in hosts {
            if clear_unused && !used {
                debug!(host = %host, "dropping unused dns entry");
                self.entries().remove(&host);
                continue;
            }
            match self.fresh_lookup(&host).await {
                Ok(addrs) => {
                    let now = self.inner.clock.now();
                    if let Some(entry) = self.entries().get_mut(&host) {
                        entry.addrs = addrs;
                        entry.resolved_at = now;
                        entry.used = !clear_unused;
                    }
                }
                Err(e) => {
                    warn!(host = %host, error = %e, "dns refresh failed, keeping cached entry");
                    if clear_unused && let Some(entry) = self.entries().get_mut(&host) {
                        entry.used = false;
                    }
                }
            }
        }
    }

    /// Refresh every `interval` on the current tokio runtime. Intervals
    /// shorter than [`MIN_REFRESH_INTERVAL`] are raised to it.
    pub fn spawn_refresh(&self, interval: Duration, clear_unused: bool) -> JoinHandle<()> {
        if interval < MIN_REFRESH_INTERVAL {
            warn!(?interval, min = ?MIN_REFRESH_INTERVAL, "dns refresh interval too short, clamping");
        }
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        let resolver = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                resolver.refresh(clear_unused).await;
            }
        })
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl<L, C> Resolve for CachingResolver<L, C>
where
    L: LookupHost,
    C: GetNow + GetElapsed + Send + Sync + 'static,
{
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            match resolver.lookup_ip(name.as_str()).await {
                Ok(ips) => {
                    let addrs: Addrs = Box::new(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
                    Ok(addrs)
                }
                Err(e) => Err(Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
            }
        })
    }
}
