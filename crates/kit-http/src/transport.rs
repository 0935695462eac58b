use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use reqwest::dns::Resolve;
use tracing::debug;

use crate::{CachingResolver, RoundTrip, TransportError, TransportOptions};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const POOL_MAX_IDLE_PER_HOST: usize = 100;

/// A configured `reqwest::Client` and the options it was built from.
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    options: TransportOptions,
    dns_cache: Option<Arc<CachingResolver>>,
}

impl Transport {
    /// With `dns_cache` set, the process-wide DNS cache is installed.
    /// Scoped overrides of [`shared_resolver`](crate::shared_resolver) are
    /// not consulted.
    pub fn new(options: TransportOptions) -> Result<Self, TransportError> {
        if options.dns_cache {
            let resolver = crate::shared::global_resolver();
            let mut transport = Self::with_resolver(options, Arc::clone(&resolver))?;
            transport.dns_cache = Some(resolver);
            return Ok(transport);
        }
        Self::build(builder(options), options)
    }

    pub fn with_resolver<R: Resolve + 'static>(
        options: TransportOptions,
        resolver: Arc<R>,
    ) -> Result<Self, TransportError> {
        Self::build(builder(options).dns_resolver(resolver), options)
    }

    fn build(builder: reqwest::ClientBuilder, options: TransportOptions) -> Result<Self, TransportError> {
        let client = builder.build().map_err(TransportError::Build)?;
        debug!(?options, index = options.index(), "http transport built");
        Ok(Self {
            client,
            options,
            dns_cache: None,
        })
    }

    pub fn options(&self) -> TransportOptions {
        self.options
    }

    /// The shared DNS cache installed by [`new`](Self::new), if any.
    pub fn dns_cache(&self) -> Option<&Arc<CachingResolver>> {
        self.dns_cache.as_ref()
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("client", &self.client)
            .field("options", &self.options)
            .field("dns_cache", &self.dns_cache.is_some())
            .finish()
    }
}

fn builder(options: TransportOptions) -> reqwest::ClientBuilder {
    let idle_per_host = if options.pooled { POOL_MAX_IDLE_PER_HOST } else { 0 };
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .tcp_keepalive(TCP_KEEPALIVE)
        .pool_max_idle_per_host(idle_per_host)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .danger_accept_invalid_certs(options.insecure_tls)
        .gzip(!options.disable_compression)
}

impl RoundTrip for Transport {
    async fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let request = reqwest::Request::try_from(request)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let response = self.client.execute(request).await.map_err(TransportError::Request)?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(TransportError::Request)?;

        let mut out = Response::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
