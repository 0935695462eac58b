use std::convert::Infallible;
use std::sync::{Arc, LazyLock};

use kit_lazy::{Lazy, LazyMap};

use crate::{CachingResolver, Decompress, Logging, SystemLookup, Transport, TransportError, TransportOptions};

/// The decorator stack returned by [`client`].
pub type DefaultClient = Logging<Decompress<Arc<Transport>>>;

static RESOLVER: Lazy<CachingResolver, Infallible> =
    Lazy::new("dns-resolver", || Ok(CachingResolver::new(SystemLookup)));

static TRANSPORTS: LazyLock<LazyMap<TransportOptions, Transport>> = LazyLock::new(LazyMap::new);

/// The DNS cache for the current scope: an [`Overrides`](kit_lazy::Overrides)
/// value when one is installed, otherwise the process-wide cache.
pub fn shared_resolver() -> Arc<CachingResolver> {
    let Ok(resolver) = RESOLVER.get();
    resolver
}

/// The process-wide DNS cache. Transports outlive any override scope, so
/// they are always built on this one.
pub(crate) fn global_resolver() -> Arc<CachingResolver> {
    let Ok(resolver) = RESOLVER.get_global();
    resolver
}

/// The process-wide transport for exactly these options.
///
/// At most [`TransportOptions::COUNT`] transports exist; each is built on
/// first use. Callers passing equal options share connection pools.
pub fn shared(options: TransportOptions) -> Result<Arc<Transport>, TransportError> {
    TRANSPORTS.get_or_try_init(options, || Transport::new(options))
}

/// Number of transports built so far.
pub fn shared_count() -> usize {
    TRANSPORTS.len()
}

/// A logging, decompressing client over the shared transport.
pub fn client(options: TransportOptions) -> Result<DefaultClient, TransportError> {
    let transport = shared(options)?;
    Ok(Logging::new(
        Decompress::new(transport).advertise(!options.disable_compression),
    ))
}
