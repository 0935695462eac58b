//! Shared HTTP transports and round-trip decorators.
//!
//! Four switches in [`TransportOptions`] select one of 16 process-wide
//! [`Transport`]s, each built on first use by [`shared`]. Decorators wrap
//! any [`RoundTrip`]:
//!
//! - [`Decompress`] decodes gzip, deflate, brotli and zstd bodies
//! - [`Logging`] traces each exchange with credentials redacted
//!
//! ```ignore
//! use kit_http::{RoundTripExt, TransportOptions, client};
//!
//! let client = client(TransportOptions::default().with_dns_cache(true))?;
//! let response = client.get("https://example.com/").await?;
//! ```

mod decompress;
mod dns;
mod error;
mod logging;
mod options;
mod round_trip;
mod shared;
mod transport;

#[cfg(test)]
mod testing;

pub use decompress::{DEFAULT_MAX_DECODED_BYTES, Decompress};
pub use dns::{CachingResolver, DEFAULT_DNS_TTL, LookupHost, MIN_REFRESH_INTERVAL, ResolverStats, SystemLookup};
pub use error::TransportError;
pub use logging::Logging;
pub use options::TransportOptions;
pub use round_trip::{RoundTrip, RoundTripExt};
pub use shared::{DefaultClient, client, shared, shared_count, shared_resolver};
pub use transport::Transport;
