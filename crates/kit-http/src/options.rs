use kit_env::Vars;
use kit_std::{ReadEnv, ReadFile};

const ENV_POOLED: &str = "POOLED";
const ENV_DNS_CACHE: &str = "DNS_CACHE";
const ENV_INSECURE_TLS: &str = "INSECURE_TLS";
const ENV_DISABLE_COMPRESSION: &str = "DISABLE_COMPRESSION";

/// The four independent switches that select one of the 16 shared
/// transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportOptions {
    /// Keep idle connections for reuse.
    pub pooled: bool,
    /// Resolve hostnames through the process-wide [`CachingResolver`](crate::CachingResolver).
    pub dns_cache: bool,
    /// Accept invalid TLS certificates.
    pub insecure_tls: bool,
    /// Do not request or transparently decode compressed bodies.
    pub disable_compression: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            pooled: true,
            dns_cache: false,
            insecure_tls: false,
            disable_compression: false,
        }
    }
}

impl TransportOptions {
    pub const COUNT: usize = 16;

    pub fn with_pooled(mut self, pooled: bool) -> Self {
        self.pooled = pooled;
        self
    }

    pub fn with_dns_cache(mut self, dns_cache: bool) -> Self {
        self.dns_cache = dns_cache;
        self
    }

    pub fn with_insecure_tls(mut self, insecure_tls: bool) -> Self {
        self.insecure_tls = insecure_tls;
        self
    }

    pub fn with_disable_compression(mut self, disable_compression: bool) -> Self {
        self.disable_compression = disable_compression;
        self
    }

    /// Position in the transport table, `0..16`.
    pub fn index(&self) -> usize {
        usize::from(self.pooled)
            | usize::from(self.dns_cache) << 1
            | usize::from(self.insecure_tls) << 2
            | usize::from(self.disable_compression) << 3
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then(|| Self {
            pooled: index & 1 != 0,
            dns_cache: index & 2 != 0,
            insecure_tls: index & 4 != 0,
            disable_compression: index & 8 != 0,
        })
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }

    /// Overlay `POOLED`, `DNS_CACHE`, `INSECURE_TLS` and
    /// `DISABLE_COMPRESSION` from `vars`. Invalid values are logged and
    /// ignored.
    pub fn from_env<E: ReadEnv, F: ReadFile>(self, vars: &Vars<E, F>) -> Self {
        Self {
            pooled: vars.get(ENV_POOLED).bool().unwrap_or_warn(self.pooled),
            dns_cache: vars.get(ENV_DNS_CACHE).bool().unwrap_or_warn(self.dns_cache),
            insecure_tls: vars.get(ENV_INSECURE_TLS).bool().unwrap_or_warn(self.insecure_tls),
            disable_compression: vars
                .get(ENV_DISABLE_COMPRESSION)
                .bool()
                .unwrap_or_warn(self.disable_compression),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use kit_std::InMemoryEnv;

    use super::*;

    #[test]
    fn test_default_is_pooled_only() {
        let options = TransportOptions::default();
        assert!(options.pooled);
        assert!(!options.dns_cache && !options.insecure_tls && !options.disable_compression);
    }

    #[test]
    fn test_every_combination_has_a_distinct_index() {
        let all: Vec<_> = TransportOptions::all().collect();
        assert_eq!(all.len(), TransportOptions::COUNT);

        let indices: HashSet<_> = all.iter().map(TransportOptions::index).collect();
        assert_eq!(indices.len(), TransportOptions::COUNT);
        assert!(indices.iter().all(|i| *i < TransportOptions::COUNT));

        for options in all {
            assert_eq!(TransportOptions::from_index(options.index()), Some(options));
        }
        assert_eq!(TransportOptions::from_index(16), None);
    }

    #[test]
    fn test_from_env_overlays_values() {
        let env: InMemoryEnv = [("HTTP_POOLED", "false"), ("HTTP_DNS_CACHE", "yes")]
            .into_iter()
            .collect();
        let vars = Vars::new(env).with_prefix("HTTP_");
        let options = TransportOptions::default().from_env(&vars);
        assert!(!options.pooled);
        assert!(options.dns_cache);
        assert!(!options.insecure_tls);
    }

    #[test]
    fn test_from_env_ignores_invalid_bools() {
        let env: InMemoryEnv = [("INSECURE_TLS", "sometimes")].into_iter().collect();
        let options = TransportOptions::default()
            .with_insecure_tls(false)
            .from_env(&Vars::new(env));
        assert!(!options.insecure_tls);
    }
}
