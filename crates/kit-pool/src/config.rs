use std::num::NonZeroUsize;

use kit_env::Vars;
use kit_std::{ReadEnv, ReadFile};

use crate::PoolError;

pub const DEFAULT_CAPACITY: usize = 1024;
const DEFAULT_NAME: &str = "worker-pool";

const ENV_MAX_WORKERS: &str = "MAX_WORKERS";
const ENV_QUEUE_CAPACITY: &str = "QUEUE_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Used as the `pool` field on every log line.
    pub name: String,
    pub max_workers: usize,
    /// Number of queued tasks before `submit` waits.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            max_workers: default_workers(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl PoolConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Reads `{prefix}MAX_WORKERS` and `{prefix}QUEUE_CAPACITY` on top of the
    /// defaults. Invalid or zero values are logged and ignored.
    pub fn from_env<E: ReadEnv, F: ReadFile>(self, vars: &Vars<E, F>, prefix: &str) -> Self {
        let vars = vars.scoped(prefix);
        let max_workers = vars
            .get(ENV_MAX_WORKERS)
            .parse::<usize>()
            .in_range(1..)
            .unwrap_or_warn(self.max_workers);
        let capacity = vars
            .get(ENV_QUEUE_CAPACITY)
            .parse::<usize>()
            .in_range(1..)
            .unwrap_or_warn(self.capacity);
        Self {
            max_workers,
            capacity,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_workers == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "max_workers must be at least 1".to_string(),
            });
        }
        if self.capacity == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
