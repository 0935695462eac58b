use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::overrides::{LazyId, Overridable, Overrides};

enum Init<T, E> {
    Fn(fn() -> Result<T, E>),
    Boxed(Box<dyn Fn() -> Result<T, E> + Send + Sync>),
}

impl<T, E> Init<T, E> {
    fn call(&self) -> Result<T, E> {
        match self {
            Self::Fn(f) => f(),
            Self::Boxed(f) => f(),
        }
    }
}

/// A value initialized on first access and cached for the life of the
/// process.
///
/// ```ignore
/// static CONFIG: Lazy<Config, EnvError> = Lazy::new("config", Config::from_env);
///
/// let config = CONFIG.get()?;
/// ```
///
/// Failed initializations are not cached; the next [`get`](Self::get)
/// retries. Concurrent first callers block until one initializer finishes.
pub struct Lazy<T, E> {
    name: &'static str,
    id: LazyId,
    cell: OnceCell<Arc<T>>,
    init: Init<T, E>,
}

impl<T, E> Lazy<T, E> {
    pub const fn new(name: &'static str, init: fn() -> Result<T, E>) -> Self {
        Self {
            name,
            id: LazyId::new(),
            cell: OnceCell::new(),
            init: Init::Fn(init),
        }
    }

    pub fn from_fn(name: &'static str, init: impl Fn() -> Result<T, E> + Send + Sync + 'static) -> Self {
        Self {
            name,
            id: LazyId::new(),
            cell: OnceCell::new(),
            init: Init::Boxed(Box::new(init)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The global value if it has already been initialized. Never runs the
    /// initializer and ignores overrides.
    pub fn peek(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

impl<T, E> Lazy<T, E>
where
    T: Send + Sync + 'static,
    E: fmt::Display,
{
    pub fn get(&self) -> Result<Arc<T>, E> {
        if let Some(value) = Overrides::lookup::<T>(self.id.get()) {
            return Ok(value);
        }
        self.global()
    }

    /// Like [`get`](Self::get) but consults `overrides` before any scope.
    pub fn get_in(&self, overrides: &Overrides) -> Result<Arc<T>, E> {
        if let Some(value) = overrides.get::<T>(self.id.get()) {
            return Ok(value);
        }
        self.get()
    }

    /// The process-wide value, ignoring every override.
    pub fn get_global(&self) -> Result<Arc<T>, E> {
        self.global()
    }

    fn global(&self) -> Result<Arc<T>, E> {
        self.cell
            .get_or_try_init(|| match self.init.call() {
                Ok(value) => {
                    debug!(name = self.name, "lazy value initialized");
                    Ok(Arc::new(value))
                }
                Err(e) => {
                    warn!(name = self.name, error = %e, "lazy initialization failed");
                    Err(e)
                }
            })
            .cloned()
    }
}

impl<T, E> Overridable<T> for Lazy<T, E> {
    fn override_id(&self) -> u64 {
        self.id.get()
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Lazy<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("name", &self.name)
            .field("value", &self.cell.get())
            .finish()
    }
}
