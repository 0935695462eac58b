use std::fmt::{self, Display};
use std::ops::RangeBounds;
use std::path::PathBuf;

use tracing::warn;

use crate::EnvError;

/// Where a [`Reader`]'s value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Read directly from the environment variable.
    Env,
    /// Read from the file named by a `{NAME}_FILE` variable.
    File(PathBuf),
    /// Supplied by [`Reader::default`] or [`Reader::default_with`].
    Default,
    /// Nothing supplied a value.
    Missing,
}

impl Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env => f.write_str("env"),
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Default => f.write_str("default"),
            Self::Missing => f.write_str("missing"),
        }
    }
}

/// A resolved environment value together with its presence and error state.
///
/// Readers are produced by [`Lookup`](crate::Lookup) terminals and refined
/// with chainable options before being consumed by [`get`](Self::get),
/// [`optional`](Self::optional) or [`unwrap_or_warn`](Self::unwrap_or_warn).
///
/// Once a reader carries an error, every option is a no-op and the error
/// surfaces at the terminal.
///
/// ```ignore
/// let port = vars.get("PORT").parse::<u16>().default(8080).in_range(1..).get()?;
/// ```
#[derive(Debug)]
#[must_use = "a Reader does nothing until consumed with get, optional or unwrap_or_warn"]
pub struct Reader<T> {
    name: String,
    value: Option<T>,
    origin: Origin,
    error: Option<EnvError>,
}

impl<T> Reader<T> {
    pub(crate) fn found(name: impl Into<String>, value: T, origin: Origin) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            origin,
            error: None,
        }
    }

    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            origin: Origin::Missing,
            error: None,
        }
    }

    pub(crate) fn failed(name: impl Into<String>, origin: Origin, error: EnvError) -> Self {
        Self {
            name: name.into(),
            value: None,
            origin,
            error: Some(error),
        }
    }

    /// Fill a missing value. Errors are never masked.
    pub fn default(self, value: T) -> Self {
        self.default_with(|| value)
    }

    pub fn default_with(mut self, f: impl FnOnce() -> T) -> Self {
        if self.value.is_none() && self.error.is_none() {
            self.value = Some(f());
            self.origin = Origin::Default;
        }
        self
    }

    /// Reject a present value. The validator does not run for missing or
    /// already failed readers.
    pub fn validate<R: Display>(mut self, f: impl FnOnce(&T) -> Result<(), R>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Some(value) = &self.value
            && let Err(reason) = f(value)
        {
            self.error = Some(EnvError::Invalid {
                name: self.name.clone(),
                reason: reason.to_string(),
            });
            self.value = None;
        }
        self
    }

    pub fn in_range<B>(self, range: B) -> Self
    where
        T: PartialOrd + fmt::Debug,
        B: RangeBounds<T> + fmt::Debug,
    {
        self.validate(|value| {
            if range.contains(value) {
                Ok(())
            } else {
                Err(format!("{value:?} is outside {range:?}"))
            }
        })
    }

    /// Use `other` when this reader is missing. A reader that failed keeps
    /// its error.
    pub fn fallback(self, other: Reader<T>) -> Self {
        if self.is_missing() { other } else { self }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reader<U> {
        Reader {
            name: self.name,
            value: self.value.map(f),
            origin: self.origin,
            error: self.error,
        }
    }

    pub(crate) fn parse_with<U, E: Display>(self, f: impl FnOnce(&T) -> Result<U, E>) -> Reader<U> {
        let Reader {
            name,
            value,
            origin,
            error,
        } = self;
        match (value, error) {
            (_, Some(error)) => Reader::failed(name, origin, error),
            (Some(value), None) => match f(&value) {
                Ok(parsed) => Reader::found(name, parsed, origin),
                Err(e) => {
                    let error = EnvError::parse_error::<U>(name.clone(), e);
                    Reader::failed(name, origin, error)
                }
            },
            (None, None) => Reader::missing(name),
        }
    }

    /// The value, or [`EnvError::Missing`] if nothing supplied one.
    pub fn get(self) -> Result<T, EnvError> {
        match (self.value, self.error) {
            (_, Some(error)) => Err(error),
            (Some(value), None) => Ok(value),
            (None, None) => Err(EnvError::missing(self.name)),
        }
    }

    pub fn optional(self) -> Result<Option<T>, EnvError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }

    /// Log a warning on error and return `default` on error or absence.
    pub fn unwrap_or_warn(self, default: T) -> T
    where
        T: fmt::Debug,
    {
        match (self.value, self.error) {
            (_, Some(error)) => {
                warn!(name = %self.name, error = %error, default = ?default, "invalid environment value, using default");
                default
            }
            (Some(value), None) => value,
            (None, None) => default,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    fn is_missing(&self) -> bool {
        self.value.is_none() && self.error.is_none()
    }

    pub fn error(&self) -> Option<&EnvError> {
        self.error.as_ref()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The variable that supplied the value, or the primary name when
    /// nothing did.
    pub fn name(&self) -> &str {
        &self.name
    }
}
