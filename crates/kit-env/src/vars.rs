use std::env::VarError;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use kit_std::{ReadEnv, ReadFile, SystemEnv, SystemFs};
use tracing::debug;

use crate::parse::{parse_bool, parse_duration};
use crate::{EnvError, Origin, Reader};

/// Entry point for reading configuration from the environment.
///
/// Generic over [`ReadEnv`] and [`ReadFile`] so tests can swap in
/// `InMemoryEnv` and `MemFs`.
#[derive(Debug, Clone, Default)]
pub struct Vars<E, F = SystemFs> {
    env: E,
    fs: F,
    prefix: String,
}

impl<E: ReadEnv> Vars<E, SystemFs> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            fs: SystemFs,
            prefix: String::new(),
        }
    }
}

impl Vars<SystemEnv, SystemFs> {
    pub fn system() -> Self {
        Self::new(SystemEnv)
    }
}

impl<E, F> Vars<E, F> {
    pub fn with_fs<G>(self, fs: G) -> Vars<E, G> {
        Vars {
            env: self.env,
            fs,
            prefix: self.prefix,
        }
    }

    /// Every lookup name gets `prefix` prepended, e.g. `APP_` turns
    /// `PORT` into `APP_PORT`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// A borrowed view whose prefix extends this one.
    pub fn scoped(&self, prefix: &str) -> Vars<&E, &F> {
        Vars {
            env: &self.env,
            fs: &self.fs,
            prefix: format!("{}{prefix}", self.prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    pub fn env(&self) -> &E {
        &self.env
    }
}

impl<E: ReadEnv, F: ReadFile> Vars<E, F> {
    pub fn get(&self, name: impl Into<String>) -> Lookup<'_, E, F> {
        Lookup {
            vars: self,
            names: vec![name.into()],
            from_file: false,
            allow_empty: false,
        }
    }
}

/// A pending lookup built by [`Vars::get`]. Finish it with one of the
/// terminals ([`raw`](Self::raw), [`parse`](Self::parse), [`bool`](Self::bool), ...).
#[must_use = "a Lookup does nothing until a terminal such as raw or parse is called"]
pub struct Lookup<'v, E, F> {
    vars: &'v Vars<E, F>,
    names: Vec<String>,
    from_file: bool,
    allow_empty: bool,
}

impl<E: ReadEnv, F: ReadFile> Lookup<'_, E, F> {
    /// Consulted only when every earlier name is absent.
    pub fn fallback(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Also consult `{NAME}_FILE` for each name. A direct value wins.
    pub fn from_file(mut self) -> Self {
        self.from_file = true;
        self
    }

    /// Treat a set-but-empty variable as present.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn raw(self) -> Reader<String> {
        for name in &self.names {
            let key = self.vars.key(name);
            match self.vars.env.var(&key) {
                Ok(value) if self.accepts(&value) => return Reader::found(key, value, Origin::Env),
                Ok(_) | Err(VarError::NotPresent) => {}
                Err(VarError::NotUnicode(_)) => {
                    return Reader::failed(key.clone(), Origin::Env, EnvError::NotUnicode { name: key });
                }
            }

            if self.from_file
                && let Some(reader) = self.read_file(&key)
            {
                return reader;
            }
        }

        let primary = self.names.first().map(String::as_str).unwrap_or_default();
        Reader::missing(self.vars.key(primary))
    }

    pub fn string(self) -> Reader<String> {
        self.raw()
    }

    pub fn parse<T>(self) -> Reader<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw().parse_with(|s| s.trim().parse::<T>())
    }

    pub fn bool(self) -> Reader<bool> {
        self.raw().parse_with(|s| parse_bool(s))
    }

    pub fn duration(self) -> Reader<Duration> {
        self.raw().parse_with(|s| parse_duration(s))
    }

    /// Comma-separated values. Items are trimmed and empty items skipped.
    pub fn list<T>(self) -> Reader<Vec<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw().parse_with(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| item.parse::<T>().map_err(|e| format!("item {item:?}: {e}")))
                .collect::<Result<Vec<T>, String>>()
        })
    }

    pub fn with<T, R: Display>(self, parser: impl FnOnce(&str) -> Result<T, R>) -> Reader<T> {
        self.raw().parse_with(|s| parser(s))
    }

    fn accepts(&self, value: &str) -> bool {
        self.allow_empty || !value.is_empty()
    }

    fn read_file(&self, key: &str) -> Option<Reader<String>> {
        let file_key = format!("{key}_FILE");
        let path = match self.vars.env.var(&file_key) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            Ok(_) | Err(VarError::NotPresent) => return None,
            Err(VarError::NotUnicode(_)) => {
                return Some(Reader::failed(
                    file_key.clone(),
                    Origin::Missing,
                    EnvError::NotUnicode { name: file_key },
                ));
            }
        };

        match self.vars.fs.read_to_string(&path) {
            Ok(contents) => {
                let value = contents.trim().to_string();
                if !self.accepts(&value) {
                    return None;
                }
                debug!(name = %key, path = %path.display(), "read environment value from file");
                Some(Reader::found(key, value, Origin::File(path)))
            }
            Err(source) => Some(Reader::failed(
                file_key.clone(),
                Origin::File(path.clone()),
                EnvError::FileRead {
                    name: file_key,
                    path: path.display().to_string(),
                    source,
                },
            )),
        }
    }
}
