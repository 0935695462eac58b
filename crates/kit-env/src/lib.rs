//! Fluent environment variable reading.
//!
//! A [`Vars`] handle wraps a [`ReadEnv`](kit_std::ReadEnv) (and optionally a
//! [`ReadFile`](kit_std::ReadFile) for `{NAME}_FILE` secrets). Each lookup
//! yields a [`Reader`] that can be given defaults, validated, or chained to
//! a fallback before it is consumed.
//!
//! ```ignore
//! use std::time::Duration;
//! use kit_env::Vars;
//!
//! let vars = Vars::system().with_prefix("APP_");
//! let port: u16 = vars.get("PORT").parse().default(8080).in_range(1..).get()?;
//! let timeout = vars.get("TIMEOUT").duration().default(Duration::from_secs(30)).get()?;
//! let token = vars.get("API_TOKEN").from_file().fallback("TOKEN").raw().optional()?;
//! ```
//!
//! # Resolution order
//!
//! For every name (the primary, then each fallback in order):
//!
//! 1. the variable itself, unless empty (see [`Lookup::allow_empty`])
//! 2. with [`Lookup::from_file`], the trimmed contents of the file named by
//!    `{NAME}_FILE`
//!
//! The first hit wins. Non-unicode values and unreadable files are errors,
//! not misses, so a broken primary never silently falls through to a
//! fallback.

mod error;
mod parse;
mod reader;
mod vars;

pub use error::EnvError;
pub use parse::{ParseBoolError, ParseDurationError, parse_bool, parse_duration};
pub use reader::{Origin, Reader};
pub use vars::{Lookup, Vars};
