//! Error types for environment variable reading

/// Errors that can occur when reading a value from the environment.
///
/// Every variant names the variable it concerns so callers can report the
/// exact key (including any prefix) that needs fixing.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// Required environment variable is not set.
    ///
    /// Produced by [`Reader::get`](crate::Reader::get) when neither the
    /// variable, its fallbacks, nor a default supplied a value.
    #[error("environment variable '{name}' is required but not set")]
    Missing {
        /// Name of the missing environment variable (primary name)
        name: String,
    },

    /// The variable is set but does not contain valid unicode.
    #[error("environment variable '{name}' is not valid unicode")]
    NotUnicode {
        /// Name of the offending environment variable
        name: String,
    },

    /// Failed to parse the raw string into the target type.
    #[error("failed to parse environment variable '{name}' as {type_name}: {message}")]
    Parse {
        /// Name of the environment variable being parsed
        name: String,
        /// Fully qualified type name that parsing was attempted for
        type_name: String,
        /// Error message from the parser
        message: String,
    },

    /// The value parsed but was rejected by a validator.
    #[error("invalid value for environment variable '{name}': {reason}")]
    Invalid {
        /// Name of the environment variable
        name: String,
        /// Validator message
        reason: String,
    },

    /// Failed to read from a file named by a `{NAME}_FILE` variable.
    #[error("failed to read file '{path}' for environment variable '{name}': {source}")]
    FileRead {
        /// Name of the `{NAME}_FILE` environment variable (e.g. `API_KEY_FILE`)
        name: String,
        /// Path that failed to be read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl EnvError {
    pub(crate) fn parse_error<T>(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            name: name.into(),
            type_name: std::any::type_name::<T>().to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    /// The environment variable this error refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::Missing { name }
            | Self::NotUnicode { name }
            | Self::Parse { name, .. }
            | Self::Invalid { name, .. }
            | Self::FileRead { name, .. } => name,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_records_type_name() {
        let err = EnvError::parse_error::<u16>("PORT", "invalid digit");
        match &err {
            EnvError::Parse { type_name, .. } => assert_eq!(type_name, "u16"),
            other => panic!("expected Parse, got {other:?}"),
        }
        assert!(err.to_string().contains("PORT"));
        assert!(err.to_string().contains("invalid digit"));
    }

    #[test]
    fn test_name_is_available_for_every_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let cases = [
            EnvError::missing("A"),
            EnvError::NotUnicode { name: "A".into() },
            EnvError::parse_error::<u8>("A", "bad"),
            EnvError::Invalid {
                name: "A".into(),
                reason: "too small".into(),
            },
            EnvError::FileRead {
                name: "A".into(),
                path: "/x".into(),
                source: io,
            },
        ];
        for err in &cases {
            assert_eq!(err.name(), "A");
        }
        assert!(cases[0].is_missing());
        assert!(!cases[1].is_missing());
    }

    #[test]
    fn test_file_read_error_exposes_source() {
        let err = EnvError::FileRead {
            name: "TOKEN_FILE".into(),
            path: "/run/secrets/token".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/run/secrets/token"));
    }
}
