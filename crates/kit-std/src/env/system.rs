use std::env;

use super::ReadEnv;

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_delegates_to_std_env() {
        let std_result = std::env::var("PATH");
        let provider_result = SystemEnv.var("PATH");
        assert_eq!(std_result.is_ok(), provider_result.is_ok());
    }

    #[test]
    fn test_missing_var_is_not_present() {
        assert!(matches!(
            SystemEnv.var("KIT_STD_DEFINITELY_UNSET_12345"),
            Err(env::VarError::NotPresent)
        ));
    }

    #[test]
    fn test_shared_handles_delegate() {
        fn lookup<E: ReadEnv>(env: E) -> bool {
            env.var("KIT_STD_DEFINITELY_UNSET_12345").is_err()
        }

        assert!(lookup(&SystemEnv));
        assert!(lookup(Arc::new(SystemEnv)));
    }
}
