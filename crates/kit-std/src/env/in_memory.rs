#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "test-support"))]
use std::env;
#[cfg(any(test, feature = "test-support"))]
use std::ffi::OsString;
#[cfg(any(test, feature = "test-support"))]
use std::sync::{PoisonError, RwLock};

#[cfg(any(test, feature = "test-support"))]
use super::ReadEnv;

/// Won't touch the global process environment.
///
/// Uses `RwLock` for interior mutability so all methods take `&self` and the
/// env can be shared with tasks on a multi-threaded runtime.
#[cfg(any(test, feature = "test-support"))]
pub struct InMemoryEnv {
    vars: RwLock<HashMap<String, OsString>>,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryEnv {
    pub fn new() -> Self {
        Self {
            vars: RwLock::new(HashMap::new()),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.set_os(key, OsString::from(value.into()));
    }

    /// Store a raw OS string. Values that are not valid unicode surface as
    /// [`env::VarError::NotUnicode`] from [`ReadEnv::var`].
    pub fn set_os(&self, key: impl Into<String>, value: OsString) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn clear(&self) {
        self.vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for InMemoryEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InMemoryEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let env = Self::new();
        for (key, value) in iter {
            env.set(key, value);
        }
        env
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        let vars = self.vars.read().unwrap_or_else(PoisonError::into_inner);
        match vars.get(key) {
            Some(raw) => raw
                .clone()
                .into_string()
                .map_err(env::VarError::NotUnicode),
            None => Err(env::VarError::NotPresent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let env = InMemoryEnv::new();
        env.set("TEST_VAR", "test_value");

        assert_eq!(env.var("TEST_VAR").unwrap(), "test_value");
    }

    #[test]
    fn test_not_present() {
        let env = InMemoryEnv::new();

        assert!(matches!(
            env.var("NONEXISTENT"),
            Err(std::env::VarError::NotPresent)
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let env = InMemoryEnv::new();
        env.set("A", "1");
        env.set("B", "2");

        env.remove("A");
        assert!(!env.contains("A"));
        assert!(env.contains("B"));

        env.clear();
        assert!(!env.contains("B"));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let env = InMemoryEnv::new();
        env.set("KEY", "v1");
        env.set("KEY", "v2");
        assert_eq!(env.var("KEY").unwrap(), "v2");
    }

    #[test]
    fn test_collects_from_pairs() {
        let env: InMemoryEnv = [("HOST", "localhost"), ("PORT", "8080")]
            .into_iter()
            .collect();

        assert_eq!(env.var("HOST").unwrap(), "localhost");
        assert_eq!(env.var("PORT").unwrap(), "8080");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value_reports_not_unicode() {
        use std::os::unix::ffi::OsStringExt;

        let env = InMemoryEnv::new();
        env.set_os("BROKEN", OsString::from_vec(vec![0x66, 0x6f, 0x80]));

        assert!(matches!(
            env.var("BROKEN"),
            Err(std::env::VarError::NotUnicode(_))
        ));
    }

    #[test]
    fn test_shareable_across_threads() {
        let env = std::sync::Arc::new(InMemoryEnv::new());
        env.set("SHARED", "yes");

        let handle = {
            let env = env.clone();
            std::thread::spawn(move || env.var("SHARED").unwrap())
        };
        assert_eq!(handle.join().unwrap(), "yes");
    }
}
