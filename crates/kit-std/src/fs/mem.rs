#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "test-support"))]
use std::io;
#[cfg(any(test, feature = "test-support"))]
use std::path::{Path, PathBuf};
#[cfg(any(test, feature = "test-support"))]
use std::sync::{PoisonError, RwLock};

#[cfg(any(test, feature = "test-support"))]
use super::ReadFile;

/// In-memory file store.
///
/// # Path Semantics
///
/// Paths are stored as raw [`PathBuf`] keys with **no normalization**.
/// `"a.txt"`, `"./a.txt"`, and `"/cwd/a.txt"` are three distinct entries.
#[cfg(any(test, feature = "test-support"))]
pub struct MemFs {
    files: RwLock<HashMap<PathBuf, String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl MemFs {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_ref());
    }

    pub fn len(&self) -> usize {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ReadFile for MemFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_read() {
        let fs = MemFs::new();
        fs.insert("/run/secrets/token", "abc");

        assert_eq!(fs.read_to_string(Path::new("/run/secrets/token")).unwrap(), "abc");
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let fs = MemFs::new();
        let err = fs.read_to_string(Path::new("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_paths_are_not_normalized() {
        let fs = MemFs::new();
        fs.insert("a.txt", "x");

        assert!(fs.read_to_string(Path::new("a.txt")).is_ok());
        assert!(fs.read_to_string(Path::new("./a.txt")).is_err());
    }

    #[test]
    fn test_remove_deletes_entry() {
        let fs = MemFs::new();
        fs.insert("a.txt", "x");
        fs.remove("a.txt");

        assert!(fs.is_empty());
    }
}
