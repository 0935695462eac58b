use std::path::Path;

use super::ReadFile;

/// Reads from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFs;

impl ReadFile for SystemFs {
    #[inline]
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}
