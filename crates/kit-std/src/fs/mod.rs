//! Zero-cost abstraction for reading files.
//!
//! Used for `{NAME}_FILE` secrets (Kubernetes / Docker mounted files).
//!
//! # Examples
//!
//! ```
//! use kit_std::fs::{ReadFile, SystemFs};
//! use std::path::Path;
//!
//! fn read_token<F: ReadFile>(fs: &F, path: &Path) -> Option<String> {
//!     fs.read_to_string(path).ok().map(|s| s.trim().to_string())
//! }
//!
//! let token = read_token(&SystemFs, Path::new("/run/secrets/api_token"));
//! ```
//!
//! ```ignore
//! use kit_std::fs::{ReadFile, MemFs};
//! use std::path::Path;
//!
//! let fs = MemFs::new();
//! fs.insert("/run/secrets/api_token", "s3cr3t\n");
//!
//! assert_eq!(read_token(&fs, Path::new("/run/secrets/api_token")).as_deref(), Some("s3cr3t"));
//! ```

mod mem;
mod read_file;
mod system;

#[cfg(any(test, feature = "test-support"))]
pub use mem::MemFs;
pub use read_file::ReadFile;
pub use system::SystemFs;
