use std::io;
use std::path::Path;
use std::sync::Arc;

pub trait ReadFile {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

impl<T: ReadFile + ?Sized> ReadFile for &T {
    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

impl<T: ReadFile + ?Sized> ReadFile for Arc<T> {
    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}
