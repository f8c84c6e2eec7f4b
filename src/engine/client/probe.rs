//! Filesystem existence checks for TLS material.

use std::io;

use camino::Utf8Path;

/// Answers whether a path exists on the host filesystem.
///
/// Implementations distinguish "does not exist" (`Ok(false)`) from any other
/// failure, which is returned as an error rather than reported as missing.
#[cfg_attr(test, mockall::automock)]
pub trait PathProbe {
    /// Returns whether `path` exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for failures other than not-found,
    /// such as permission denied.
    fn exists(&self, path: &Utf8Path) -> io::Result<bool>;
}

/// Probes the real filesystem with ambient authority.
///
/// Symlinks are followed wherever they point, so certificate files linked in
/// from another directory count as present. A dangling link is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmbientProbe;

impl PathProbe for AmbientProbe {
    fn exists(&self, path: &Utf8Path) -> io::Result<bool> {
        match path.metadata() {
            Ok(_) => Ok(true),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// A missing ancestor directory means the path itself is missing.
fn is_missing(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
