//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a build stage.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("manifest not found: {}", .0.display())]
    ManifestNotFound(PathBuf),
    #[error("no bookmarklets were updated")]
    NothingEmbedded,
    #[error("could not find `const {constant} = [...];` in {}", .path.display())]
    RegionNotFound { constant: String, path: PathBuf },
}
