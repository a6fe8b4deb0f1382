use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum BundlecatError {
    #[error("Root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid exclusion pattern: {0}")]
    Pattern(String),
    #[error("Cancelled after {processed} files")]
    Cancelled { processed: usize },
}
impl BundlecatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BundlecatError::Io {
            path: path.into(),
            source,
        }
    }
}
pub type Result<T, E = BundlecatError> = std::result::Result<T, E>;
