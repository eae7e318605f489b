//! Kernel error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChordError {
    /// Scanner or parser diagnostics, `filepath:line:column:`-prefixed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Interpolation resolution failure (e.g. undefined `%(name)`).
    #[error("resolve error: {0}")]
    Resolve(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not spawn command: {0}")]
    Spawn(String),

    #[error("backend error: {0}")]
    Backend(String),
}
