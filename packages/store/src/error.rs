//! Error types for the store layer.

use std::io;
use std::path::PathBuf;

/// Errors at the store layer.
///
/// These add file-system and key failures to the codec errors below them.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Encoding, decoding, or format lookup failed.
    #[error(transparent)]
    Codec(#[from] savefs_codec::Error),

    /// The address could not be read, written, or removed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The key cannot name an entry.
    #[error("invalid key {key:?}: {message}")]
    InvalidKey { key: String, message: String },

    /// The asset source has nothing at the path.
    #[error("asset not found: {path}")]
    AssetNotFound { path: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether the error means "nothing stored there" rather than a failure
    /// to read something that is.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            Error::AssetNotFound { .. } => true,
            _ => false,
        }
    }
}
