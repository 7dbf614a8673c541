//! Error types for tokensync-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} document: {message}")]
    Serialize { format: String, message: String },

    #[error("Unsupported document format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid color: {value:?}")]
    InvalidColor { value: String },

    #[error("Invalid primitive reference: {value:?} (expected \"palette/index\")")]
    InvalidAlias { value: String },
}

impl Error {
    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
