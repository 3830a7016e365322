use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read document {path}: {source}")]
    DocumentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse document: {0}")]
    DocumentParse(String),

    #[error("Failed to write {path}: {source}")]
    DocumentWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for systemic write failures where continuing the batch only
    /// wastes work (disk full, filesystem remounted read-only). The
    /// pipeline aborts on these instead of recording and skipping.
    pub fn is_fatal(&self) -> bool {
        let io_err = match self {
            Error::DocumentWrite { source, .. } => source,
            Error::Io(source) => source,
            _ => return false,
        };
        matches!(
            io_err.kind(),
            std::io::ErrorKind::StorageFull | std::io::ErrorKind::ReadOnlyFilesystem
        )
    }
}
