use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Location not found or unreadable: {}", .0.display())]
    LocationNotFound(PathBuf),

    #[error("Record store unavailable: {0}")]
    RecordStoreUnavailable(String),

    #[error("Duplicate local key: {0}")]
    DuplicateLocalKey(String),

    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::RecordStoreUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
