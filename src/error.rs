use std::path::PathBuf;

use thiserror::Error;

use crate::badge::BadgeError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown citation key: {0}")]
    UnknownCitationKey(String),
    #[error("malformed badge on entry {key}: {source}")]
    MalformedBadge {
        key: String,
        #[source]
        source: BadgeError,
    },
    #[error("failed to parse bibliography {}: {message}", .path.display())]
    Bibliography { path: PathBuf, message: String },
    #[error("invalid configuration {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
