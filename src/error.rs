//! Error taxonomy shared by the edit pipeline and the analysis engine.
//!
//! Every failure is terminal for the operation that raised it. Callers that
//! need to translate an error into a status code branch on [`Error::kind`]
//! rather than on the rendered message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("failed to store {name}: {source}")]
    StorageWrite {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {name}: {source}")]
    StorageRead {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Discriminant of [`Error`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Decode,
    InvalidParameter,
    StorageWrite,
    StorageRead,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Error::StorageWrite { .. } => ErrorKind::StorageWrite,
            Error::StorageRead { .. } => ErrorKind::StorageRead,
        }
    }

    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for pipeline and analysis operations.
pub type Result<T> = std::result::Result<T, Error>;
