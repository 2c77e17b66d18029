//! Error types for job configuration handling
//!
//! Two structural kinds matter to callers: a plain semantic violation
//! (`Value`) and a violation tied to a referenced input file (`InvalidFile`).
//! Both display exactly their message, so callers can surface them verbatim.

use std::path::PathBuf;

use hazard_types::ImtError;
use thiserror::Error;

/// Main error type for building and validating an `OqParam`
#[derive(Error, Debug)]
pub enum OqError {
    /// Generic semantic/config violation
    #[error("{0}")]
    Value(String),

    /// Violation tied to the applicability of a referenced input
    #[error("{0}")]
    InvalidFile(String),

    #[error(transparent)]
    UnknownImt(#[from] ImtError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Discriminant of an [`OqError`], for callers that branch on the kind only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Value,
    InvalidFile,
    UnknownImt,
    Io,
}

impl OqError {
    pub fn value(message: impl Into<String>) -> Self {
        OqError::Value(message.into())
    }

    pub fn invalid_file(message: impl Into<String>) -> Self {
        OqError::InvalidFile(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OqError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            OqError::Value(_) => ErrorKind::Value,
            OqError::InvalidFile(_) => ErrorKind::InvalidFile,
            OqError::UnknownImt(_) => ErrorKind::UnknownImt,
            OqError::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn is_invalid_file(&self) -> bool {
        self.kind() == ErrorKind::InvalidFile
    }
}

/// Result alias used throughout the engine
pub type OqResult<T> = Result<T, OqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_bare_message() {
        let err = OqError::value("poes must be set");
        assert_eq!(err.to_string(), "poes must be set");
        assert_eq!(err.kind(), ErrorKind::Value);

        let err = OqError::invalid_file("You forgot to specify a site_model");
        assert!(err.is_invalid_file());
        assert_eq!(err.to_string(), "You forgot to specify a site_model");
    }

    #[test]
    fn test_unknown_imt_converts() {
        let err: OqError = ImtError::Unknown("XXX".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::UnknownImt);
        assert_eq!(err.to_string(), "'XXX'");
    }
}
