//! Error types for the igesrust library

use std::io;
use thiserror::Error;

/// Main error type for igesrust operations
#[derive(Debug, Error)]
pub enum IgesError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed record geometry (wrong width, bad section letter, bad sequence)
    #[error("Record error: {0}")]
    Record(String),

    /// Unparseable primitive field, Hollerith mismatch, unterminated block
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed global section
    #[error("Global section error: {0}")]
    Global(String),

    /// Invalid form number for an entity type
    #[error("Invalid form number {form} for entity type {type_code}")]
    InvalidForm { type_code: i32, form: i32 },

    /// A directory-entry pointer names an entity that does not exist
    #[error("Entity not found: DE sequence {0}")]
    EntityNotFound(u32),

    /// A reference resolved to an entity of the wrong kind
    #[error("Wrong entity kind: expected {expected}, found type {found}")]
    WrongEntityKind { expected: &'static str, found: i32 },

    /// Write refused because the destination exists and overwrite is off
    #[error("File already exists: {0}")]
    FileExists(String),

    /// Error while formatting an entity's parameter data
    #[error("Format error: {0}")]
    Format(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for igesrust operations
pub type Result<T> = std::result::Result<T, IgesError>;

impl From<String> for IgesError {
    fn from(s: String) -> Self {
        IgesError::Custom(s)
    }
}

impl From<&str> for IgesError {
    fn from(s: &str) -> Self {
        IgesError::Custom(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IgesError::InvalidForm {
            type_code: 110,
            form: 7,
        };
        assert_eq!(err.to_string(), "Invalid form number 7 for entity type 110");
    }

    #[test]
    fn test_entity_not_found() {
        let err = IgesError::EntityNotFound(13);
        assert!(err.to_string().contains("13"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let iges_err: IgesError = io_err.into();
        assert!(matches!(iges_err, IgesError::Io(_)));
    }
}
