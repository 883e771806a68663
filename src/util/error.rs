//! Error types for the MDX decoder.

use std::path::PathBuf;
use thiserror::Error;

use crate::decode::format::Tag;

/// Main error type for MDX decoding.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File does not start with the `MDLX` magic bytes
    #[error("Not an MDX file: bad magic bytes")]
    BadFileMagic,

    /// A chunk tag differed from the one required at this position
    #[error("Unexpected tag: expected {expected}, got {actual}")]
    UnexpectedTag { expected: Tag, actual: Tag },

    /// A framed block declared a negative length
    #[error("Negative block length: {0}")]
    NegativeLength(i32),

    /// The source ended before a required read completed
    #[error("Truncated input: needed {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    /// A fixed-width text field held non-ASCII bytes
    #[error("Invalid text in {0} field")]
    InvalidText(&'static str),

    /// A keyframe track carried a sub-tag with no target known here
    #[error("Unknown keyframe target: {tag}")]
    UnknownKeyframeTarget { tag: Tag },

    /// Declared lengths or counts contradict the bytes actually present
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a structural-mismatch error from a message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::StructuralMismatch(msg.into())
    }
}

/// Result type alias for MDX operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::BadFileMagic;
        assert!(e.to_string().contains("magic"));

        let e = Error::TruncatedInput { expected: 12, actual: 7 };
        assert!(e.to_string().contains("12"));
        assert!(e.to_string().contains("7"));

        let e = Error::UnexpectedTag {
            expected: Tag(*b"SEQS"),
            actual: Tag(*b"GLBS"),
        };
        assert!(e.to_string().contains("SEQS"));
        assert!(e.to_string().contains("GLBS"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
