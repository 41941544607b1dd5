//! Error types for addressing, mutating and persisting decks.
//!
//! Every failure a caller can cause is a [`DeckError`] variant; the service
//! boundary turns it into an [`ErrorPayload`] instead of failing the process.
use crate::ooxml::OoxmlError;
use crate::ooxml::opc::error::OpcError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which half of an address, or which document, could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// Source or working document
    Document(PathBuf),
    Slide(u32),
    /// Shape id on an existing slide
    Shape { slide_id: u32, shape_id: u32 },
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(path) => write!(f, "Document {} not found", path.display()),
            Self::Slide(id) => write!(f, "Slide with id {} not found", id),
            Self::Shape { slide_id, shape_id } => {
                write!(f, "Shape with id {} not found on slide {}", shape_id, slide_id)
            },
        }
    }
}

/// Main error type for deck operations.
#[derive(Error, Debug)]
pub enum DeckError {
    #[error("{0}")]
    NotFound(Missing),

    /// Address does not split into two integer segments
    #[error("Malformed key '{0}': expected '<slide_id>_<shape_id>'")]
    MalformedKey(String),

    #[error("Shape {0} is not a picture")]
    NotPicture(String),

    #[error("Shape {0} does not have a text frame")]
    NoTextFrame(String),

    /// Shape has no transform of its own and none to inherit
    #[error("Shape {0} has no resolvable geometry")]
    MissingGeometry(String),

    /// Strict text policy refused to truncate
    #[error(
        "Shape {key} holds {paragraphs} paragraph(s) and {runs} run(s) in the first; replacing would discard content"
    )]
    WouldDiscardContent {
        key: String,
        paragraphs: usize,
        runs: usize,
    },

    #[error("Failed to fetch image from {source_ref}: {reason}")]
    FetchFailed { source_ref: String, reason: String },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Document exists but cannot be read as a presentation
    #[error("Corrupt document: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Renderer failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for deck operations.
pub type Result<T> = std::result::Result<T, DeckError>;

impl DeckError {
    pub fn slide_not_found(slide_id: u32) -> Self {
        Self::NotFound(Missing::Slide(slide_id))
    }

    pub fn shape_not_found(slide_id: u32, shape_id: u32) -> Self {
        Self::NotFound(Missing::Shape { slide_id, shape_id })
    }

    pub fn document_not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(Missing::Document(path.into()))
    }
}

impl From<OoxmlError> for DeckError {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Io(e) => DeckError::Io(e),
            OoxmlError::Opc(OpcError::IoError(e)) => DeckError::Io(e),
            other => DeckError::Corrupt(other.to_string()),
        }
    }
}

impl From<OpcError> for DeckError {
    fn from(err: OpcError) -> Self {
        DeckError::from(OoxmlError::from(err))
    }
}

impl From<image::ImageError> for DeckError {
    fn from(err: image::ImageError) -> Self {
        DeckError::InvalidImage(err.to_string())
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        DeckError::Serialization(err.to_string())
    }
}

/// The body returned to callers in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl From<&DeckError> for ErrorPayload {
    fn from(err: &DeckError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_missing_half() {
        assert_eq!(
            DeckError::slide_not_found(300).to_string(),
            "Slide with id 300 not found"
        );
        assert_eq!(
            DeckError::shape_not_found(256, 99).to_string(),
            "Shape with id 99 not found on slide 256"
        );
    }

    #[test]
    fn test_payload_serializes_as_error_object() {
        let err = DeckError::NotPicture("256_3".to_string());
        let json = serde_json::to_string(&ErrorPayload::from(&err)).unwrap();
        assert_eq!(json, r#"{"error":"Shape 256_3 is not a picture"}"#);
    }

    #[test]
    fn test_package_io_stays_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            DeckError::from(OoxmlError::Io(io)),
            DeckError::Io(_)
        ));
        let bad = OoxmlError::InvalidFormat("no spTree".to_string());
        assert!(matches!(DeckError::from(bad), DeckError::Corrupt(_)));
    }
}
