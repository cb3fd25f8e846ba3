//! Error types for the document redaction library.
//!
//! Every fallible operation in the library returns [`RedactorResult`]. Errors
//! are categorized by their source so callers can tell a rejected input apart
//! from a backend failure on a specific page or package part.

use std::io;
use std::path::PathBuf;

/// Result type alias for redaction operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

/// Boxed source error carried by backend variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Comprehensive error type for all redaction operations.
#[derive(Debug, thiserror::Error)]
pub enum RedactorError {
    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input extension is neither a PDF nor a Word document
    #[error("Unsupported file type '{extension}' for '{}' (supported: .pdf, .docx)", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Error occurred during PDF processing
    #[error("PDF processing error{}: {message}", page_suffix(*page))]
    PdfProcessing {
        message: String,
        page: Option<usize>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Malformed Word package or WordprocessingML part
    #[error("DOCX error in '{part}': {message}")]
    Docx { part: String, message: String },

    /// Invalid configuration or parameters
    #[error("Invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// Backend-specific error (MuPDF, zip, ...)
    #[error("{backend} backend error: {message}")]
    BackendError {
        backend: String,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

fn page_suffix(page: Option<usize>) -> String {
    page.map(|p| format!(" on page {}", p)).unwrap_or_default()
}

impl RedactorError {
    /// Shorthand for an I/O failure tied to a path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for a DOCX part failure.
    pub fn docx(part: impl Into<String>, message: impl ToString) -> Self {
        Self::Docx {
            part: part.into(),
            message: message.to_string(),
        }
    }

    /// Shorthand for a rejected parameter.
    pub fn invalid_input(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

impl From<zip::result::ZipError> for RedactorError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::BackendError {
            backend: "zip".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
