//! Sensitive-information redaction for PDF and Word documents.
//!
//! Text is scanned with a catalog of categories (regex patterns and literal
//! terms), overlapping hits are resolved into one ordered, non-overlapping
//! match list, and each match is destroyed in the source container: burned
//! out of PDF pages with MuPDF redaction fills, or masked in the paragraph
//! text of a DOCX package.
//!
//! # Architecture
//!
//! - [`domain`]: categories, the pattern catalog, and the match engine
//! - [`redaction`]: the PDF and DOCX appliers and the dispatching service
//! - [`config`]: optional TOML configuration
//! - [`error`]: the library error type
//!
//! # Quick Start
//!
//! ```no_run
//! use docredact::{PatternCatalog, RedactionService};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = PatternCatalog::builder()
//!     .select(["email", "phone"])
//!     .custom_terms(["John Doe"])
//!     .build()?;
//!
//! let stats = RedactionService::default().redact(
//!     Path::new("letter.docx"),
//!     Path::new("letter_redacted.docx"),
//!     &catalog,
//! )?;
//! println!("{} redactions", stats.redactions);
//! # Ok(())
//! # }
//! ```
//!
//! # Matching
//!
//! ```
//! use docredact::PatternCatalog;
//!
//! let catalog = PatternCatalog::builder()
//!     .select(["email", "phone"])
//!     .custom_terms(["John Doe"])
//!     .build()
//!     .unwrap();
//! let matches = catalog.find("Contact John Doe at john@x.com or 555-123-4567.");
//! let found: Vec<&str> = matches.iter().map(|m| m.text.as_str()).collect();
//! assert_eq!(found, ["John Doe", "john@x.com", "555-123-4567"]);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod redaction;

pub use config::RedactorConfig;
pub use domain::{Category, Match, MatchEngine, MatchList, PatternCatalog};
pub use error::{RedactorError, RedactorResult};
pub use redaction::{
    default_output_path, DocumentFormat, DocxRedactionApplier, PdfRedactionApplier, Preview,
    RedactionService, RedactionStats, RedactionStrategy, RegionLocator, UnitKind,
};
