//! Redaction strategies and the service that dispatches between them.
//!
//! Each container format has its own [`RedactionStrategy`]; the
//! [`RedactionService`] picks one from the input's extension and validates
//! inputs before any document is opened.

pub mod docx;
pub mod pdf;
pub mod strategy;

pub use docx::DocxRedactionApplier;
pub use pdf::{PdfRedactionApplier, RegionLocator};
pub use strategy::{Preview, RedactionStats, RedactionStrategy, UnitKind};

use crate::domain::PatternCatalog;
use crate::error::{RedactorError, RedactorResult};
use std::path::{Path, PathBuf};

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> RedactorResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(RedactorError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
            }),
        }
    }
}

/// Redaction service coordinating strategy execution.
pub struct RedactionService {
    pdf: PdfRedactionApplier,
    docx: DocxRedactionApplier,
}

impl RedactionService {
    pub fn new(pdf: PdfRedactionApplier, docx: DocxRedactionApplier) -> Self {
        Self { pdf, docx }
    }

    /// The strategy handling `input`.
    pub fn strategy_for(&self, input: &Path) -> RedactorResult<&dyn RedactionStrategy> {
        let strategy: &dyn RedactionStrategy = match DocumentFormat::from_path(input)? {
            DocumentFormat::Pdf => &self.pdf,
            DocumentFormat::Docx => &self.docx,
        };
        Ok(strategy)
    }

    /// Redacts every match of `catalog` from `input` into `output`.
    pub fn redact(
        &self,
        input: &Path,
        output: &Path,
        catalog: &PatternCatalog,
    ) -> RedactorResult<RedactionStats> {
        let strategy = self.strategy_for(input)?;
        ensure_exists(input)?;

        if !catalog.has_enabled() {
            return Err(RedactorError::invalid_input(
                "categories",
                "No categories enabled for redaction",
            ));
        }

        tracing::debug!(strategy = strategy.name(), input = %input.display(), "redacting");
        strategy.redact(input, output, catalog)
    }

    /// Detection over the whole document, without writing anything.
    pub fn preview(&self, input: &Path, catalog: &PatternCatalog) -> RedactorResult<Preview> {
        let strategy = self.strategy_for(input)?;
        ensure_exists(input)?;
        strategy.preview(input, catalog)
    }

    /// Extracts the document's plain text for analysis.
    pub fn extract_text(&self, input: &Path) -> RedactorResult<String> {
        let strategy = self.strategy_for(input)?;
        ensure_exists(input)?;
        strategy.extract_text(input)
    }
}

impl Default for RedactionService {
    fn default() -> Self {
        Self::new(PdfRedactionApplier::default(), DocxRedactionApplier::default())
    }
}

fn ensure_exists(input: &Path) -> RedactorResult<()> {
    if input.exists() {
        return Ok(());
    }
    Err(RedactorError::io(
        input,
        std::io::Error::new(std::io::ErrorKind::NotFound, "Input file does not exist"),
    ))
}

/// `<dir>/<stem>_redacted<ext>` next to `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}_redacted.{}", stem, ext.to_string_lossy()),
        None => format!("{}_redacted", stem),
    };
    input.with_file_name(name)
}

/// Runs `write` against a temporary file next to `output`, then moves it
/// into place. On failure nothing is left at `output`.
pub(crate) fn write_atomically<F>(output: &Path, write: F) -> RedactorResult<()>
where
    F: FnOnce(&Path) -> RedactorResult<()>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".docredact-")
        .tempfile_in(dir)
        .map_err(|e| RedactorError::io(dir, e))?;

    write(temp.path())?;

    temp.persist(output)
        .map_err(|e| RedactorError::io(output, e.error))?;
    Ok(())
}
