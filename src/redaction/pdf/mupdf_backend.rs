//! MuPDF-backed page access.
//!
//! Structured text comes from MuPDF's stext device, and fills are MuPDF
//! redaction annotations applied with `pdf_redact_page`, which physically
//! removes the covered glyphs, so redacted content cannot be recovered.

use super::{DocumentPage, PagedDocument, Region, TextLine, TextUnit};
use crate::error::{RedactorError, RedactorResult};
use std::path::Path;

use mupdf::pdf::{PdfAnnotationType, PdfDocument, PdfPage};
use mupdf::{Page, Quad, Rect as MuRect, TextBlockType, TextPageFlags};

/// A PDF opened with MuPDF.
pub struct MupdfDocument {
    inner: PdfDocument,
}

impl MupdfDocument {
    pub fn open(path: &Path) -> RedactorResult<Self> {
        let path_str = utf8_path(path, "input")?;
        if !path.exists() {
            return Err(RedactorError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "Input file does not exist"),
            ));
        }

        let inner = PdfDocument::open(path_str).map_err(|e| RedactorError::PdfProcessing {
            message: "Failed to open PDF with MuPDF".to_string(),
            page: None,
            source: Some(Box::new(e)),
        })?;
        Ok(Self { inner })
    }

    /// Writes the document, with all applied redactions, to `path`.
    pub fn save(&self, path: &Path) -> RedactorResult<()> {
        let path_str = utf8_path(path, "output")?;
        self.inner
            .save(path_str)
            .map_err(|e| RedactorError::PdfProcessing {
                message: "Failed to save redacted PDF".to_string(),
                page: None,
                source: Some(Box::new(e)),
            })
    }
}

impl PagedDocument for MupdfDocument {
    type Page = MupdfPage;

    fn page_count(&self) -> RedactorResult<usize> {
        let count = self
            .inner
            .page_count()
            .map_err(|e| RedactorError::BackendError {
                backend: "MuPDF".to_string(),
                message: format!("Failed to get page count: {}", e),
                source: Some(Box::new(e)),
            })?;
        Ok(count.max(0) as usize)
    }

    fn load_page(&self, index: usize) -> RedactorResult<MupdfPage> {
        let number = index + 1;
        let page = self
            .inner
            .load_page(index as i32)
            .map_err(|e| RedactorError::PdfProcessing {
                message: format!("Failed to load page {}", number),
                page: Some(number),
                source: Some(Box::new(e)),
            })?;

        // Annotation support needs the PDF view of the page.
        let pdf_page =
            PdfPage::try_from(page.clone()).map_err(|e| RedactorError::PdfProcessing {
                message: "Page is not a PDF page".to_string(),
                page: Some(number),
                source: Some(Box::new(e)),
            })?;

        Ok(MupdfPage {
            number,
            page,
            pdf_page,
            pending: 0,
        })
    }
}

/// One loaded page.
pub struct MupdfPage {
    /// One-based, for error reporting
    number: usize,
    page: Page,
    pdf_page: PdfPage,
    pending: usize,
}

impl DocumentPage for MupdfPage {
    fn text_lines(&self) -> RedactorResult<Vec<TextLine>> {
        let text_page = self
            .page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| RedactorError::PdfProcessing {
                message: "Failed to extract structured text".to_string(),
                page: Some(self.number),
                source: Some(Box::new(e)),
            })?;

        let mut lines = Vec::new();
        for block in text_page.blocks() {
            if !matches!(block.r#type(), TextBlockType::Text) {
                continue;
            }
            for line in block.lines() {
                let glyphs = line.chars().map(|ch| {
                    (
                        ch.char().unwrap_or(char::REPLACEMENT_CHARACTER),
                        ch.size(),
                        quad_bounds(&ch.quad()),
                    )
                });
                lines.push(TextLine {
                    spans: split_spans(glyphs),
                });
            }
        }
        Ok(lines)
    }

    fn search(&self, needle: &str, max_hits: u32) -> RedactorResult<Vec<Region>> {
        let hits = self
            .page
            .search(needle, max_hits)
            .map_err(|e| RedactorError::BackendError {
                backend: "MuPDF".to_string(),
                message: format!("Search failed on page {}", self.number),
                source: Some(Box::new(e)),
            })?;
        Ok(hits.iter().map(quad_bounds).collect())
    }

    fn mark_redaction(&mut self, region: Region) -> RedactorResult<()> {
        let annot = self
            .pdf_page
            .create_annotation(PdfAnnotationType::Redact)
            .map_err(|e| RedactorError::PdfProcessing {
                message: "Failed to create redaction annotation".to_string(),
                page: Some(self.number),
                source: Some(Box::new(e)),
            })?;

        let rect = MuRect {
            x0: region.x0,
            y0: region.y0,
            x1: region.x1,
            y1: region.y1,
        };
        unsafe {
            ffi::set_annotation_rect(&annot, rect);
        }

        self.pending += 1;
        Ok(())
    }

    fn apply_redactions(&mut self) -> RedactorResult<()> {
        if self.pending == 0 {
            return Ok(());
        }
        self.pdf_page
            .redact()
            .map_err(|e| RedactorError::PdfProcessing {
                message: format!("Failed to apply redactions on page {}", self.number),
                page: Some(self.number),
                source: Some(Box::new(e)),
            })?;
        self.pending = 0;
        Ok(())
    }
}

/// Groups consecutive characters of one line into spans of equal font size.
fn split_spans<I>(glyphs: I) -> Vec<TextUnit>
where
    I: IntoIterator<Item = (char, f32, Region)>,
{
    let mut spans: Vec<TextUnit> = Vec::new();
    let mut current_size: Option<f32> = None;

    for (c, size, region) in glyphs {
        let same_span = current_size.is_some_and(|s| (s - size).abs() < 0.01);
        if !same_span {
            spans.push(TextUnit::default());
            current_size = Some(size);
        }
        if let Some(span) = spans.last_mut() {
            span.text.push(c);
            span.glyphs.push(region);
        }
    }
    spans
}

fn quad_bounds(quad: &Quad) -> Region {
    Region {
        x0: quad.ul.x.min(quad.ll.x).min(quad.ur.x).min(quad.lr.x),
        y0: quad.ul.y.min(quad.ll.y).min(quad.ur.y).min(quad.lr.y),
        x1: quad.ul.x.max(quad.ll.x).max(quad.ur.x).max(quad.lr.x),
        y1: quad.ul.y.max(quad.ll.y).max(quad.ur.y).max(quad.lr.y),
    }
}

fn utf8_path<'a>(path: &'a Path, parameter: &str) -> RedactorResult<&'a str> {
    path.to_str()
        .ok_or_else(|| RedactorError::invalid_input(parameter, "Path contains invalid UTF-8"))
}

/// FFI helpers for MuPDF annotation operations.
mod ffi {
    use mupdf::pdf::PdfAnnotation;
    use mupdf::Rect;

    /// Sets the rectangle for a PDF annotation via FFI.
    ///
    /// # Safety
    /// This function uses unsafe FFI calls to access MuPDF's C API.
    /// The annotation must be valid and the context properly initialized.
    pub unsafe fn set_annotation_rect(annot: &PdfAnnotation, rect: Rect) {
        #[repr(C)]
        struct PdfAnnotRaw {
            inner: *mut mupdf_sys::pdf_annot,
        }

        let annot_raw = std::mem::transmute::<&PdfAnnotation, &PdfAnnotRaw>(annot);
        let ctx = mupdf_sys::mupdf_new_base_context();

        if !ctx.is_null() {
            let fz_rect = mupdf_sys::fz_rect {
                x0: rect.x0,
                y0: rect.y0,
                x1: rect.x1,
                y1: rect.y1,
            };

            mupdf_sys::pdf_set_annot_rect(ctx, annot_raw.inner, fz_rect);
            mupdf_sys::mupdf_drop_base_context(ctx);
        }
    }
}
