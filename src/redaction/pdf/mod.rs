//! PDF redaction.
//!
//! The applier walks every page's text units (block → line → span), runs the
//! match engine on each span, resolves each match to one or more regions on
//! the page, and burns those regions in with opaque fills. Fills are applied
//! once per page after all of its spans were scanned; applying them destroys
//! the underlying text and cannot be undone.
//!
//! Page access goes through [`PagedDocument`] and [`DocumentPage`] so the
//! resolution logic is independent of the PDF engine. The production
//! implementation is [`MupdfDocument`].

pub mod mupdf_backend;

pub use mupdf_backend::{MupdfDocument, MupdfPage};

use super::strategy::{RedactionStats, RedactionStrategy, UnitKind};
use super::write_atomically;
use crate::domain::{Match, PatternCatalog};
use crate::error::RedactorResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Region {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest region covering both.
    pub fn union(self, other: Region) -> Region {
        Region {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

/// The finest addressable text unit: a span of same-sized characters.
///
/// `glyphs` holds one bounding box per character of `text`, or is empty when
/// the backend cannot provide them.
#[derive(Debug, Clone, Default)]
pub struct TextUnit {
    pub text: String,
    pub glyphs: Vec<Region>,
}

impl TextUnit {
    /// Bounding box of characters `start..end`, if glyph boxes are known.
    pub fn span_region(&self, start: usize, end: usize) -> Option<Region> {
        self.glyphs
            .get(start..end)?
            .iter()
            .copied()
            .filter(|r| !r.is_empty())
            .reduce(Region::union)
    }
}

/// One line of a page, split into spans.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    pub spans: Vec<TextUnit>,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// How a match inside a span is turned into regions on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLocator {
    /// The glyph boxes of exactly the matched characters.
    #[default]
    Glyphs,

    /// Every occurrence of the matched string anywhere on the page. This can
    /// redact identical strings outside the span that produced the match.
    Search,
}

/// A page-oriented document.
pub trait PagedDocument {
    type Page: DocumentPage;

    fn page_count(&self) -> RedactorResult<usize>;

    /// Loads page `index` (zero-based).
    fn load_page(&self, index: usize) -> RedactorResult<Self::Page>;
}

/// A single page with text extraction and destructive fill support.
pub trait DocumentPage {
    /// Structured text: lines in reading order, each split into spans.
    fn text_lines(&self) -> RedactorResult<Vec<TextLine>>;

    /// Bounding regions of up to `max_hits` visual occurrences of `needle`.
    fn search(&self, needle: &str, max_hits: u32) -> RedactorResult<Vec<Region>>;

    /// Marks `region` for an opaque fill. Nothing changes until
    /// [`DocumentPage::apply_redactions`].
    fn mark_redaction(&mut self, region: Region) -> RedactorResult<()>;

    /// Applies every pending fill on this page, removing the covered text.
    fn apply_redactions(&mut self) -> RedactorResult<()>;
}

/// Redaction applier for PDF documents.
#[derive(Debug, Clone)]
pub struct PdfRedactionApplier {
    locator: RegionLocator,
    /// Maximum search hits per match (prevents performance issues)
    max_hits: u32,
}

impl PdfRedactionApplier {
    pub fn new() -> Self {
        Self {
            locator: RegionLocator::default(),
            max_hits: 100,
        }
    }

    pub fn with_locator(mut self, locator: RegionLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Sets the maximum number of search hits per match.
    pub fn with_max_hits(mut self, max_hits: u32) -> Self {
        self.max_hits = max_hits;
        self
    }

    pub fn locator(&self) -> RegionLocator {
        self.locator
    }

    /// Redacts every page of `doc` in place and returns the statistics.
    pub fn redact_document<D: PagedDocument>(
        &self,
        doc: &D,
        catalog: &PatternCatalog,
    ) -> RedactorResult<RedactionStats> {
        let mut stats = RedactionStats::new(UnitKind::Page);

        for index in 0..doc.page_count()? {
            let mut page = doc.load_page(index)?;
            stats.units_processed += 1;

            let marked = self.mark_page(&mut page, index, catalog, &mut stats)?;
            if marked > 0 {
                page.apply_redactions()?;
                stats.units_modified += 1;
            }
            debug!(page = index + 1, regions = marked, "page processed");
        }

        Ok(stats)
    }

    fn mark_page<P: DocumentPage>(
        &self,
        page: &mut P,
        index: usize,
        catalog: &PatternCatalog,
        stats: &mut RedactionStats,
    ) -> RedactorResult<usize> {
        let lines = page.text_lines()?;
        let mut marked = 0;

        for unit in lines.iter().flat_map(|line| &line.spans) {
            if unit.text.is_empty() {
                continue;
            }
            for m in &catalog.find(&unit.text) {
                let regions = self.locate(page, unit, m)?;
                if regions.is_empty() {
                    warn!(
                        page = index + 1,
                        category = %m.category,
                        "match could not be located on the page"
                    );
                }
                for region in regions {
                    page.mark_redaction(region)?;
                    marked += 1;
                }
                stats.record(&m.category);
            }
        }

        Ok(marked)
    }

    fn locate<P: DocumentPage>(
        &self,
        page: &P,
        unit: &TextUnit,
        m: &Match,
    ) -> RedactorResult<Vec<Region>> {
        let positional = unit.span_region(m.start, m.end);
        match self.locator {
            RegionLocator::Glyphs => match positional {
                Some(region) => Ok(vec![region]),
                None => page.search(&m.text, self.max_hits),
            },
            RegionLocator::Search => {
                let hits = page.search(&m.text, self.max_hits)?;
                if hits.is_empty() {
                    Ok(positional.into_iter().collect())
                } else {
                    Ok(hits)
                }
            }
        }
    }
}

impl Default for PdfRedactionApplier {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-document text: one line per text line, each page followed by a
/// blank line.
pub fn document_text<D: PagedDocument>(doc: &D) -> RedactorResult<String> {
    let mut text = String::new();
    for index in 0..doc.page_count()? {
        let page = doc.load_page(index)?;
        for line in page.text_lines()? {
            text.push_str(&line.text());
            text.push('\n');
        }
        text.push('\n');
    }
    Ok(text)
}

impl RedactionStrategy for PdfRedactionApplier {
    fn redact(
        &self,
        input: &Path,
        output: &Path,
        catalog: &PatternCatalog,
    ) -> RedactorResult<RedactionStats> {
        let doc = MupdfDocument::open(input)?;
        let stats = self.redact_document(&doc, catalog)?;

        write_atomically(output, |path| doc.save(path))?;

        info!(
            pages = stats.units_processed,
            modified = stats.units_modified,
            redactions = stats.redactions,
            output = %output.display(),
            "PDF redacted"
        );
        Ok(stats)
    }

    fn extract_text(&self, input: &Path) -> RedactorResult<String> {
        document_text(&MupdfDocument::open(input)?)
    }

    fn name(&self) -> &str {
        "PdfRedaction"
    }
}
