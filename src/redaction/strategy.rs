//! Redaction strategy trait and supporting types.
//!
//! Each supported container format implements [`RedactionStrategy`]; the
//! service picks one by file extension.

use crate::domain::{MatchList, PatternCatalog};
use crate::error::RedactorResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// What a strategy counts as one text-bearing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Page,
    Paragraph,
}

/// Statistics about a redaction run.
///
/// Counts only grow through [`RedactionStats::record`], which keeps the
/// per-category counts summing to `redactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactionStats {
    /// Pages or paragraphs
    pub unit: UnitKind,

    /// Units visited
    pub units_processed: usize,

    /// Units with at least one redaction
    pub units_modified: usize,

    /// One per match, regardless of how many regions or characters it covered
    pub redactions: usize,

    /// Redactions by category display name
    pub categories: BTreeMap<String, usize>,
}

impl RedactionStats {
    pub fn new(unit: UnitKind) -> Self {
        Self {
            unit,
            units_processed: 0,
            units_modified: 0,
            redactions: 0,
            categories: BTreeMap::new(),
        }
    }

    /// Counts one redaction for `category`.
    pub fn record(&mut self, category: &str) {
        self.redactions += 1;
        *self.categories.entry(category.to_string()).or_insert(0) += 1;
    }

    /// Returns true if any redactions were applied.
    pub fn has_redactions(&self) -> bool {
        self.redactions > 0
    }
}

/// Detection results over a whole document, without modifying it.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub text: String,
    pub matches: MatchList,
}

impl Preview {
    pub fn new(text: String, catalog: &PatternCatalog) -> Self {
        let matches = catalog.find(&text);
        Self { text, matches }
    }

    pub fn total(&self) -> usize {
        self.matches.len()
    }

    /// Match counts by category display name.
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        self.matches
            .by_category()
            .into_iter()
            .map(|(category, items)| (category, items.len()))
            .collect()
    }
}

/// Strategy for redacting sensitive information from one container format.
pub trait RedactionStrategy: Send + Sync {
    /// Redacts every match of `catalog` from `input`, writing `output`.
    ///
    /// Nothing is written at `output` unless the whole run succeeds.
    fn redact(
        &self,
        input: &Path,
        output: &Path,
        catalog: &PatternCatalog,
    ) -> RedactorResult<RedactionStats>;

    /// Runs detection over the whole document text without writing anything.
    fn preview(&self, input: &Path, catalog: &PatternCatalog) -> RedactorResult<Preview> {
        let text = self.extract_text(input)?;
        Ok(Preview::new(text, catalog))
    }

    /// Extracts the document's plain text.
    fn extract_text(&self, input: &Path) -> RedactorResult<String>;

    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &str;
}
