//! Detection domain: categories, the pattern catalog, and the match engine.
//!
//! Nothing in this module touches a document. The appliers in
//! [`crate::redaction`] feed text units in and map the resulting
//! [`MatchList`] back onto their container.

pub mod catalog;
pub mod category;
pub mod engine;

pub use catalog::{CatalogBuilder, PatternCatalog, ALL_CATEGORIES, CUSTOM_KEY, CUSTOM_NAME};
pub use category::{Category, CategoryBuilder, Pattern};
pub use engine::MatchEngine;

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Deref;

/// Glyph used to overwrite redacted characters in text-based containers.
pub const BLOCK_GLYPH: char = '\u{2588}';

/// A located occurrence of sensitive text within one text unit.
///
/// `start` and `end` are character offsets, `start < end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub category: String,
}

impl Match {
    /// Length of the match in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Match) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Non-overlapping matches ordered by ascending start.
///
/// Only [`MatchEngine`] builds one, so every list upholds
/// `list[i].end <= list[i + 1].start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchList(Vec<Match>);

impl MatchList {
    pub(crate) fn from_sorted(matches: Vec<Match>) -> Self {
        debug_assert!(matches.windows(2).all(|w| w[0].end <= w[1].start));
        Self(matches)
    }

    /// Returns `text` with every character inside a match replaced by `glyph`.
    pub fn mask(&self, text: &str, glyph: char) -> String {
        let mut spans = self.0.iter().peekable();
        text.chars()
            .enumerate()
            .map(|(idx, c)| {
                while spans.peek().is_some_and(|m| m.end <= idx) {
                    spans.next();
                }
                match spans.peek() {
                    Some(m) if m.start <= idx => glyph,
                    _ => c,
                }
            })
            .collect()
    }

    /// Matched strings grouped by category name, in match order.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for m in &self.0 {
            grouped.entry(m.category.as_str()).or_default().push(&m.text);
        }
        grouped
    }
}

impl Deref for MatchList {
    type Target = [Match];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for MatchList {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchList {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
