//! Multi-pattern scan with non-overlapping match resolution.

use super::category::{Category, Pattern};
use super::{Match, MatchList};
use std::cmp::Ordering;

/// Stateless match engine.
///
/// `find` collects every raw occurrence of every enabled category, then
/// resolves overlaps: earliest start wins, the longer match wins a tie at the
/// same start, and anything overlapping an already kept match is dropped.
/// The result depends only on spans (and category names for identical spans),
/// never on the order categories are supplied in.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine;

impl MatchEngine {
    pub fn find(text: &str, categories: &[Category]) -> MatchList {
        if text.is_empty() {
            return MatchList::default();
        }

        let offsets = CharOffsets::new(text);
        let mut raw = Vec::new();

        for category in categories.iter().filter(|c| c.is_enabled()) {
            for pattern in category.patterns() {
                collect(text, &offsets, pattern, category.name(), &mut raw);
            }
            if category.is_exact_match_only() {
                for pattern in category.term_patterns() {
                    collect(text, &offsets, pattern, category.name(), &mut raw);
                }
            }
        }

        MatchList::from_sorted(resolve(raw))
    }
}

fn collect(
    text: &str,
    offsets: &CharOffsets,
    pattern: &Pattern,
    category: &str,
    out: &mut Vec<Match>,
) {
    let Some(regex) = pattern.regex() else {
        return;
    };
    for hit in regex.find_iter(text) {
        if hit.start() == hit.end() {
            continue;
        }
        out.push(Match {
            start: offsets.char_index(hit.start()),
            end: offsets.char_index(hit.end()),
            text: hit.as_str().to_string(),
            category: category.to_string(),
        });
    }
}

fn resolve(mut raw: Vec<Match>) -> Vec<Match> {
    raw.sort();

    let mut kept: Vec<Match> = Vec::with_capacity(raw.len());
    let mut last_end = 0;
    for m in raw {
        if m.start >= last_end {
            last_end = m.end;
            kept.push(m);
        }
    }
    kept
}

/// Byte-to-character offset translation for one text.
struct CharOffsets {
    /// Byte offset of every char boundary, plus `text.len()`.
    boundaries: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    fn char_index(&self, byte: usize) -> usize {
        // Regex offsets always sit on char boundaries.
        self.boundaries
            .binary_search(&byte)
            .unwrap_or_else(|idx| idx)
    }
}

impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ascending start, then descending length, then category name.
impl Ord for Match {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.len().cmp(&self.len()))
            .then_with(|| self.category.cmp(&other.category))
            .then_with(|| self.text.cmp(&other.text))
    }
}
