//! Sensitive-information categories.
//!
//! A [`Category`] groups the detection rules for one kind of sensitive data:
//! regex patterns, literal terms, or both. Categories are built once and never
//! mutated afterwards; every regex is compiled case-insensitively up front so
//! scanning is a read-only operation.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::warn;

/// A source pattern together with its compiled form.
///
/// `regex` is `None` when the source failed to compile; such a pattern
/// contributes no matches.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// Compiles `source` case-insensitively.
    pub fn compile(source: &str) -> Self {
        let regex = match RegexBuilder::new(source).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(pattern = source, error = %err, "skipping uncompilable pattern");
                None
            }
        };
        Self {
            source: source.to_string(),
            regex,
        }
    }

    /// Compiles a literal term, escaping every regex metacharacter.
    pub fn literal(term: &str) -> Self {
        let mut pattern = Self::compile(&regex::escape(term));
        pattern.source = term.to_string();
        pattern
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }
}

/// A named group of detection rules with an enabled flag.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    key: String,
    name: String,
    description: String,
    #[serde(serialize_with = "serialize_sources")]
    patterns: Vec<Pattern>,
    terms: Vec<String>,
    #[serde(skip)]
    term_patterns: Vec<Pattern>,
    enabled: bool,
    exact_match_only: bool,
}

impl Category {
    /// Starts a category definition. Categories are enabled by default.
    pub fn builder(key: &str, name: &str) -> CategoryBuilder {
        CategoryBuilder {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            patterns: Vec::new(),
            terms: Vec::new(),
            enabled: true,
            exact_match_only: false,
        }
    }

    /// Short selector used on the command line (`ssn`, `email`, ...).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name, used as the label on matches and statistics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Literal terms as given. For non exact-match categories these are
    /// examples only.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Compiled literal matchers; empty unless the category is exact-match.
    pub fn term_patterns(&self) -> &[Pattern] {
        &self.term_patterns
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_exact_match_only(&self) -> bool {
        self.exact_match_only
    }

    /// Returns a copy of this category with the enabled flag set.
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }
}

/// Builder for [`Category`]; compilation happens in [`CategoryBuilder::build`].
#[derive(Debug, Clone)]
pub struct CategoryBuilder {
    key: String,
    name: String,
    description: String,
    patterns: Vec<String>,
    terms: Vec<String>,
    enabled: bool,
    exact_match_only: bool,
}

impl CategoryBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }

    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.patterns
            .extend(patterns.into_iter().map(|p| p.as_ref().to_string()));
        self
    }

    pub fn terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.terms
            .extend(terms.into_iter().map(|t| t.as_ref().to_string()));
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Scans the literal terms as exact (escaped, case-insensitive) matches.
    pub fn exact_match_only(mut self, exact: bool) -> Self {
        self.exact_match_only = exact;
        self
    }

    pub fn build(self) -> Category {
        let patterns = self.patterns.iter().map(|p| Pattern::compile(p)).collect();

        // Blank terms would match everywhere once escaped; drop them here.
        let term_patterns = if self.exact_match_only {
            self.terms
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(Pattern::literal)
                .collect()
        } else {
            Vec::new()
        };

        Category {
            key: self.key,
            name: self.name,
            description: self.description,
            patterns,
            terms: self.terms,
            term_patterns,
            enabled: self.enabled,
            exact_match_only: self.exact_match_only,
        }
    }
}

fn serialize_sources<S>(patterns: &[Pattern], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(patterns.iter().map(Pattern::source))
}
