//! The pattern catalog: predefined categories plus caller-supplied rules.

use super::category::Category;
use super::engine::MatchEngine;
use super::MatchList;
use crate::error::{RedactorError, RedactorResult};
use once_cell::sync::Lazy;

/// Selector that enables every category.
pub const ALL_CATEGORIES: &str = "all";

/// Key of the implicit category holding caller-supplied custom terms.
pub const CUSTOM_KEY: &str = "custom";

/// Display name of the custom-term category.
pub const CUSTOM_NAME: &str = "Custom Terms";

/// Predefined categories, compiled once per process.
static PREDEFINED: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category::builder("ssn", "Social Security Numbers")
            .description("US Social Security Numbers (XXX-XX-XXXX format)")
            .patterns([r"\b\d{3}-\d{2}-\d{4}\b", r"\b\d{9}\b"])
            .terms(["123-45-6789"])
            .build(),
        Category::builder("email", "Email Addresses")
            .description("Email addresses")
            .pattern(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b")
            .terms(["example@email.com"])
            .build(),
        Category::builder("phone", "Phone Numbers")
            .description("US phone numbers in various formats")
            .patterns([
                r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b",
                r"\(\d{3}\)\s*\d{3}[-.\s]?\d{4}\b",
            ])
            .terms(["555-123-4567", "(555) 123-4567"])
            .build(),
        Category::builder("creditcard", "Credit Card Numbers")
            .description("Credit card numbers (13-19 digits)")
            .pattern(r"\b(?:\d{4}[-\s]?){3,4}\d{1,4}\b")
            .terms(["4111-1111-1111-1111"])
            .build(),
        Category::builder("date", "Dates")
            .description("Dates in various formats")
            .patterns([
                r"\b\d{1,2}/\d{1,2}/\d{2,4}\b",
                r"\b\d{1,2}-\d{1,2}-\d{2,4}\b",
                r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{4}\b",
            ])
            .terms(["01/15/2024", "January 15, 2024"])
            .build(),
    ]
});

/// An immutable, ordered set of categories.
///
/// Iteration order is the order categories were added: predefined ones
/// first, then configured ones, then the custom-term category.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    categories: Vec<Category>,
}

impl PatternCatalog {
    /// Every predefined category, enabled.
    pub fn defaults() -> Self {
        Self {
            categories: PREDEFINED.clone(),
        }
    }

    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// The predefined categories in their canonical order.
    pub fn predefined() -> &'static [Category] {
        &PREDEFINED
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key() == key)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_enabled())
    }

    pub fn has_enabled(&self) -> bool {
        self.enabled().next().is_some()
    }

    /// Scans `text` with every enabled category.
    pub fn find(&self, text: &str) -> MatchList {
        MatchEngine::find(text, &self.categories)
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Assembles a [`PatternCatalog`] from defaults, extra categories, a key
/// selection, and custom terms.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    extra: Vec<Category>,
    selection: Option<Vec<String>>,
    custom_terms: Vec<String>,
}

impl CatalogBuilder {
    /// Adds a category after the predefined ones.
    pub fn category(mut self, category: Category) -> Self {
        self.extra.push(category);
        self
    }

    /// Restricts the enabled categories to `keys`. The [`ALL_CATEGORIES`]
    /// sentinel anywhere in the list enables everything.
    pub fn select<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_ascii_lowercase())
            .collect();
        self.selection = if keys.iter().any(|k| k == ALL_CATEGORIES) {
            None
        } else {
            Some(keys)
        };
        self
    }

    /// Adds literal terms matched as the implicit [`CUSTOM_KEY`] category.
    pub fn custom_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.custom_terms
            .extend(terms.into_iter().map(|t| t.as_ref().to_string()));
        self
    }

    pub fn build(self) -> RedactorResult<PatternCatalog> {
        let mut categories: Vec<Category> = PREDEFINED.clone();

        for category in self.extra {
            if category.key() == CUSTOM_KEY || category.key() == ALL_CATEGORIES {
                return Err(RedactorError::invalid_input(
                    "categories",
                    format!("reserved category key '{}'", category.key()),
                ));
            }
            if categories.iter().any(|c| c.key() == category.key()) {
                return Err(RedactorError::invalid_input(
                    "categories",
                    format!("duplicate category key '{}'", category.key()),
                ));
            }
            categories.push(category);
        }

        if let Some(selection) = &self.selection {
            if let Some(unknown) = selection
                .iter()
                .find(|key| !categories.iter().any(|c| c.key() == key.as_str()))
            {
                let known: Vec<&str> = categories.iter().map(|c| c.key()).collect();
                return Err(RedactorError::invalid_input(
                    "categories",
                    format!(
                        "unknown category '{}' (available: {}, {})",
                        unknown,
                        known.join(", "),
                        ALL_CATEGORIES
                    ),
                ));
            }
            categories = categories
                .iter()
                .map(|c| c.with_enabled(c.is_enabled() && selection.iter().any(|k| k == c.key())))
                .collect();
        }

        if self.custom_terms.iter().any(|t| !t.trim().is_empty()) {
            categories.push(
                Category::builder(CUSTOM_KEY, CUSTOM_NAME)
                    .description("Custom words, phrases, or patterns you define")
                    .terms(&self.custom_terms)
                    .exact_match_only(true)
                    .build(),
            );
        }

        Ok(PatternCatalog { categories })
    }
}
