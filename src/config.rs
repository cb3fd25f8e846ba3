//! Optional TOML configuration.
//!
//! Looked up at `--config` when given, otherwise at the platform config
//! directory (`<config_dir>/docredact/config.toml`). A missing default file
//! means built-in defaults.

use crate::domain::{Category, PatternCatalog, ALL_CATEGORIES, BLOCK_GLYPH};
use crate::error::{RedactorError, RedactorResult};
use crate::redaction::{DocxRedactionApplier, PdfRedactionApplier, RedactionService, RegionLocator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactorConfig {
    /// Category keys to enable, or `all`
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    #[serde(default)]
    pub custom_terms: Vec<String>,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub docx: DocxConfig,

    /// Additional categories, appended after the predefined ones
    #[serde(default, rename = "category")]
    pub extra_categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfConfig {
    #[serde(default)]
    pub locate: RegionLocator,

    #[serde(default = "default_max_hits")]
    pub max_hits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocxConfig {
    #[serde(default = "default_mask_char")]
    pub mask_char: char,

    #[serde(default = "default_true")]
    pub preserve_run_properties: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub key: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub patterns: Vec<String>,

    #[serde(default)]
    pub terms: Vec<String>,

    #[serde(default)]
    pub exact_match: bool,
}

impl Default for RedactorConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            custom_terms: Vec::new(),
            pdf: PdfConfig::default(),
            docx: DocxConfig::default(),
            extra_categories: Vec::new(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            locate: RegionLocator::default(),
            max_hits: default_max_hits(),
        }
    }
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            mask_char: default_mask_char(),
            preserve_run_properties: true,
        }
    }
}

fn default_categories() -> Vec<String> {
    vec![ALL_CATEGORIES.to_string()]
}

fn default_max_hits() -> u32 {
    100
}

fn default_mask_char() -> char {
    BLOCK_GLYPH
}

fn default_true() -> bool {
    true
}

impl RedactorConfig {
    /// Loads `explicit` if given (it must exist), else the default config
    /// file when present, else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> RedactorResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> RedactorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RedactorError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|reason| RedactorError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        if config.pdf.max_hits == 0 {
            return Err("pdf.max_hits must be at least 1".to_string());
        }
        Ok(config)
    }

    /// Platform config file location.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "docredact")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Builds the catalog: predefined categories, configured ones, the
    /// selected keys and the custom terms.
    pub fn catalog(&self) -> RedactorResult<PatternCatalog> {
        let mut builder = PatternCatalog::builder();
        for extra in &self.extra_categories {
            builder = builder.category(
                Category::builder(&extra.key.to_ascii_lowercase(), &extra.name)
                    .description(&extra.description)
                    .patterns(&extra.patterns)
                    .terms(&extra.terms)
                    .exact_match_only(extra.exact_match)
                    .build(),
            );
        }
        builder
            .select(&self.categories)
            .custom_terms(&self.custom_terms)
            .build()
    }

    pub fn pdf_applier(&self) -> PdfRedactionApplier {
        PdfRedactionApplier::new()
            .with_locator(self.pdf.locate)
            .with_max_hits(self.pdf.max_hits)
    }

    pub fn docx_applier(&self) -> DocxRedactionApplier {
        DocxRedactionApplier::new()
            .with_mask_char(self.docx.mask_char)
            .with_preserve_run_properties(self.docx.preserve_run_properties)
    }

    pub fn service(&self) -> RedactionService {
        RedactionService::new(self.pdf_applier(), self.docx_applier())
    }
}
