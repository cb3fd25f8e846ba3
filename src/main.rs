//! Document redaction CLI.
//!
//! Thin front-end over the docredact library: argument parsing, logging
//! setup and terminal output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use docredact::{default_output_path, PatternCatalog, RedactionService, RedactorConfig};

/// Document Redaction Tool
///
/// Redact sensitive information (SSNs, emails, phone numbers, card numbers,
/// dates, custom terms) from PDF and Word documents.
#[derive(Parser)]
#[command(name = "docredact")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Input document (.pdf or .docx)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file path (defaults to <input>_redacted.<ext>)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Categories to redact, e.g. `-c email phone` ("all" for every one)
    #[arg(short, long, value_name = "KEY", num_args = 1.., value_delimiter = ',')]
    categories: Vec<String>,

    /// Custom words or phrases to redact, e.g. `--custom "John Doe" "Acme"`
    #[arg(long, value_name = "TERM", num_args = 1..)]
    custom: Vec<String>,

    /// Show what would be redacted without writing anything
    #[arg(long)]
    preview: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a document (for debugging and verification)
    Extract {
        /// Input document
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the available redaction categories
    Categories,
}

/// Command handler over a configured service.
struct RedactionHandler {
    service: RedactionService,
    json: bool,
    verbose: bool,
}

impl RedactionHandler {
    fn new(config: &RedactorConfig, json: bool, verbose: bool) -> Self {
        Self {
            service: config.service(),
            json,
            verbose,
        }
    }

    /// Executes a redaction operation.
    fn redact(&self, input: &Path, output: &Path, catalog: &PatternCatalog) -> Result<()> {
        if self.verbose {
            println!("Input:  {}", input.display());
            println!("Output: {}", output.display());
            let enabled: Vec<&str> = catalog.enabled().map(|c| c.key()).collect();
            println!("Categories: {}", enabled.join(", "));
        }

        let stats = self
            .service
            .redact(input, output, catalog)
            .with_context(|| format!("Redaction failed for {}", input.display()))?;

        if self.json {
            let payload = json!({
                "input": input.display().to_string(),
                "output": output.display().to_string(),
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        if self.verbose {
            let unit = match stats.unit {
                docredact::UnitKind::Page => "Pages",
                docredact::UnitKind::Paragraph => "Paragraphs",
            };
            println!("\nRedaction Summary:");
            println!("  {} processed: {}", unit, stats.units_processed);
            println!("  {} modified:  {}", unit, stats.units_modified);
            for (category, count) in &stats.categories {
                println!("  {}: {}", category, count);
            }
        }

        if stats.has_redactions() {
            println!(
                "✓ Successfully redacted {} instance(s) → {}",
                stats.redactions,
                output.display()
            );
        } else {
            println!("⚠ No instances found to redact");
        }

        Ok(())
    }

    /// Prints the matches that a redaction would remove.
    fn preview(&self, input: &Path, catalog: &PatternCatalog) -> Result<()> {
        let preview = self
            .service
            .preview(input, catalog)
            .with_context(|| format!("Preview failed for {}", input.display()))?;

        if self.json {
            let payload = json!({
                "input": input.display().to_string(),
                "total": preview.total(),
                "categories": preview.matches.by_category(),
                "matches": preview.matches,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        if preview.total() == 0 {
            println!("⚠ No sensitive information found in {}", input.display());
            return Ok(());
        }

        println!("Sensitive information found in {}:", input.display());
        for (category, items) in preview.matches.by_category() {
            println!("\n{} ({})", category, items.len());
            for item in items {
                println!("  - {}", item);
            }
        }
        println!("\nTotal: {} item(s) would be redacted", preview.total());
        Ok(())
    }

    /// Extracts text from a document.
    fn extract(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let text = self
            .service
            .extract_text(input)
            .with_context(|| "Text extraction failed")?;

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} characters → {}",
                text.chars().count(),
                output_path.display()
            );
        } else {
            println!("{}", text);
        }

        Ok(())
    }

    fn categories(&self, catalog: &PatternCatalog) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(catalog.categories())?);
            return Ok(());
        }
        println!("Available categories:");
        for category in catalog.categories() {
            println!(
                "  {:<12} {:<24} {}",
                category.key(),
                category.name(),
                category.description()
            );
        }
        println!("  {:<12} {:<24} Every category above", docredact::domain::ALL_CATEGORIES, "");
        Ok(())
    }
}

/// Loads the configuration and applies command-line overrides.
fn build_config(cli: &Cli) -> Result<RedactorConfig> {
    let mut config = RedactorConfig::load(cli.config.as_deref())?;
    if !cli.categories.is_empty() {
        config.categories = cli.categories.clone();
    }
    config.custom_terms.extend(cli.custom.iter().cloned());
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    let handler = RedactionHandler::new(&config, cli.json, cli.verbose);

    match &cli.command {
        Some(Commands::Extract { input, output }) => {
            handler.extract(input, output.as_deref())?;
        }
        Some(Commands::Categories) => {
            handler.categories(&config.catalog()?)?;
        }
        None => {
            let input = cli
                .input
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("<INPUT> is required"))?;
            let catalog = config.catalog()?;

            if cli.preview {
                handler.preview(input, &catalog)?;
            } else {
                let output = cli
                    .output
                    .clone()
                    .unwrap_or_else(|| default_output_path(input));
                handler.redact(input, &output, &catalog)?;
            }
        }
    }

    Ok(())
}
