use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use studyplan_lib::document::glossary;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

/// Write a term config covering every glossary term
pub fn run_generate(app: &App, output: Option<&Path>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let items = app.glossary_items()?;
    let yaml = glossary::generate_term_config(&items).context("Failed to render term config")?;

    let Some(path) = output else {
        print!("{}", yaml);
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, &yaml).with_context(|| format!("Failed to write {}", path.display()))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path.to_string_lossy(),
                "terms": items.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} {} with {} terms",
                terminal::paint("Generated", Color::GREEN, use_color),
                path.display(),
                items.len()
            );
            println!("Edit it to set chapters, importance levels and tags.");
        }
    }

    Ok(())
}

/// Check a term config against the glossary
pub fn run_validate(app: &App, path: &Path, format: &OutputFormat, use_color: bool) -> Result<()> {
    let config = glossary::read_term_config(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let items = app.glossary_items()?;
    let report = glossary::validate_term_config(&config, &items);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path.to_string_lossy(),
                "valid": report.is_valid(),
                "errors": report.errors,
                "warnings": report.warnings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for error in &report.errors {
                println!("{} {}", terminal::paint("error:", Color::RED, use_color), error);
            }
            for warning in &report.warnings {
                println!("{} {}", terminal::paint("warning:", Color::YELLOW, use_color), warning);
            }
            if report.is_valid() {
                println!("{} is valid ({} terms)", path.display(), config.len());
            }
        }
    }

    if !report.errors.is_empty() {
        bail!("{} has {} errors", path.display(), report.errors.len());
    }
    Ok(())
}
