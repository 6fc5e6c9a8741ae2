use anyhow::{bail, Result};

use studyplan_lib::planner::ItemLookup;
use studyplan_lib::ReviewOutcome;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

/// Mark a note section reviewed
pub fn run_section(app: &App, file: &str, section: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut planner = app.notes_planner()?;
    let lookup = ItemLookup::Section {
        file: file.to_string(),
        section: section.to_string(),
    };
    let outcome = planner.mark_reviewed(&lookup, 0, app.today)?;
    report(&outcome, format, use_color)
}

/// Mark a glossary term reviewed and adjust its mastery
pub fn run_term(app: &App, term: &str, mastery_gain: i32, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut planner = app.glossary_planner()?;
    let outcome = planner.mark_reviewed(&ItemLookup::Term(term.to_string()), mastery_gain, app.today)?;
    report(&outcome, format, use_color)
}

fn report(outcome: &ReviewOutcome, format: &OutputFormat, use_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome)?);
            if !outcome.is_reviewed() {
                std::process::exit(1);
            }
        }
        OutputFormat::Plain => match outcome {
            ReviewOutcome::Reviewed { id, result } => {
                println!("{} {} - {}", terminal::paint("Reviewed:", Color::GREEN, use_color), id.source, id.name);
                if let (Some(before), Some(after)) = (result.previous_mastery, result.record.mastery_level) {
                    println!("  Mastery: {} -> {}", before, after);
                }
                println!(
                    "  Next review: {} (in {})",
                    result.next_review,
                    terminal::format_interval(result.interval_days)
                );
            }
            ReviewOutcome::NotFound { message } => bail!("{}", message),
        },
    }

    Ok(())
}
