use anyhow::Result;

use studyplan_lib::document::Importance;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, glossary: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    let planner = if glossary { app.glossary_planner()? } else { app.notes_planner()? };
    let stats = planner.compute_statistics();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            let (sources, items) = if glossary { ("Sources", "Terms") } else { ("Files", "Sections") };

            println!("{}", terminal::heading("Study Statistics", use_color));
            println!("Total {}: {}", sources.to_lowercase(), stats.total_sources);
            println!("Total {}: {}", items.to_lowercase(), stats.total_items);
            println!("Reviewed: {}", stats.reviewed);
            println!("Remaining: {}", stats.remaining);

            println!("\nBy importance:");
            for importance in Importance::ALL {
                let count = stats.by_importance.get(&importance).copied().unwrap_or(0);
                println!("  {} {}", terminal::importance_badge(importance, use_color), count);
            }

            if !stats.mastery.is_empty() {
                println!("\nBy mastery:");
                for (level, count) in &stats.mastery {
                    println!("  {}/5  {}", level, count);
                }
            }

            if let Some(percent) = stats.completion_percent() {
                println!("\nCompletion rate: {:.1}%", percent);
            }
        }
    }

    Ok(())
}
