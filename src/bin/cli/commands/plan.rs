use anyhow::Result;

use studyplan_lib::document::ItemDetail;
use studyplan_lib::{PlanRequest, PlanStatus};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    sections: Option<usize>,
    randomize: bool,
    focus_high: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let planner = app.notes_planner()?;
    let target = sections.unwrap_or(app.config.default_sections);
    let request = PlanRequest::notes(target, randomize, focus_high);
    let plan = planner.generate_plan(&request, app.today, &mut rand::thread_rng());

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = plan.entries.iter().map(|entry| {
                let file_path = match &entry.item.detail {
                    ItemDetail::Section { file_path, .. } => file_path.to_string_lossy().to_string(),
                    ItemDetail::Term { .. } => String::new(),
                };
                serde_json::json!({
                    "file": entry.item.id.source,
                    "filePath": file_path,
                    "mainTopic": entry.item.main_topic(),
                    "section": entry.item.name(),
                    "importance": entry.item.importance,
                    "priorityScore": entry.score,
                    "keyTermsCount": entry.item.key_terms.len(),
                    "contentLines": entry.item.content_lines,
                    "lastReviewed": entry.record.last_reviewed,
                    "tags": entry.item.tags,
                })
            }).collect();
            let output = serde_json::json!({
                "date": app.today.to_string(),
                "status": plan.status,
                "mode": request.mode,
                "sections": entries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if plan.status != PlanStatus::Ready {
                println!("No sections found in notes!");
                return Ok(());
            }

            println!("{}", terminal::heading(&format!("Note-Based Study Plan - {}", app.today), use_color));
            println!("\nToday's focus areas:");

            for (i, entry) in plan.entries.iter().enumerate() {
                let item = &entry.item;
                println!(
                    "\n{}. {} {} - {}",
                    i + 1,
                    terminal::importance_badge(item.importance, use_color),
                    item.main_topic(),
                    terminal::paint(item.name(), Color::BOLD, use_color)
                );
                println!("   File: {}", item.id.source);
                println!("   Priority: {} ({} importance)", entry.score, item.importance);
                println!("   Key terms: {}", item.key_terms.len());
                println!("   Last reviewed: {}", terminal::last_reviewed(&entry.record));
                if !item.tags.is_empty() {
                    println!("   Tags: {}", item.tags.join(", "));
                }
            }

            println!("\nMark sections as reviewed using:");
            for entry in &plan.entries {
                let command = format!("  studyplan review \"{}\" \"{}\"", entry.item.id.source, entry.item.name());
                println!("{}", terminal::paint(&command, Color::DIM, use_color));
            }
        }
    }

    Ok(())
}
