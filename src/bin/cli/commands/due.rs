use anyhow::Result;

use studyplan_lib::study::DueKind;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let planner = app.notes_planner()?;
    let due = planner.due_for_review(app.today);

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = due.iter().map(|d| {
                serde_json::json!({
                    "file": d.item.id.source,
                    "section": d.item.name(),
                    "mainTopic": d.item.main_topic(),
                    "importance": d.item.importance,
                    "kind": d.kind,
                    "daysOverdue": d.days_overdue,
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing due for review.");
                return Ok(());
            }

            let width = terminal::column_width(due.iter().map(|d| d.item.id.source.as_str()), 4, 30);
            for d in &due {
                let status = match d.kind {
                    DueKind::New => terminal::paint("new", Color::BLUE, use_color),
                    DueKind::Review if d.days_overdue == 0 => terminal::paint("due today", Color::GREEN, use_color),
                    DueKind::Review => terminal::paint(&format!("{}d overdue", d.days_overdue), Color::RED, use_color),
                };
                println!(
                    "{} {:<width$} {}  {}",
                    terminal::importance_badge(d.item.importance, use_color),
                    d.item.id.source,
                    d.item.name(),
                    status,
                    width = width
                );
            }

            println!("\n{} items due", due.len());
        }
    }

    Ok(())
}
