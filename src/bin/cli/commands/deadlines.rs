use anyhow::Result;

use studyplan_lib::planner::AGENDA_REVIEW_LIMIT;
use studyplan_lib::schedule::{expand_topics, resolve_deadline, upcoming_assignments, DatedAssignment, LATER_LIMIT, SOON_WINDOW_DAYS};
use studyplan_lib::study::{DueItem, DueKind};
use studyplan_lib::StudyAgenda;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, with_reviews: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    let assignments = app.assignments()?;
    let next = resolve_deadline(&assignments, app.today);
    let agenda = if with_reviews {
        app.notes_planner()?.agenda(&assignments, app.today, SOON_WINDOW_DAYS, AGENDA_REVIEW_LIMIT)
    } else {
        StudyAgenda {
            assignments: upcoming_assignments(&assignments, app.today, SOON_WINDOW_DAYS),
            reviews: Vec::new(),
            total_due: 0,
        }
    };

    match format {
        OutputFormat::Json => {
            let mut output = serde_json::json!({
                "date": app.today.to_string(),
                "next": next,
                "dueToday": agenda.assignments.due_today,
                "soon": agenda.assignments.soon,
                "later": agenda.assignments.later,
            });
            if with_reviews {
                output["reviews"] = serde_json::to_value(&agenda.reviews)?;
                output["totalDue"] = agenda.total_due.into();
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::heading(&format!("Agenda - {}", app.today), use_color));

            if agenda.is_empty() {
                println!("\nNothing on the schedule and nothing due for review.");
                return Ok(());
            }

            let schedule = &agenda.assignments;
            if !schedule.due_today.is_empty() {
                println!("\n{}", terminal::paint("Due today:", Color::RED, use_color));
                for dated in &schedule.due_today {
                    print_detailed(dated, use_color);
                }
            }

            if !schedule.soon.is_empty() {
                println!("\n{}", terminal::paint(&format!("Due in the next {} days:", SOON_WINDOW_DAYS), Color::YELLOW, use_color));
                for dated in &schedule.soon {
                    print_detailed(dated, use_color);
                }
            }

            if !schedule.later.is_empty() {
                println!("\nLater:");
                for dated in schedule.later.iter().take(LATER_LIMIT) {
                    println!("  {} {} (in {} days)", dated.due, dated.assignment.name, dated.days_away);
                }
                if schedule.later.len() > LATER_LIMIT {
                    println!("  ... and {} more", schedule.later.len() - LATER_LIMIT);
                }
            }

            if let Some(deadline) = next {
                println!("\nNext: {}", terminal::paint(&deadline.label(), Color::BOLD, use_color));
                if !deadline.chapters.is_empty() {
                    println!("Chapters: {}", deadline.chapters.join(", "));
                }
            }

            if with_reviews && !agenda.reviews.is_empty() {
                println!("\nReview ({} items due):", agenda.total_due);
                for due in &agenda.reviews {
                    print_review(due, use_color);
                }
            }
        }
    }

    Ok(())
}

fn print_detailed(dated: &DatedAssignment, use_color: bool) {
    let when = match dated.days_away {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        days => format!("in {} days", days),
    };
    println!("  {} {} ({})", dated.due, terminal::paint(&dated.assignment.name, Color::BOLD, use_color), when);
    if let Some(location) = &dated.assignment.location {
        println!("    at {}", location);
    }
    for topic in expand_topics(&dated.assignment.topics) {
        println!("    - {}", topic);
    }
}

fn print_review(due: &DueItem, use_color: bool) {
    let status = match due.kind {
        DueKind::New => terminal::paint("new", Color::BLUE, use_color),
        DueKind::Review => terminal::paint(&format!("{}d overdue", due.days_overdue), Color::RED, use_color),
    };
    println!(
        "  {} {} - {} ({})",
        terminal::importance_badge(due.item.importance, use_color),
        due.item.id.source,
        due.item.name(),
        status
    );
}
