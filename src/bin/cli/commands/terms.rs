use anyhow::Result;

use studyplan_lib::document::{Importance, ItemDetail};
use studyplan_lib::study::ItemFilter;
use studyplan_lib::{PlanRequest, PlanStatus};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub struct TermsArgs {
    pub terms: Option<usize>,
    pub chapter: Option<String>,
    pub importance: Option<Importance>,
    pub tag: Option<String>,
    pub randomize: bool,
    pub use_deadline: bool,
}

pub fn run(app: &App, args: TermsArgs, format: &OutputFormat, use_color: bool) -> Result<()> {
    let planner = app.glossary_planner()?;
    let target = args.terms.unwrap_or(app.config.default_terms);
    let filter = ItemFilter {
        chapter: args.chapter,
        importance: args.importance,
        tag: args.tag,
        deadline_chapters: Vec::new(),
    };
    let request = PlanRequest::terms(target, filter, args.randomize, args.use_deadline);
    let plan = planner.generate_plan(&request, app.today, &mut rand::thread_rng());

    match format {
        OutputFormat::Json => {
            let terms: Vec<serde_json::Value> = plan.entries.iter().map(|entry| {
                let item = &entry.item;
                let (exam, study) = item.importances();
                let (definition, wiki_link, letter) = match &item.detail {
                    ItemDetail::Term { definition, wiki_link, letter, .. } => {
                        (definition.as_str(), wiki_link.as_str(), *letter)
                    }
                    ItemDetail::Section { .. } => ("", "", None),
                };
                serde_json::json!({
                    "name": item.name(),
                    "definition": definition,
                    "chapter": item.chapter.as_deref().unwrap_or("Unassigned"),
                    "examImportance": exam,
                    "studyImportance": study,
                    "masteryLevel": entry.record.mastery(),
                    "priorityScore": entry.score,
                    "lastReviewed": entry.record.last_reviewed,
                    "wikiLink": wiki_link,
                    "letterSection": letter,
                    "tags": item.tags,
                    "relatedTerms": item.related,
                })
            }).collect();
            let output = serde_json::json!({
                "date": app.today.to_string(),
                "status": plan.status,
                "context": plan.context.as_ref().map(|c| c.to_string()),
                "deadline": plan.deadline,
                "terms": terms,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::heading(&format!("Glossary Study Plan - {}", app.today), use_color));
            if let Some(context) = &plan.context {
                println!("{}", terminal::paint(&context.to_string(), Color::CYAN, use_color));
            }

            match plan.status {
                PlanStatus::NoItems => {
                    println!("No terms found to study!");
                    return Ok(());
                }
                PlanStatus::NoEligibleItems => {
                    println!("No terms match the specified filters!");
                    return Ok(());
                }
                PlanStatus::Ready => {}
            }

            println!("\nFocus terms ({} selected):", plan.entries.len());
            for (i, entry) in plan.entries.iter().enumerate() {
                let item = &entry.item;
                let (exam, _) = item.importances();
                println!(
                    "\n{}. {} {}",
                    i + 1,
                    terminal::importance_badge(exam, use_color),
                    terminal::paint(item.name(), Color::BOLD, use_color)
                );
                if let ItemDetail::Term { definition, wiki_link, .. } = &item.detail {
                    println!("    Definition: {}", definition);
                    println!("    Chapter: {}", item.chapter.as_deref().unwrap_or("Unassigned"));
                    println!("    Exam importance: {}", exam);
                    println!("    Mastery level: {}/5", entry.record.mastery());
                    println!("    Last reviewed: {}", terminal::last_reviewed(&entry.record));
                    println!("    Wiki: {}", wiki_link);
                }
                if !item.tags.is_empty() {
                    println!("    Tags: {}", item.tags.join(", "));
                }
                if !item.related.is_empty() {
                    println!("    Related: {}", item.related.join(", "));
                }
            }

            println!("\nMark terms as reviewed:");
            for entry in &plan.entries {
                let command = format!("  studyplan review-term \"{}\"", entry.item.name());
                println!("{}", terminal::paint(&command, Color::DIM, use_color));
            }
            println!(
                "\nChapters and importance are static; edit {} to change them.",
                app.config.term_config.display()
            );
        }
    }

    Ok(())
}
