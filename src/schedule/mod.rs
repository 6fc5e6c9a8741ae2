//! Assignment schedule and deadline resolution
//!
//! The schedule is a YAML file, either a bare list of assignments or a
//! mapping with an `assignments` key:
//! ```yaml
//! course: Microbiology
//! assignments:
//!   - name: Exam 2
//!     due: 2024-10-21
//!     topics:
//!       - "Chapter 13: Viruses": null
//!       - Chapter 14
//! ```

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;

use crate::error::Result;
use crate::store::parse_date;

/// A scheduled assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub name: String,
    /// Raw due date as written in the schedule (`due`, falling back to `date`)
    pub due: Option<String>,
    pub topics: Vec<String>,
    pub location: Option<String>,
}

impl Assignment {
    pub fn new(name: impl Into<String>, due: Option<&str>, topics: &[&str]) -> Self {
        Self {
            name: name.into(),
            due: due.map(str::to_string),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            location: None,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_mapping()?;
        let name = map
            .get("name")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| "N/A".to_string());
        let due = ["due", "date"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(scalar_to_string))
            .find(|s| !s.is_empty());
        let location = map.get("location").and_then(scalar_to_string);

        let mut topics = Vec::new();
        if let Some(entries) = map.get("topics").and_then(Value::as_sequence) {
            for entry in entries {
                match entry {
                    Value::Mapping(labels) => {
                        topics.extend(labels.keys().filter_map(scalar_to_string));
                    }
                    other => topics.extend(scalar_to_string(other)),
                }
            }
        }

        Some(Self {
            name,
            due,
            topics,
            location,
        })
    }

    /// Parsed due date; `None` when missing or malformed
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due.as_deref().and_then(|d| parse_date(d).ok())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse schedule YAML. Unexpected structure yields an empty schedule.
pub fn parse_schedule(content: &str) -> Result<Vec<Assignment>> {
    let root: Value = serde_yaml::from_str(content)?;
    let entries = match &root {
        Value::Sequence(seq) => seq,
        Value::Mapping(map) => match map.get("assignments").and_then(Value::as_sequence) {
            Some(seq) => seq,
            None => {
                log::warn!("Schedule has no 'assignments' list");
                return Ok(Vec::new());
            }
        },
        _ => {
            log::warn!("Unexpected schedule structure");
            return Ok(Vec::new());
        }
    };

    Ok(entries.iter().filter_map(Assignment::from_value).collect())
}

/// Source of assignments
pub trait ScheduleProvider {
    fn load_assignments(&self) -> Result<Vec<Assignment>>;
}

/// Schedule read from a YAML plans file
pub struct YamlSchedule {
    path: PathBuf,
}

impl YamlSchedule {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ScheduleProvider for YamlSchedule {
    fn load_assignments(&self) -> Result<Vec<Assignment>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                log::warn!("Plans file not found at {}", self.path.display());
                return Ok(Vec::new());
            }
        };
        match parse_schedule(&content) {
            Ok(assignments) => Ok(assignments),
            Err(e) => {
                log::warn!("Could not parse plans file {}: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }
}

impl ScheduleProvider for Vec<Assignment> {
    fn load_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.clone())
    }
}

/// The nearest assignment due today or later
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDeadline {
    pub name: String,
    pub due: NaiveDate,
    pub days_away: i64,
    /// Chapter numbers parsed from the topic labels
    pub chapters: Vec<String>,
}

impl UpcomingDeadline {
    pub fn label(&self) -> String {
        format!("'{}' due in {} days", self.name, self.days_away)
    }
}

/// Chapter numbers named in topic labels, one per label at most
pub fn chapters_in_topics(topics: &[String]) -> Vec<String> {
    let chapter_re = Regex::new(r"(?i)Chapter\s*(\d+)").unwrap();
    topics
        .iter()
        .filter_map(|topic| chapter_re.captures(topic).map(|c| c[1].to_string()))
        .collect()
}

/// Find the assignment with the smallest non-negative day offset from `today`.
///
/// Ties keep the first assignment in schedule order. Entries without a
/// usable due date are skipped.
pub fn resolve_deadline(assignments: &[Assignment], today: NaiveDate) -> Option<UpcomingDeadline> {
    let mut best: Option<(&Assignment, NaiveDate, i64)> = None;

    for assignment in assignments {
        let Some(raw) = assignment.due.as_deref() else {
            log::warn!("Skipping assignment '{}': no 'due' or 'date' found", assignment.name);
            continue;
        };
        let due = match parse_date(raw) {
            Ok(due) => due,
            Err(_) => {
                log::warn!(
                    "Skipping assignment '{}': date '{}' is not YYYY-MM-DD",
                    assignment.name,
                    raw
                );
                continue;
            }
        };

        let days_away = (due - today).num_days();
        if days_away < 0 {
            continue;
        }
        if best.map_or(true, |(_, _, min)| days_away < min) {
            best = Some((assignment, due, days_away));
        }
    }

    let Some((assignment, due, days_away)) = best else {
        log::debug!("No upcoming assignment was selected");
        return None;
    };

    Some(UpcomingDeadline {
        name: assignment.name.clone(),
        due,
        days_away,
        chapters: chapters_in_topics(&assignment.topics),
    })
}

/// Split combined labels such as "Chapters 1 & 3" into one label per chapter
pub fn expand_topics(topics: &[String]) -> Vec<String> {
    let prefix_re = Regex::new(r"(?i)chapters?").unwrap();
    let mut expanded = Vec::new();
    for topic in topics {
        if topic.contains('&') {
            let stripped = prefix_re.replace_all(topic, "");
            expanded.extend(
                stripped
                    .split('&')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| format!("Chapter {}", part)),
            );
        } else {
            expanded.push(topic.clone());
        }
    }
    expanded
}

/// An assignment with a parsed due date
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedAssignment {
    pub assignment: Assignment,
    pub due: NaiveDate,
    pub days_away: i64,
}

/// Days ahead that count as "soon" on the agenda
pub const SOON_WINDOW_DAYS: i64 = 5;

/// Most later assignments shown in the agenda summary
pub const LATER_LIMIT: usize = 5;

/// Assignments due today, within the window, and beyond it, each in date order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agenda {
    pub due_today: Vec<DatedAssignment>,
    /// Due in 1..=window days
    pub soon: Vec<DatedAssignment>,
    /// Due after the window
    pub later: Vec<DatedAssignment>,
}

impl Agenda {
    pub fn is_empty(&self) -> bool {
        self.due_today.is_empty() && self.soon.is_empty() && self.later.is_empty()
    }
}

pub fn upcoming_assignments(assignments: &[Assignment], today: NaiveDate, window_days: i64) -> Agenda {
    let mut dated: Vec<DatedAssignment> = assignments
        .iter()
        .filter_map(|assignment| {
            let due = assignment.due_date()?;
            Some(DatedAssignment {
                assignment: assignment.clone(),
                due,
                days_away: (due - today).num_days(),
            })
        })
        .filter(|d| d.days_away >= 0)
        .collect();
    dated.sort_by_key(|d| d.due);

    let mut agenda = Agenda::default();
    for d in dated {
        match d.days_away {
            0 => agenda.due_today.push(d),
            days if days <= window_days => agenda.soon.push(d),
            _ => agenda.later.push(d),
        }
    }
    agenda
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_nearest_deadline() {
        let today = day(2024, 10, 1);
        let schedule = vec![
            Assignment::new("Quiz 5", Some("2024-10-06"), &["Chapter 9"]),
            Assignment::new("Exam 2", Some("2024-10-03"), &["Chapter 13: Viruses", "Chapter 14", "Lab safety"]),
        ];

        let deadline = resolve_deadline(&schedule, today).unwrap();
        assert_eq!(deadline.name, "Exam 2");
        assert_eq!(deadline.days_away, 2);
        assert_eq!(deadline.chapters, vec!["13", "14"]);
        assert_eq!(deadline.label(), "'Exam 2' due in 2 days");
    }

    #[test]
    fn test_resolve_skips_past_and_malformed() {
        let today = day(2024, 10, 1);
        let schedule = vec![
            Assignment::new("Old", Some("2024-09-01"), &["Chapter 1"]),
            Assignment::new("Broken", Some("next week"), &["Chapter 2"]),
            Assignment::new("Undated", None, &["Chapter 3"]),
        ];

        assert_eq!(resolve_deadline(&schedule, today), None);
        assert_eq!(resolve_deadline(&[], today), None);
    }

    #[test]
    fn test_resolve_tie_keeps_first_and_today_counts() {
        let today = day(2024, 10, 1);
        let schedule = vec![
            Assignment::new("First", Some("2024-10-01"), &[]),
            Assignment::new("Second", Some("2024-10-01"), &["chapter 4"]),
        ];

        let deadline = resolve_deadline(&schedule, today).unwrap();
        assert_eq!(deadline.name, "First");
        assert_eq!(deadline.days_away, 0);
        assert!(deadline.chapters.is_empty());
    }

    #[test]
    fn test_parse_schedule_shapes() {
        let yaml = r#"
course: Microbiology
assignments:
  - name: Exam 2
    due: 2024-10-21
    topics:
      - "Chapter 13: Viruses": null
      - Chapter 14
  - name: Lab report
    date: "2024-10-15"
    location: Room 101
"#;
        let assignments = parse_schedule(yaml).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].due.as_deref(), Some("2024-10-21"));
        assert_eq!(assignments[0].topics, vec!["Chapter 13: Viruses", "Chapter 14"]);
        assert_eq!(assignments[1].due.as_deref(), Some("2024-10-15"));
        assert_eq!(assignments[1].location.as_deref(), Some("Room 101"));

        let list = parse_schedule("- name: Quiz\n  due: 2024-01-02\n").unwrap();
        assert_eq!(list[0].name, "Quiz");

        assert!(parse_schedule("just a string").unwrap().is_empty());
    }

    #[test]
    fn test_yaml_schedule_missing_file() {
        let temp = TempDir::new().unwrap();
        let schedule = YamlSchedule::new(temp.path().join("plans.yaml"));
        assert!(schedule.load_assignments().unwrap().is_empty());
    }

    #[test]
    fn test_expand_topics() {
        let topics = vec!["Chapters 1 & 3".to_string(), "Chapter 5".to_string()];
        assert_eq!(expand_topics(&topics), vec!["Chapter 1", "Chapter 3", "Chapter 5"]);
    }

    #[test]
    fn test_upcoming_assignments_agenda() {
        let today = day(2024, 10, 1);
        let schedule = vec![
            Assignment::new("Later", Some("2024-10-09"), &[]),
            Assignment::new("Today", Some("2024-10-01"), &[]),
            Assignment::new("Soon", Some("2024-10-03"), &[]),
            Assignment::new("Past", Some("2024-09-03"), &[]),
            Assignment::new("Undated", None, &[]),
        ];

        let agenda = upcoming_assignments(&schedule, today, SOON_WINDOW_DAYS);
        assert_eq!(agenda.due_today.len(), 1);
        assert_eq!(agenda.due_today[0].assignment.name, "Today");
        assert_eq!(agenda.soon.len(), 1);
        assert_eq!(agenda.soon[0].assignment.name, "Soon");
        assert_eq!(agenda.later.len(), 1);
        assert_eq!(agenda.later[0].days_away, 8);
    }

    #[test]
    fn test_agenda_window_boundary() {
        let today = day(2024, 10, 1);
        let schedule = vec![
            Assignment::new("Day six", Some("2024-10-07"), &[]),
            Assignment::new("Day five", Some("2024-10-06"), &[]),
            Assignment::new("Day one", Some("2024-10-02"), &[]),
        ];

        let agenda = upcoming_assignments(&schedule, today, SOON_WINDOW_DAYS);
        let soon: Vec<&str> = agenda.soon.iter().map(|d| d.assignment.name.as_str()).collect();
        let later: Vec<&str> = agenda.later.iter().map(|d| d.assignment.name.as_str()).collect();
        assert_eq!(soon, vec!["Day one", "Day five"]);
        assert_eq!(later, vec!["Day six"]);
        assert!(agenda.due_today.is_empty());

        let narrow = upcoming_assignments(&schedule, today, 0);
        assert!(narrow.soon.is_empty());
        assert_eq!(narrow.later.len(), 3);

        assert!(upcoming_assignments(&[], today, SOON_WINDOW_DAYS).is_empty());
    }
}
