//! Progress statistics and the due-for-review queue

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::review::MAX_MASTERY;
use super::scoring::ScoringProfile;
use crate::document::{Importance, StudyItem};
use crate::store::ReviewBook;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStatistics {
    pub total_items: usize,
    /// Distinct note files, or glossary sources
    pub total_sources: usize,
    pub by_importance: BTreeMap<Importance, usize>,
    pub reviewed: usize,
    pub remaining: usize,
    /// Share of items reviewed at least once, `None` without items
    pub completion_rate: Option<f64>,
    /// Items per mastery level 0..=5; empty for notes
    pub mastery: BTreeMap<u8, usize>,
}

impl StudyStatistics {
    /// Completion as a percentage with one decimal
    pub fn completion_percent(&self) -> Option<f64> {
        self.completion_rate.map(|rate| (rate * 1000.0).round() / 10.0)
    }
}

pub fn compute_statistics(items: &[StudyItem], book: &ReviewBook, profile: ScoringProfile) -> StudyStatistics {
    let total_items = items.len();
    let total_sources = items.iter().map(|i| i.id.source.as_str()).collect::<BTreeSet<_>>().len();

    let mut by_importance: BTreeMap<Importance, usize> = Importance::ALL.iter().map(|i| (*i, 0)).collect();
    let mut mastery: BTreeMap<u8, usize> = match profile {
        ScoringProfile::Glossary => (0..=MAX_MASTERY).map(|level| (level, 0)).collect(),
        ScoringProfile::Notes => BTreeMap::new(),
    };
    let mut reviewed = 0;

    for item in items {
        *by_importance.entry(item.importance).or_insert(0) += 1;

        let record = book.get(&item.id);
        if record.map_or(false, |r| r.is_reviewed()) {
            reviewed += 1;
        }

        if profile == ScoringProfile::Glossary {
            let level = record.map_or(0, |r| r.mastery()).min(MAX_MASTERY);
            *mastery.entry(level).or_insert(0) += 1;
        }
    }

    let completion_rate = if total_items == 0 {
        None
    } else {
        Some(reviewed as f64 / total_items as f64)
    };

    StudyStatistics {
        total_items,
        total_sources,
        by_importance,
        reviewed,
        remaining: total_items - reviewed,
        completion_rate,
        mastery,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueKind {
    /// Never reviewed
    New,
    /// Scheduled review date has arrived
    Review,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueItem {
    pub item: StudyItem,
    pub kind: DueKind,
    pub days_overdue: i64,
}

/// Items that are new or whose next review date is today or earlier.
///
/// High importance comes first, then the most overdue.
pub fn due_for_review(items: &[StudyItem], book: &ReviewBook, today: NaiveDate) -> Vec<DueItem> {
    let mut due: Vec<DueItem> = items
        .iter()
        .filter_map(|item| {
            let record = book.get(&item.id).filter(|r| r.is_reviewed());
            match record {
                None => Some(DueItem {
                    item: item.clone(),
                    kind: DueKind::New,
                    days_overdue: 0,
                }),
                Some(record) => {
                    let next = record.next_review_date()?;
                    (next <= today).then(|| DueItem {
                        item: item.clone(),
                        kind: DueKind::Review,
                        days_overdue: (today - next).num_days(),
                    })
                }
            }
        })
        .collect();

    due.sort_by(|a, b| a.item.importance.cmp(&b.item.importance).then(b.days_overdue.cmp(&a.days_overdue)));
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ItemId;
    use crate::store::ReviewRecord;
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
    }

    fn section(file: &str, name: &str, importance: Importance) -> StudyItem {
        StudyItem::section(ItemId::new(file, name), importance, "Topic".into(), PathBuf::from(file))
    }

    fn record(last: &str, next: &str, count: u32, mastery: Option<u8>) -> ReviewRecord {
        ReviewRecord {
            last_reviewed: Some(last.to_string()),
            review_count: count,
            next_review: Some(next.to_string()),
            mastery_level: mastery,
        }
    }

    #[test]
    fn test_statistics_empty() {
        let stats = compute_statistics(&[], &ReviewBook::new(), ScoringProfile::Notes);
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.completion_rate, None);
        assert_eq!(stats.completion_percent(), None);
        assert_eq!(stats.by_importance[&Importance::High], 0);
    }

    #[test]
    fn test_statistics_counts() {
        let items = vec![
            section("a.wiki", "One", Importance::High),
            section("a.wiki", "Two", Importance::Low),
            section("b.wiki", "Three", Importance::Low),
        ];
        let mut book = ReviewBook::new();
        book.insert(&items[0].id, record("2024-09-30", "2024-10-01", 1, None));
        // an empty record does not count as reviewed
        book.insert(&items[1].id, ReviewRecord::default());

        let stats = compute_statistics(&items, &book, ScoringProfile::Notes);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.total_sources, 2);
        assert_eq!(stats.by_importance[&Importance::Low], 2);
        assert_eq!(stats.by_importance[&Importance::Medium], 0);
        assert_eq!(stats.reviewed, 1);
        assert_eq!(stats.remaining, 2);
        assert_eq!(stats.completion_percent(), Some(33.3));
        assert!(stats.mastery.is_empty());
    }

    #[test]
    fn test_statistics_mastery_histogram() {
        let items = vec![
            section("glossary.wiki", "Capsid", Importance::High),
            section("glossary.wiki", "Virion", Importance::Medium),
            section("glossary.wiki", "Prion", Importance::Medium),
        ];
        let mut book = ReviewBook::new();
        book.insert(&items[0].id, record("2024-09-30", "2024-10-01", 3, Some(3)));
        book.insert(&items[1].id, record("2024-09-30", "2024-10-01", 1, Some(9)));

        let stats = compute_statistics(&items, &book, ScoringProfile::Glossary);
        assert_eq!(stats.mastery.len(), 6);
        assert_eq!(stats.mastery[&0], 1);
        assert_eq!(stats.mastery[&3], 1);
        assert_eq!(stats.mastery[&5], 1);
        assert_eq!(stats.total_sources, 1);
    }

    #[test]
    fn test_due_for_review_order() {
        let items = vec![
            section("a.wiki", "Fresh", Importance::Low),
            section("a.wiki", "Later", Importance::High),
            section("a.wiki", "Slightly", Importance::High),
            section("a.wiki", "Very", Importance::High),
            section("a.wiki", "Broken", Importance::High),
        ];
        let mut book = ReviewBook::new();
        book.insert(&items[1].id, record("2024-09-30", "2024-10-03", 1, None));
        book.insert(&items[2].id, record("2024-09-20", "2024-09-30", 2, None));
        book.insert(&items[3].id, record("2024-09-01", "2024-09-21", 3, None));
        book.insert(&items[4].id, record("2024-09-01", "soon", 1, None));

        let due = due_for_review(&items, &book, today());
        let names: Vec<&str> = due.iter().map(|d| d.item.name()).collect();
        assert_eq!(names, vec!["Very", "Slightly", "Fresh"]);

        assert_eq!(due[0].kind, DueKind::Review);
        assert_eq!(due[0].days_overdue, 10);
        assert_eq!(due[2].kind, DueKind::New);
        assert_eq!(due[2].days_overdue, 0);
    }

    #[test]
    fn test_due_today_is_included() {
        let items = vec![section("a.wiki", "Today", Importance::Medium)];
        let mut book = ReviewBook::new();
        book.insert(&items[0].id, record("2024-09-28", "2024-10-01", 2, None));

        let due = due_for_review(&items, &book, today());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].days_overdue, 0);
    }
}
