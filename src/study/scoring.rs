//! Priority scoring
//!
//! A score is the product of independent factors, rounded to two decimals:
//!
//! | factor       | notes                          | glossary                          |
//! |--------------|--------------------------------|-----------------------------------|
//! | base         | importance weight              | mean of exam and study weights    |
//! | content      | `min(lines / 10, 2.0)`         | -                                 |
//! | mastery      | -                              | `max(1.0, 3.0 - 0.5 * mastery)`   |
//! | recency      | 2.0 unseen, stale up to 3.0    | 3.0 unseen, stale up to 4.0, 0.3 if < 3 days |
//! | term density | `1 + 0.1 * key terms`          | -                                 |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::document::StudyItem;
use crate::store::ReviewRecord;

/// Recency multiplier used when the stored review date cannot be parsed
pub const MALFORMED_DATE_FACTOR: f64 = 2.0;

/// Which scoring and scheduling rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringProfile {
    /// Note sections
    Notes,
    /// Glossary terms
    Glossary,
}

impl ScoringProfile {
    /// Recency multiplier for material never reviewed
    pub fn never_reviewed_factor(self) -> f64 {
        match self {
            Self::Notes => 2.0,
            Self::Glossary => 3.0,
        }
    }

    /// Age in days beyond which an item counts as stale
    fn stale_after_days(self) -> i64 {
        match self {
            Self::Notes => 7,
            Self::Glossary => 14,
        }
    }

    fn stale_cap(self) -> f64 {
        match self {
            Self::Notes => 3.0,
            Self::Glossary => 4.0,
        }
    }
}

/// The individual factors behind a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base: f64,
    pub content: f64,
    pub mastery: f64,
    pub recency: f64,
    pub term_density: f64,
    pub total: f64,
}

/// Round to two decimals, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn base_score(item: &StudyItem, profile: ScoringProfile) -> f64 {
    match profile {
        ScoringProfile::Notes => item.importance.weight(),
        ScoringProfile::Glossary => {
            let (exam, study) = item.importances();
            (exam.weight() + study.weight()) / 2.0
        }
    }
}

pub fn content_factor(item: &StudyItem) -> f64 {
    (item.content_lines as f64 / 10.0).min(2.0)
}

pub fn mastery_factor(record: &ReviewRecord) -> f64 {
    (3.0 - f64::from(record.mastery()) * 0.5).max(1.0)
}

pub fn term_density_factor(item: &StudyItem) -> f64 {
    1.0 + item.key_terms.len() as f64 * 0.1
}

pub fn recency_factor(record: &ReviewRecord, profile: ScoringProfile, today: NaiveDate) -> f64 {
    let last = match record.last_reviewed_date() {
        None => return profile.never_reviewed_factor(),
        Some(Err(_)) => return MALFORMED_DATE_FACTOR,
        Some(Ok(date)) => date,
    };

    let days = (today - last).num_days();
    if days > profile.stale_after_days() {
        (days as f64 / 7.0).min(profile.stale_cap())
    } else if profile == ScoringProfile::Glossary && days < 3 {
        0.3
    } else {
        1.0
    }
}

/// Score an item with every factor exposed
pub fn score_breakdown(item: &StudyItem, record: &ReviewRecord, profile: ScoringProfile, today: NaiveDate) -> ScoreBreakdown {
    let base = base_score(item, profile);
    let recency = recency_factor(record, profile, today);

    let (content, mastery, term_density) = match profile {
        ScoringProfile::Notes => (content_factor(item), 1.0, term_density_factor(item)),
        ScoringProfile::Glossary => (1.0, mastery_factor(record), 1.0),
    };

    ScoreBreakdown {
        base,
        content,
        mastery,
        recency,
        term_density,
        total: round2(base * content * mastery * recency * term_density),
    }
}

/// Priority score for an item; higher is more urgent
pub fn score(item: &StudyItem, record: &ReviewRecord, profile: ScoringProfile, today: NaiveDate) -> f64 {
    score_breakdown(item, record, profile, today).total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Importance, ItemId};
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
    }

    fn section(importance: Importance, lines: usize, terms: usize) -> StudyItem {
        let mut item = StudyItem::section(ItemId::new("cells.wiki", "Mitosis"), importance, "Cells".into(), PathBuf::from("cells.wiki"));
        item.content_lines = lines;
        item.key_terms = (0..terms).map(|i| format!("term {}", i)).collect();
        item
    }

    fn term(exam: Importance, study: Importance) -> StudyItem {
        let mut item = StudyItem::term(ItemId::new("glossary.wiki", "Capsid"), "Shell".into(), "topics/capsid".into(), Some('C'));
        item.set_importances(exam, study);
        item
    }

    fn reviewed(date: &str, mastery: Option<u8>) -> ReviewRecord {
        ReviewRecord {
            last_reviewed: Some(date.to_string()),
            review_count: 1,
            next_review: None,
            mastery_level: mastery,
        }
    }

    #[test]
    fn test_notes_never_reviewed_high_importance() {
        let item = section(Importance::High, 20, 0);
        assert_eq!(score(&item, &ReviewRecord::default(), ScoringProfile::Notes, today()), 40.0);

        let with_terms = section(Importance::High, 20, 3);
        assert_eq!(score(&with_terms, &ReviewRecord::default(), ScoringProfile::Notes, today()), 52.0);
    }

    #[test]
    fn test_glossary_never_reviewed_scenario() {
        let item = term(Importance::High, Importance::Medium);
        let breakdown = score_breakdown(&item, &ReviewRecord::default(), ScoringProfile::Glossary, today());

        assert_eq!(breakdown.base, 7.5);
        assert_eq!(breakdown.mastery, 3.0);
        assert_eq!(breakdown.recency, 3.0);
        assert_eq!(breakdown.total, 67.5);
    }

    #[test]
    fn test_never_reviewed_constants() {
        let record = ReviewRecord::default();
        assert_eq!(recency_factor(&record, ScoringProfile::Notes, today()), 2.0);
        assert_eq!(recency_factor(&record, ScoringProfile::Glossary, today()), 3.0);
    }

    #[test]
    fn test_content_factor_caps() {
        assert_eq!(content_factor(&section(Importance::Low, 5, 0)), 0.5);
        assert_eq!(content_factor(&section(Importance::Low, 500, 0)), 2.0);
    }

    #[test]
    fn test_mastery_factor_floors_at_one() {
        assert_eq!(mastery_factor(&reviewed("2024-09-01", Some(0))), 3.0);
        assert_eq!(mastery_factor(&reviewed("2024-09-01", Some(2))), 2.0);
        assert_eq!(mastery_factor(&reviewed("2024-09-01", Some(5))), 1.0);
    }

    #[test]
    fn test_recency_notes() {
        let p = ScoringProfile::Notes;
        // 5 days: not yet stale
        assert_eq!(recency_factor(&reviewed("2024-09-26", None), p, today()), 1.0);
        // 14 days: 2x
        assert_eq!(recency_factor(&reviewed("2024-09-17", None), p, today()), 2.0);
        // very old: capped
        assert_eq!(recency_factor(&reviewed("2023-01-01", None), p, today()), 3.0);
        // recent reviews are not suppressed for notes
        assert_eq!(recency_factor(&reviewed("2024-10-01", None), p, today()), 1.0);
    }

    #[test]
    fn test_recency_glossary() {
        let p = ScoringProfile::Glossary;
        assert_eq!(recency_factor(&reviewed("2024-09-30", Some(1)), p, today()), 0.3);
        assert_eq!(recency_factor(&reviewed("2024-09-24", Some(1)), p, today()), 1.0);
        assert_eq!(recency_factor(&reviewed("2024-09-10", Some(1)), p, today()), 3.0);
        assert_eq!(recency_factor(&reviewed("2023-01-01", Some(1)), p, today()), 4.0);
    }

    #[test]
    fn test_recency_notes_stale_boundary() {
        let p = ScoringProfile::Notes;
        // exactly 7 days is not stale yet
        assert_eq!(recency_factor(&reviewed("2024-09-24", None), p, today()), 1.0);
        assert_eq!(recency_factor(&reviewed("2024-09-23", None), p, today()), 8.0 / 7.0);
        // 21 days reaches the cap exactly
        assert_eq!(recency_factor(&reviewed("2024-09-10", None), p, today()), 3.0);
    }

    #[test]
    fn test_recency_glossary_boundaries() {
        let p = ScoringProfile::Glossary;
        // exactly 14 days is not stale yet
        assert_eq!(recency_factor(&reviewed("2024-09-17", Some(1)), p, today()), 1.0);
        assert_eq!(recency_factor(&reviewed("2024-09-16", Some(1)), p, today()), 15.0 / 7.0);
        // 3 days is no longer suppressed, 2 days is
        assert_eq!(recency_factor(&reviewed("2024-09-28", Some(1)), p, today()), 1.0);
        assert_eq!(recency_factor(&reviewed("2024-09-29", Some(1)), p, today()), 0.3);
        assert_eq!(recency_factor(&reviewed("2024-10-01", Some(1)), p, today()), 0.3);
    }

    #[test]
    fn test_recency_future_review_date() {
        let future = reviewed("2024-10-05", Some(1));
        assert_eq!(recency_factor(&future, ScoringProfile::Notes, today()), 1.0);
        assert_eq!(recency_factor(&future, ScoringProfile::Glossary, today()), 0.3);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(2.625), 2.62);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(3.08), 3.08);
        assert_eq!(round2(2.626), 2.63);

        // exam low, study medium, mastery 1, reviewed yesterday: 3.5 * 2.5 * 0.3
        let item = term(Importance::Low, Importance::Medium);
        assert_eq!(score(&item, &reviewed("2024-09-30", Some(1)), ScoringProfile::Glossary, today()), 2.62);
    }

    #[test]
    fn test_malformed_date_falls_back() {
        let record = reviewed("01/10/2024", None);
        assert_eq!(recency_factor(&record, ScoringProfile::Notes, today()), MALFORMED_DATE_FACTOR);
        assert_eq!(recency_factor(&record, ScoringProfile::Glossary, today()), MALFORMED_DATE_FACTOR);

        let item = section(Importance::Medium, 10, 0);
        assert_eq!(score(&item, &record, ScoringProfile::Notes, today()), 10.0);
    }

    #[test]
    fn test_score_is_rounded() {
        // 2 * 0.7 * 2.0 * 1.1 = 3.08
        let item = section(Importance::Low, 7, 1);
        assert_eq!(score(&item, &ReviewRecord::default(), ScoringProfile::Notes, today()), 3.08);
    }
}
