//! Review advancement along a fixed interval table
//!
//! Each review pushes the next due date out by the table entry for the new
//! review count; once the count passes the end of the table, every further
//! review uses the last (longest) interval.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::scoring::ScoringProfile;
pub use crate::store::MAX_MASTERY;
use crate::store::{format_date, ReviewRecord};

/// Days until the next review of a note section
pub const NOTE_INTERVALS: [i64; 5] = [1, 3, 7, 14, 30];

/// Days until the next review of a glossary term
pub const GLOSSARY_INTERVALS: [i64; 6] = [1, 3, 7, 14, 30, 60];

pub fn interval_table(profile: ScoringProfile) -> &'static [i64] {
    match profile {
        ScoringProfile::Notes => &NOTE_INTERVALS,
        ScoringProfile::Glossary => &GLOSSARY_INTERVALS,
    }
}

/// Interval for the review that brought the count to `review_count`
pub fn interval_for(review_count: u32, table: &[i64]) -> i64 {
    let index = (review_count.saturating_sub(1) as usize).min(table.len().saturating_sub(1));
    table.get(index).copied().unwrap_or(1)
}

/// Result of advancing a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    pub record: ReviewRecord,
    pub next_review: NaiveDate,
    pub interval_days: i64,
    /// Mastery before the review (glossary only)
    pub previous_mastery: Option<u8>,
}

/// Apply one review to `record` as of `today`.
///
/// Glossary mastery moves by `mastery_gain` and stays within 0..=5; note
/// records carry no mastery.
pub fn advance(record: &ReviewRecord, mastery_gain: i32, profile: ScoringProfile, today: NaiveDate) -> ReviewResult {
    let mut updated = record.clone();
    updated.review_count = record.review_count.saturating_add(1);
    updated.last_reviewed = Some(format_date(today));

    let previous_mastery = match profile {
        ScoringProfile::Glossary => {
            let current = record.mastery();
            let next = i32::from(current).saturating_add(mastery_gain).clamp(0, i32::from(MAX_MASTERY));
            updated.mastery_level = Some(next as u8);
            Some(current)
        }
        ScoringProfile::Notes => None,
    };

    let interval_days = interval_for(updated.review_count, interval_table(profile));
    let next_review = today + Duration::days(interval_days);
    updated.next_review = Some(format_date(next_review));

    ReviewResult {
        record: updated,
        next_review,
        interval_days,
        previous_mastery,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
    }

    #[test]
    fn test_first_review() {
        let result = advance(&ReviewRecord::default(), 1, ScoringProfile::Notes, today());

        assert_eq!(result.record.review_count, 1);
        assert_eq!(result.record.last_reviewed.as_deref(), Some("2024-10-01"));
        assert_eq!(result.record.next_review.as_deref(), Some("2024-10-02"));
        assert_eq!(result.interval_days, 1);
        assert_eq!(result.record.mastery_level, None);
        assert_eq!(result.previous_mastery, None);
    }

    #[test]
    fn test_glossary_saturates_at_sixty_days() {
        let mut record = ReviewRecord::default();
        let mut intervals = Vec::new();
        for _ in 0..8 {
            let result = advance(&record, 1, ScoringProfile::Glossary, today());
            intervals.push(result.interval_days);
            record = result.record;
        }

        assert_eq!(intervals, vec![1, 3, 7, 14, 30, 60, 60, 60]);
        assert_eq!(record.review_count, 8);
        assert_eq!(record.next_review.as_deref(), Some("2024-11-30"));
    }

    #[test]
    fn test_notes_saturate_at_thirty_days() {
        let mut record = ReviewRecord::default();
        let mut intervals = Vec::new();
        for _ in 0..7 {
            let result = advance(&record, 0, ScoringProfile::Notes, today());
            assert!(result.next_review > today());
            intervals.push(result.interval_days);
            record = result.record;
        }

        assert_eq!(intervals, vec![1, 3, 7, 14, 30, 30, 30]);
        assert!(intervals.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_count_always_increments() {
        let record = ReviewRecord {
            review_count: 41,
            ..Default::default()
        };
        let result = advance(&record, 0, ScoringProfile::Glossary, today());
        assert_eq!(result.record.review_count, 42);
    }

    #[test]
    fn test_mastery_clamped() {
        let record = ReviewRecord {
            mastery_level: Some(4),
            ..Default::default()
        };
        let up = advance(&record, 10, ScoringProfile::Glossary, today());
        assert_eq!(up.record.mastery_level, Some(5));
        assert_eq!(up.previous_mastery, Some(4));

        let down = advance(&record, -9, ScoringProfile::Glossary, today());
        assert_eq!(down.record.mastery_level, Some(0));

        for gain in [i32::MIN, -3, 0, 2, i32::MAX] {
            let result = advance(&record, gain, ScoringProfile::Glossary, today());
            assert!(result.record.mastery() <= MAX_MASTERY);
        }
    }

    #[test]
    fn test_interval_for() {
        assert_eq!(interval_for(0, &NOTE_INTERVALS), 1);
        assert_eq!(interval_for(3, &NOTE_INTERVALS), 7);
        assert_eq!(interval_for(100, &GLOSSARY_INTERVALS), 60);
    }
}
