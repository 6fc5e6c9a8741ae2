//! Persisted review history

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::document::ItemId;

/// Calendar date format used in the metadata files
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Review history for one study item.
///
/// Dates are kept as the persisted strings so a malformed value survives a
/// load/save cycle; callers parse them on demand. Unknown fields are
/// rejected so a file of another shape is never loaded as empty records
/// and then overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<String>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<String>,
    /// Glossary terms only, 0-5
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_mastery")]
    pub mastery_level: Option<u8>,
}

/// Highest mastery level of a glossary term
pub const MAX_MASTERY: u8 = 5;

/// Accept any JSON value for mastery: numbers are clamped to 0-5, anything
/// else reads as unset.
fn lenient_mastery<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => n.as_f64().map(|level| level.round().clamp(0.0, f64::from(MAX_MASTERY)) as u8),
        other => {
            log::warn!("Ignoring malformed mastery level {}", other);
            None
        }
    })
}

impl ReviewRecord {
    /// Whether the item has been studied at least once
    pub fn is_reviewed(&self) -> bool {
        self.review_count > 0 || self.last_reviewed_date().is_some()
    }

    /// `None` when never reviewed, `Some(Err)` when the stored date is malformed
    pub fn last_reviewed_date(&self) -> Option<Result<NaiveDate, chrono::ParseError>> {
        self.last_reviewed
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(parse_date)
    }

    /// Next due date, ignoring malformed values
    pub fn next_review_date(&self) -> Option<NaiveDate> {
        self.next_review.as_deref().and_then(|d| parse_date(d).ok())
    }

    pub fn mastery(&self) -> u8 {
        self.mastery_level.unwrap_or(0)
    }
}

/// All review records of one metadata file, keyed by item identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewBook {
    records: BTreeMap<String, ReviewRecord>,
}

impl ReviewBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ItemId) -> Option<&ReviewRecord> {
        self.records.get(&id.key())
    }

    /// Record for `id`, or an empty one if the item was never reviewed
    pub fn get_or_default(&self, id: &ItemId) -> ReviewRecord {
        self.get(id).cloned().unwrap_or_default()
    }

    pub fn insert(&mut self, id: &ItemId, record: ReviewRecord) {
        self.records.insert(id.key(), record);
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.records.contains_key(&id.key())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReviewRecord)> {
        self.records.iter()
    }
}
