//! Data models for parsed notes and glossary terms

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Importance tier of a section or term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Default for Importance {
    fn default() -> Self {
        Self::Medium
    }
}

impl Importance {
    pub const ALL: [Importance; 3] = [Importance::High, Importance::Medium, Importance::Low];

    /// Base scoring weight for this tier
    pub fn weight(self) -> f64 {
        match self {
            Self::High => 10.0,
            Self::Medium => 5.0,
            Self::Low => 2.0,
        }
    }

    /// Parse a tier name, case-insensitively. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Parse a tier name, treating anything unknown as medium
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| PlannerError::InvalidImportance(s.to_string()))
    }
}

/// Identity of a study item: the source file plus the section or term name.
///
/// The display form `source#name` is the key used in the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    pub source: String,
    pub name: String,
}

impl ItemId {
    pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }

    /// Store key for this item
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.source, self.name)
    }
}

/// Variant-specific payload of a study item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemDetail {
    /// A `== Section ==` of a note file
    #[serde(rename_all = "camelCase")]
    Section {
        main_topic: String,
        file_path: PathBuf,
    },
    /// A `* [[link|Term]] :: definition` glossary entry
    #[serde(rename_all = "camelCase")]
    Term {
        definition: String,
        wiki_link: String,
        letter: Option<char>,
        exam_importance: Importance,
        study_importance: Importance,
    },
}

/// A studyable unit, rebuilt from the sources on every run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyItem {
    pub id: ItemId,
    /// Section importance, or the exam importance of a term
    pub importance: Importance,
    /// Non-blank content lines in the section
    pub content_lines: usize,
    /// Terms extracted from `term :: definition` lines
    pub key_terms: Vec<String>,
    pub tags: Vec<String>,
    /// Primary chapter
    pub chapter: Option<String>,
    /// Every chapter the item is associated with (topic files)
    pub all_chapters: Vec<String>,
    pub related: Vec<String>,
    pub detail: ItemDetail,
}

impl StudyItem {
    pub fn section(id: ItemId, importance: Importance, main_topic: String, file_path: PathBuf) -> Self {
        Self {
            id,
            importance,
            content_lines: 0,
            key_terms: Vec::new(),
            tags: Vec::new(),
            chapter: None,
            all_chapters: Vec::new(),
            related: Vec::new(),
            detail: ItemDetail::Section { main_topic, file_path },
        }
    }

    pub fn term(id: ItemId, definition: String, wiki_link: String, letter: Option<char>) -> Self {
        Self {
            id,
            importance: Importance::Medium,
            content_lines: 0,
            key_terms: Vec::new(),
            tags: Vec::new(),
            chapter: None,
            all_chapters: Vec::new(),
            related: Vec::new(),
            detail: ItemDetail::Term {
                definition,
                wiki_link,
                letter,
                exam_importance: Importance::Medium,
                study_importance: Importance::Medium,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn is_term(&self) -> bool {
        matches!(self.detail, ItemDetail::Term { .. })
    }

    /// Set both importances of a term; for sections only the tier is set
    pub fn set_importances(&mut self, exam: Importance, study: Importance) {
        self.importance = exam;
        if let ItemDetail::Term { exam_importance, study_importance, .. } = &mut self.detail {
            *exam_importance = exam;
            *study_importance = study;
        }
    }

    /// The (exam, study) importance pair. Sections use their tier for both.
    pub fn importances(&self) -> (Importance, Importance) {
        match &self.detail {
            ItemDetail::Term { exam_importance, study_importance, .. } => (*exam_importance, *study_importance),
            ItemDetail::Section { .. } => (self.importance, self.importance),
        }
    }

    /// Primary chapter followed by every associated chapter, without duplicates
    pub fn effective_chapters(&self) -> Vec<&str> {
        let mut chapters: Vec<&str> = Vec::new();
        for chapter in self.chapter.iter().chain(self.all_chapters.iter()) {
            if !chapters.contains(&chapter.as_str()) {
                chapters.push(chapter);
            }
        }
        chapters
    }

    /// Main topic of a section, empty for terms
    pub fn main_topic(&self) -> &str {
        match &self.detail {
            ItemDetail::Section { main_topic, .. } => main_topic,
            ItemDetail::Term { .. } => "",
        }
    }
}

/// One `== Section ==` block of a note file
#[derive(Debug, Clone, Default)]
pub struct NoteSection {
    pub title: String,
    pub importance: Importance,
    pub content_lines: Vec<String>,
    pub key_terms: Vec<String>,
}

/// A parsed vimwiki note file
#[derive(Debug, Clone)]
pub struct NoteDocument {
    pub file_path: PathBuf,
    pub file_name: String,
    pub main_topic: String,
    pub tags: Vec<String>,
    pub sections: Vec<NoteSection>,
}

impl NoteDocument {
    /// Flatten the sections into study items, in file order
    pub fn to_items(&self) -> Vec<StudyItem> {
        self.sections
            .iter()
            .map(|section| {
                let mut item = StudyItem::section(
                    ItemId::new(&self.file_name, &section.title),
                    section.importance,
                    self.main_topic.clone(),
                    self.file_path.clone(),
                );
                item.content_lines = section.content_lines.len();
                item.key_terms = section.key_terms.clone();
                item.tags = self.tags.clone();
                item
            })
            .collect()
    }
}
