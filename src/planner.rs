//! Study session over one set of items and their review history
//!
//! [`StudyPlanner`] joins the items parsed for this run with the review
//! records of its [`MetadataStore`], builds plans from them and writes every
//! review back to the store as soon as it happens.

use std::fmt;

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

use crate::document::{ItemId, StudyItem};
use crate::error::Result;
use crate::schedule::{resolve_deadline, upcoming_assignments, Agenda, Assignment, ScheduleProvider, UpcomingDeadline};
use crate::store::{MetadataStore, ReviewBook};
use crate::study::{
    advance, compute_statistics, due_for_review, score, select, DueItem, ItemFilter, ReviewResult, ScoredItem,
    ScoringProfile, SelectionMode, StudyStatistics,
};

/// Most due items listed on the combined agenda
pub const AGENDA_REVIEW_LIMIT: usize = 10;

/// Upcoming assignments together with the head of the review queue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyAgenda {
    pub assignments: Agenda,
    pub reviews: Vec<DueItem>,
    /// Length of the whole review queue
    pub total_due: usize,
}

impl StudyAgenda {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.reviews.is_empty()
    }
}

/// What to put in a plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub target: usize,
    /// Explicit filters; `deadline_chapters` is filled in by the planner
    pub filter: ItemFilter,
    pub mode: SelectionMode,
    /// Restrict to the chapters of the next assignment when no chapter or
    /// tag filter is given
    pub use_deadline: bool,
}

impl PlanRequest {
    /// Note sections: top scores, or a random draw that favors high importance
    pub fn notes(target: usize, randomize: bool, focus_high_importance: bool) -> Self {
        let mode = match (randomize, focus_high_importance) {
            (false, _) => SelectionMode::TopN,
            (true, true) => SelectionMode::ImportanceSplit,
            (true, false) => SelectionMode::Random,
        };
        Self {
            target,
            filter: ItemFilter::default(),
            mode,
            use_deadline: false,
        }
    }

    /// Glossary terms: top scores, or a score-weighted draw
    pub fn terms(target: usize, filter: ItemFilter, randomize: bool, use_deadline: bool) -> Self {
        Self {
            target,
            filter,
            mode: if randomize { SelectionMode::ScoreWeighted } else { SelectionMode::TopN },
            use_deadline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanStatus {
    Ready,
    /// Nothing was parsed from the sources
    NoItems,
    /// Items exist but none passed the filters
    NoEligibleItems,
}

/// Why the plan contains what it contains
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanContext {
    Deadline { name: String, chapters: Vec<String> },
    DeadlineWithoutChapters { name: String },
    NoUpcomingDeadline,
    Chapter { chapter: String },
    Tag { tag: String },
    General,
}

impl fmt::Display for PlanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deadline { name, chapters } => {
                write!(f, "Focusing on {}. Relevant chapters: {}", name, chapters.join(", "))
            }
            Self::DeadlineWithoutChapters { name } => {
                write!(f, "Assignment '{}' has no chapters listed. Showing general terms.", name)
            }
            Self::NoUpcomingDeadline => f.write_str("No upcoming deadlines found. Showing highest priority general terms."),
            Self::Chapter { chapter } => write!(f, "Filtering by Chapter {}.", chapter),
            Self::Tag { tag } => write!(f, "Filtering by tag: '{}'.", tag),
            Self::General => f.write_str("No specific filters or upcoming deadlines. Showing highest priority general terms."),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub entries: Vec<ScoredItem>,
    pub status: PlanStatus,
    pub context: Option<PlanContext>,
    pub deadline: Option<UpcomingDeadline>,
    /// Items that passed the filters
    pub eligible: usize,
}

/// How to find the item a review refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLookup {
    Id(ItemId),
    /// Note file, with or without the `.wiki` suffix, and section title
    Section { file: String, section: String },
    /// Glossary term name, matched exactly first and then ignoring case
    Term(String),
}

impl fmt::Display for ItemLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Section { file, section } => write!(f, "{} - {}", file, section),
            Self::Term(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ReviewOutcome {
    Reviewed { id: ItemId, result: ReviewResult },
    NotFound { message: String },
}

impl ReviewOutcome {
    pub fn is_reviewed(&self) -> bool {
        matches!(self, Self::Reviewed { .. })
    }
}

pub struct StudyPlanner<S: MetadataStore> {
    profile: ScoringProfile,
    items: Vec<StudyItem>,
    book: ReviewBook,
    store: S,
    schedule: Option<Box<dyn ScheduleProvider>>,
}

impl<S: MetadataStore> StudyPlanner<S> {
    /// Load the review history from `store` and join it with `items`
    pub fn new(profile: ScoringProfile, items: Vec<StudyItem>, store: S) -> Result<Self> {
        let book = store.load()?;
        log::debug!("Loaded {} review records for {} items", book.len(), items.len());
        Ok(Self {
            profile,
            items,
            book,
            store,
            schedule: None,
        })
    }

    /// Attach the assignment schedule used for deadline filtering
    pub fn with_schedule(mut self, schedule: impl ScheduleProvider + 'static) -> Self {
        self.schedule = Some(Box::new(schedule));
        self
    }

    pub fn profile(&self) -> ScoringProfile {
        self.profile
    }

    pub fn items(&self) -> &[StudyItem] {
        &self.items
    }

    pub fn book(&self) -> &ReviewBook {
        &self.book
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Next assignment due today or later, if a schedule is attached
    pub fn upcoming_deadline(&self, today: NaiveDate) -> Option<UpcomingDeadline> {
        let schedule = self.schedule.as_ref()?;
        match schedule.load_assignments() {
            Ok(assignments) => resolve_deadline(&assignments, today),
            Err(e) => {
                log::warn!("Could not load assignments: {}", e);
                None
            }
        }
    }

    /// Score every item passing `filter`, in item order
    pub fn score_items(&self, filter: &ItemFilter, today: NaiveDate) -> Vec<ScoredItem> {
        self.items
            .iter()
            .filter(|item| filter.matches(item))
            .map(|item| {
                let record = self.book.get_or_default(&item.id);
                let score = score(item, &record, self.profile, today);
                ScoredItem {
                    item: item.clone(),
                    record,
                    score,
                }
            })
            .collect()
    }

    pub fn generate_plan<R: Rng + ?Sized>(&self, request: &PlanRequest, today: NaiveDate, rng: &mut R) -> StudyPlan {
        let mut filter = request.filter.clone();
        let mut deadline = None;

        let context = if request.use_deadline && filter.chapter.is_none() && filter.tag.is_none() {
            deadline = self.upcoming_deadline(today);
            Some(match &deadline {
                Some(d) if !d.chapters.is_empty() => {
                    filter.deadline_chapters = d.chapters.clone();
                    PlanContext::Deadline {
                        name: d.name.clone(),
                        chapters: d.chapters.clone(),
                    }
                }
                Some(d) => PlanContext::DeadlineWithoutChapters { name: d.name.clone() },
                None => PlanContext::NoUpcomingDeadline,
            })
        } else if let Some(chapter) = &filter.chapter {
            Some(PlanContext::Chapter { chapter: chapter.clone() })
        } else if let Some(tag) = &filter.tag {
            Some(PlanContext::Tag { tag: tag.clone() })
        } else if self.profile == ScoringProfile::Glossary {
            Some(PlanContext::General)
        } else {
            None
        };

        if self.items.is_empty() {
            return StudyPlan {
                entries: Vec::new(),
                status: PlanStatus::NoItems,
                context,
                deadline,
                eligible: 0,
            };
        }

        let scored = self.score_items(&filter, today);
        let eligible = scored.len();
        log::debug!("{} of {} items eligible", eligible, self.items.len());

        if scored.is_empty() {
            return StudyPlan {
                entries: Vec::new(),
                status: PlanStatus::NoEligibleItems,
                context,
                deadline,
                eligible,
            };
        }

        StudyPlan {
            entries: select(scored, request.target, request.mode, rng),
            status: PlanStatus::Ready,
            context,
            deadline,
            eligible,
        }
    }

    fn find_item(&self, lookup: &ItemLookup) -> Option<&StudyItem> {
        match lookup {
            ItemLookup::Id(id) => self.items.iter().find(|item| &item.id == id),
            ItemLookup::Section { file, section } => {
                let file = if file.ends_with(".wiki") {
                    file.clone()
                } else {
                    format!("{}.wiki", file)
                };
                self.items
                    .iter()
                    .find(|item| !item.is_term() && item.id.source == file && item.id.name == *section)
            }
            ItemLookup::Term(name) => {
                let terms = || self.items.iter().filter(|item| item.is_term());
                terms()
                    .find(|item| item.id.name == *name)
                    .or_else(|| terms().find(|item| item.id.name.to_lowercase() == name.to_lowercase()))
            }
        }
    }

    /// Record a review of the item and persist the history at once.
    ///
    /// An unknown item is reported as [`ReviewOutcome::NotFound`]; only a
    /// failing store is an error.
    pub fn mark_reviewed(&mut self, lookup: &ItemLookup, mastery_gain: i32, today: NaiveDate) -> Result<ReviewOutcome> {
        let Some(item) = self.find_item(lookup) else {
            let what = match self.profile {
                ScoringProfile::Notes => "Section",
                ScoringProfile::Glossary => "Term",
            };
            return Ok(ReviewOutcome::NotFound {
                message: format!("{} '{}' not found", what, lookup),
            });
        };
        let id = item.id.clone();

        let result = advance(&self.book.get_or_default(&id), mastery_gain, self.profile, today);

        let mut book = self.book.clone();
        book.insert(&id, result.record.clone());
        self.store.save(&book)?;
        self.book = book;

        log::info!("Reviewed {}, next review {}", id, result.next_review);
        Ok(ReviewOutcome::Reviewed { id, result })
    }

    pub fn compute_statistics(&self) -> StudyStatistics {
        compute_statistics(&self.items, &self.book, self.profile)
    }

    pub fn due_for_review(&self, today: NaiveDate) -> Vec<DueItem> {
        due_for_review(&self.items, &self.book, today)
    }

    /// Assignments split around `window_days`, plus the first `review_limit`
    /// items of the review queue
    pub fn agenda(&self, assignments: &[Assignment], today: NaiveDate, window_days: i64, review_limit: usize) -> StudyAgenda {
        let mut reviews = self.due_for_review(today);
        let total_due = reviews.len();
        reviews.truncate(review_limit);

        StudyAgenda {
            assignments: upcoming_assignments(assignments, today, window_days),
            reviews,
            total_due,
        }
    }
}
