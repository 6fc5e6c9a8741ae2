//! Scoring, selection, review scheduling and progress statistics

pub mod review;
pub mod scoring;
pub mod selection;
pub mod stats;

pub use review::{advance, ReviewResult};
pub use scoring::{score, score_breakdown, ScoreBreakdown, ScoringProfile};
pub use selection::{select, ItemFilter, ScoredItem, SelectionMode};
pub use stats::{compute_statistics, due_for_review, DueItem, DueKind, StudyStatistics};
