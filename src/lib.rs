//! Study planning for vimwiki notes and glossaries.
//!
//! Notes and glossary terms are parsed into [`document::StudyItem`]s, joined
//! with their persisted [`store::ReviewRecord`]s, scored, and selected into a
//! study plan. Reviewing an item advances it along a fixed spaced-repetition
//! interval table.

pub mod config;
pub mod document;
pub mod error;
pub mod planner;
pub mod schedule;
pub mod store;
pub mod study;

pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use planner::{PlanRequest, PlanStatus, ReviewOutcome, StudyAgenda, StudyPlan, StudyPlanner};
