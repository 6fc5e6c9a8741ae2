//! Document model for study sources
//!
//! This module provides:
//! - Vimwiki note parsing into per-section study items
//! - Glossary parsing with term config and topic-file enrichment
//! - The `StudyItem` view shared by scoring and selection

pub mod glossary;
pub mod models;
pub mod vimwiki;

pub use models::*;
