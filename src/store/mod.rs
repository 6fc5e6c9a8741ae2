//! Metadata store for review history
//!
//! The store is the only durable state: item definitions are rebuilt from
//! the sources on every run, and only their review records are persisted.

pub mod json_store;
pub mod models;

pub use json_store::{JsonMetadataStore, MemoryStore, MetadataStore};
pub use models::*;
