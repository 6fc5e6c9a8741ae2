//! Whole-file metadata persistence
//!
//! The store is read once per session and rewritten in full after every
//! mutation. There is no locking: two overlapping invocations race on the
//! file and the last writer wins.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use super::models::ReviewBook;
use crate::error::{PlannerError, Result};

/// Loads and saves the full set of review records
pub trait MetadataStore {
    fn load(&self) -> Result<ReviewBook>;
    fn save(&self, book: &ReviewBook) -> Result<()>;
}

/// Pretty-printed JSON file store
pub struct JsonMetadataStore {
    path: PathBuf,
}

impl JsonMetadataStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataStore for JsonMetadataStore {
    fn load(&self) -> Result<ReviewBook> {
        if !self.path.exists() {
            log::debug!("No metadata at {}, starting empty", self.path.display());
            return Ok(ReviewBook::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let book: ReviewBook = serde_json::from_str(&content).map_err(|source| PlannerError::UnreadableMetadata {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Loaded {} review records from {}", book.len(), self.path.display());
        Ok(book)
    }

    fn save(&self, book: &ReviewBook) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(book)?)?;
        Ok(())
    }
}

/// In-memory store, counting saves
#[derive(Default)]
pub struct MemoryStore {
    book: RefCell<ReviewBook>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new(book: ReviewBook) -> Self {
        Self {
            book: RefCell::new(book),
            saves: Cell::new(0),
        }
    }

    pub fn snapshot(&self) -> ReviewBook {
        self.book.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl MetadataStore for MemoryStore {
    fn load(&self) -> Result<ReviewBook> {
        Ok(self.book.borrow().clone())
    }

    fn save(&self, book: &ReviewBook) -> Result<()> {
        *self.book.borrow_mut() = book.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
