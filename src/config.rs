//! Planner configuration
//!
//! Read from a TOML file; every field is optional. Relative paths are
//! resolved against the directory holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

pub const CONFIG_FILE_NAME: &str = "studyplan.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Directory scanned recursively for `*.wiki` notes
    pub notes_dir: PathBuf,
    /// Review history of note sections
    pub notes_metadata: PathBuf,
    pub glossary_file: PathBuf,
    /// Topic pages that enrich glossary terms
    pub topics_dir: PathBuf,
    /// Review history of glossary terms
    pub glossary_metadata: PathBuf,
    /// Static per-term chapter and importance settings
    pub term_config: PathBuf,
    /// Assignment schedule
    pub plans_file: PathBuf,
    pub default_sections: usize,
    pub default_terms: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("notes"),
            notes_metadata: PathBuf::from("data/study_metadata.json"),
            glossary_file: PathBuf::from("notes/glossary.wiki"),
            topics_dir: PathBuf::from("notes/topics"),
            glossary_metadata: PathBuf::from("notes/data/glossary_metadata.json"),
            term_config: PathBuf::from("config/glossary_config.yaml"),
            plans_file: PathBuf::from("plans/schedule.yaml"),
            default_sections: 5,
            default_terms: 10,
        }
    }
}

impl PlannerConfig {
    /// Parse TOML content; paths are left as written
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file, resolving its relative paths against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_paths(base))
    }

    /// Load `explicit` if given, else the per-user config file if present,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            log::debug!("Loading config from {}", path.display());
            return Self::load(path);
        }

        match default_config_path() {
            Ok(path) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            Ok(path) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => {
                log::debug!("{}, using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Make every relative path absolute under `base`
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.notes_dir);
        resolve(&mut self.notes_metadata);
        resolve(&mut self.glossary_file);
        resolve(&mut self.topics_dir);
        resolve(&mut self.glossary_metadata);
        resolve(&mut self.term_config);
        resolve(&mut self.plans_file);
        self
    }
}

/// Per-user data directory for the planner
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join("studyplan"))
        .ok_or(PlannerError::DataDirNotFound)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join(CONFIG_FILE_NAME))
}
