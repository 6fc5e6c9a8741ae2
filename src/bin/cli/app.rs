use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use studyplan_lib::document::{glossary, vimwiki, StudyItem};
use studyplan_lib::schedule::{Assignment, ScheduleProvider, YamlSchedule};
use studyplan_lib::store::JsonMetadataStore;
use studyplan_lib::study::ScoringProfile;
use studyplan_lib::{PlannerConfig, StudyPlanner};

/// Shared application state for CLI commands
pub struct App {
    pub config: PlannerConfig,
    pub today: NaiveDate,
}

impl App {
    /// Load the configuration and apply command line overrides
    pub fn new(config_path: Option<&Path>, notes_dir: Option<PathBuf>, glossary_file: Option<PathBuf>) -> Result<Self> {
        let mut config = PlannerConfig::discover(config_path).context("Failed to load configuration")?;
        if let Some(dir) = notes_dir {
            config.notes_dir = dir;
        }
        if let Some(file) = glossary_file {
            config.glossary_file = file;
        }

        Ok(Self {
            config,
            today: Local::now().date_naive(),
        })
    }

    /// Every section of every note file, in file order
    pub fn note_items(&self) -> Result<Vec<StudyItem>> {
        let scan = vimwiki::scan_notes(&self.config.notes_dir)
            .with_context(|| format!("Failed to scan {}", self.config.notes_dir.display()))?;

        let items: Vec<StudyItem> = scan.documents.iter().flat_map(|doc| doc.to_items()).collect();
        log::debug!("Files processed: {}", scan.files_processed);
        log::debug!("Total sections found: {}", items.len());

        if items.is_empty() {
            if scan.files_processed == 0 {
                log::warn!("No .wiki files found in {}", self.config.notes_dir.display());
            } else {
                log::warn!("Wiki files found but no parseable sections. Expected '= Main Topic =' and '== Subsection ==' headings");
            }
        }
        Ok(items)
    }

    pub fn glossary_items(&self) -> Result<Vec<StudyItem>> {
        let scan = glossary::load_glossary(
            &self.config.glossary_file,
            Some(&self.config.term_config),
            Some(&self.config.topics_dir),
        )
        .with_context(|| format!("Failed to load glossary {}", self.config.glossary_file.display()))?;

        log::debug!(
            "Loaded {} terms ({} configured, {} enriched from topics)",
            scan.items.len(),
            scan.configured,
            scan.enriched
        );
        Ok(scan.items)
    }

    pub fn notes_planner(&self) -> Result<StudyPlanner<JsonMetadataStore>> {
        let store = JsonMetadataStore::new(self.config.notes_metadata.clone());
        StudyPlanner::new(ScoringProfile::Notes, self.note_items()?, store).context("Failed to load study metadata")
    }

    pub fn glossary_planner(&self) -> Result<StudyPlanner<JsonMetadataStore>> {
        let store = JsonMetadataStore::new(self.config.glossary_metadata.clone());
        let planner = StudyPlanner::new(ScoringProfile::Glossary, self.glossary_items()?, store)
            .context("Failed to load glossary metadata")?;
        Ok(planner.with_schedule(YamlSchedule::new(self.config.plans_file.clone())))
    }

    pub fn assignments(&self) -> Result<Vec<Assignment>> {
        YamlSchedule::new(self.config.plans_file.clone())
            .load_assignments()
            .with_context(|| format!("Failed to read {}", self.config.plans_file.display()))
    }
}
