//! Glossary parsing and term metadata
//!
//! A glossary is a vimwiki file of letter sections and term lines:
//! ```text
//! == C ==
//! * [[topics/capsid|Capsid]] :: Protein shell of a virus
//! ```
//! Static per-term data (chapter, importances, tags) comes from a YAML term
//! config. Topic files under `topics/` fill in chapters, tags and related
//! terms the config leaves out.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::models::{Importance, ItemId, StudyItem};
use crate::error::{PlannerError, Result};

/// Term configuration file (`glossary_config.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub terms: Option<BTreeMap<String, TermConfigEntry>>,
}

impl TermConfigFile {
    pub fn get(&self, term: &str) -> Option<&TermConfigEntry> {
        self.terms.as_ref().and_then(|terms| terms.get(term))
    }

    pub fn len(&self) -> usize {
        self.terms.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Static data for one term
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermConfigEntry {
    /// Chapter, written in YAML as either a number or a string
    #[serde(default)]
    pub chapter: Option<serde_yaml::Value>,
    #[serde(default)]
    pub exam_importance: Option<String>,
    #[serde(default)]
    pub study_importance: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TermConfigEntry {
    /// Chapter normalised to a string; null and blank values are absent
    pub fn chapter(&self) -> Option<String> {
        let chapter = match self.chapter.as_ref()? {
            serde_yaml::Value::String(s) => s.trim().to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if chapter.is_empty() {
            None
        } else {
            Some(chapter)
        }
    }
}

/// Metadata harvested from one `topics/*.wiki` file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicMetadata {
    pub chapters: Vec<String>,
    pub tags: Vec<String>,
    pub related_terms: Vec<String>,
}

/// Outcome of loading a glossary
#[derive(Debug, Clone, Default)]
pub struct GlossaryScan {
    pub items: Vec<StudyItem>,
    /// Number of topic files that contributed metadata
    pub enriched: usize,
    /// Number of terms in the static config
    pub configured: usize,
}

/// Problems found in a term config
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Title casing that capitalises every letter following a non-letter
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Extract chapters, tags and related terms from the text of a topic file
pub fn extract_topic_metadata(content: &str) -> TopicMetadata {
    let chapter_re = Regex::new(r"(?i)(?:Ch\.?\s*|Chapter\s+)(\d+)").unwrap();
    let tag_re = Regex::new(r"(?i)^Tags?\s*:\s*(.+)").unwrap();
    let link_re = Regex::new(r"\[\[([^|\]]+)(?:\|[^\]]+)?\]\]").unwrap();

    let mut metadata = TopicMetadata::default();

    for line in content.lines() {
        let line = line.trim();

        for caps in chapter_re.captures_iter(line) {
            let chapter = caps[1].to_string();
            if !metadata.chapters.contains(&chapter) {
                metadata.chapters.push(chapter);
            }
        }

        if let Some(caps) = tag_re.captures(line) {
            metadata
                .tags
                .extend(caps[1].split(',').map(|t| t.trim().to_string()));
        }

        for caps in link_re.captures_iter(line) {
            if let Some(target) = caps[1].strip_prefix("topics/") {
                let term = title_case(&target.replace('_', " "));
                if !metadata.related_terms.contains(&term) {
                    metadata.related_terms.push(term);
                }
            }
        }
    }

    metadata
}

/// Scan a topics directory, keyed by the title-cased file stem
pub fn scan_topics_dir(topics_dir: &Path) -> HashMap<String, TopicMetadata> {
    let mut topics = HashMap::new();
    let entries = match fs::read_dir(topics_dir) {
        Ok(entries) => entries,
        Err(_) => {
            log::debug!("No topics directory at {}", topics_dir.display());
            return topics;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "wiki") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(content) => {
                topics.insert(title_case(&stem.replace('_', " ")), extract_topic_metadata(&content));
            }
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }
    }

    topics
}

/// Load a term config file. A missing or malformed file yields an empty config.
pub fn load_term_config(path: &Path) -> TermConfigFile {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            log::debug!("No term config at {}", path.display());
            return TermConfigFile::default();
        }
    };
    match serde_yaml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Could not parse term config {}: {}", path.display(), e);
            TermConfigFile::default()
        }
    }
}

/// Read a term config strictly, for validation
pub fn read_term_config(path: &Path) -> Result<TermConfigFile> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Parse glossary text into term items, layering config and topic metadata
pub fn parse_glossary(
    source: &str,
    content: &str,
    config: &TermConfigFile,
    topics: &HashMap<String, TopicMetadata>,
) -> Vec<StudyItem> {
    let letter_re = Regex::new(r"^==\s*([A-Z])\s*==").unwrap();
    let term_re = Regex::new(r"^\*\s*\[\[([^|]+)\|([^\]]+)\]\]\s*::\s*(.+)").unwrap();

    let mut items: Vec<StudyItem> = Vec::new();
    let mut letter: Option<char> = None;

    for line in content.lines() {
        if let Some(caps) = letter_re.captures(line) {
            letter = caps[1].chars().next();
            continue;
        }

        let Some(caps) = term_re.captures(line) else {
            continue;
        };
        let wiki_link = caps[1].to_string();
        let name = caps[2].to_string();
        let definition = caps[3].to_string();

        let mut item = StudyItem::term(ItemId::new(source, &name), definition, wiki_link, letter);

        if let Some(entry) = config.get(&name) {
            item.chapter = entry.chapter();
            let exam = entry.exam_importance.as_deref().map(importance_or_warn).unwrap_or_default();
            let study = entry.study_importance.as_deref().map(importance_or_warn).unwrap_or_default();
            item.set_importances(exam, study);
            item.tags = entry.tags.clone();
        }

        if let Some(topic) = topics.get(&name) {
            if item.chapter.is_none() {
                item.chapter = topic.chapters.first().cloned();
            }
            if item.tags.is_empty() {
                item.tags = topic.tags.clone();
            }
            item.related = topic.related_terms.clone();
            item.all_chapters = topic.chapters.clone();
        }

        match items.iter().position(|existing| existing.id == item.id) {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
    }

    items
}

fn importance_or_warn(value: &str) -> Importance {
    Importance::parse(value).unwrap_or_else(|| {
        log::warn!("Unknown importance '{}', using medium", value);
        Importance::Medium
    })
}

/// Load the glossary file together with its term config and topics directory
pub fn load_glossary(glossary_path: &Path, term_config: Option<&Path>, topics_dir: Option<&Path>) -> Result<GlossaryScan> {
    if !glossary_path.exists() {
        return Err(PlannerError::GlossaryNotFound(glossary_path.to_path_buf()));
    }
    let content = fs::read_to_string(glossary_path)?;

    let config = term_config.map(load_term_config).unwrap_or_default();
    let topics = topics_dir.map(scan_topics_dir).unwrap_or_default();
    let source = glossary_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "glossary.wiki".to_string());

    let items = parse_glossary(&source, &content, &config, &topics);
    log::info!("Parsed {} terms from glossary", items.len());
    if !topics.is_empty() {
        log::info!("Enhanced {} terms with topics directory metadata", topics.len());
    }
    if !config.is_empty() {
        log::info!("Loaded {} terms from term config", config.len());
    }

    Ok(GlossaryScan {
        items,
        enriched: topics.len(),
        configured: config.len(),
    })
}

fn yaml_scalar(value: &str) -> Result<String> {
    Ok(serde_yaml::to_string(value)?.trim_end().to_string())
}

/// Render a term config skeleton for every term, grouped by chapter
pub fn generate_term_config(items: &[StudyItem]) -> Result<String> {
    let mut terms: Vec<&StudyItem> = items.iter().filter(|i| i.is_term()).collect();
    // Unassigned terms sort after every chapter
    terms.sort_by(|a, b| {
        let key_a = (a.chapter.is_none(), a.chapter.as_deref().unwrap_or(""), a.name());
        let key_b = (b.chapter.is_none(), b.chapter.as_deref().unwrap_or(""), b.name());
        key_a.cmp(&key_b)
    });

    let mut out = String::new();
    out.push_str("# Glossary Term Metadata Configuration\n");
    out.push_str("# This file controls chapter assignments, importance levels, and tags\n");
    out.push_str("# for all glossary terms.\n\n");
    out.push_str("metadata_version: '1.0'\n");
    out.push_str("description: Glossary term metadata configuration\n\n");
    out.push_str("terms:\n");

    let mut current: Option<Option<&str>> = None;
    for item in terms {
        let chapter = item.chapter.as_deref();
        if current != Some(chapter) {
            match chapter {
                Some(ch) => out.push_str(&format!("\n  # === Chapter {} Terms ===\n", ch)),
                None => out.push_str("\n  # === Unassigned Terms ===\n"),
            }
            current = Some(chapter);
        }

        let (exam, study) = item.importances();
        out.push_str(&format!("  {}:\n", yaml_scalar(item.name())?));
        match chapter {
            Some(ch) => out.push_str(&format!("    chapter: {}\n", yaml_scalar(ch)?)),
            None => out.push_str("    chapter: null\n"),
        }
        out.push_str(&format!("    exam_importance: {}\n", exam));
        out.push_str(&format!("    study_importance: {}\n", study));
        let tags = item
            .tags
            .iter()
            .map(|t| yaml_scalar(t))
            .collect::<Result<Vec<_>>>()?;
        out.push_str(&format!("    tags: [{}]\n", tags.join(", ")));
        out.push_str("    notes: ''\n");
    }

    Ok(out)
}

/// Check a term config against the parsed glossary
pub fn validate_term_config(config: &TermConfigFile, items: &[StudyItem]) -> ConfigReport {
    let mut report = ConfigReport::default();

    let Some(terms) = config.terms.as_ref() else {
        report.errors.push("Missing 'terms' section in config".to_string());
        return report;
    };

    for (name, entry) in terms {
        if !items.iter().any(|i| i.is_term() && i.name() == name) {
            report.warnings.push(format!("Term '{}' not found in glossary", name));
        }
        for (field, value) in [
            ("exam_importance", &entry.exam_importance),
            ("study_importance", &entry.study_importance),
        ] {
            if let Some(value) = value {
                if Importance::parse(value).is_none() {
                    report
                        .errors
                        .push(format!("Invalid {} for '{}': {}", field, name, value));
                }
            }
        }
    }

    report
}
