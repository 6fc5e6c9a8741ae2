//! Vimwiki note parsing
//!
//! Recognised structure:
//! ```text
//! = Main Topic =
//! :tag1:tag2:
//! == Section == {importance:high}
//! * term :: definition
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use super::models::{Importance, NoteDocument, NoteSection};
use crate::error::{PlannerError, Result};

/// Result of scanning a notes directory
#[derive(Debug, Clone, Default)]
pub struct NotesScan {
    pub files_processed: usize,
    pub documents: Vec<NoteDocument>,
}

struct NotePatterns {
    section: Regex,
    importance: Regex,
    topic: Regex,
    tags: Regex,
}

impl NotePatterns {
    fn new() -> Self {
        Self {
            section: Regex::new(r"^==\s*(.+?)\s*==.*$").unwrap(),
            importance: Regex::new(r"\{importance:(high|medium|low)\}").unwrap(),
            topic: Regex::new(r"^=\s([^=].*[^=])\s=$").unwrap(),
            tags: Regex::new(r"^:(.+):$").unwrap(),
        }
    }
}

/// Parse the text of a single note file
pub fn parse_note(file_path: &Path, content: &str) -> NoteDocument {
    let patterns = NotePatterns::new();
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut doc = NoteDocument {
        file_path: file_path.to_path_buf(),
        file_name,
        main_topic: String::new(),
        tags: Vec::new(),
        sections: Vec::new(),
    };
    let global_importance = Importance::default();
    let mut current: Option<usize> = None;

    for line in content.lines() {
        // Sections are matched before the main topic so `==` never reads as `=`
        if let Some(caps) = patterns.section.captures(line) {
            let title = caps[1].trim().to_string();
            let importance = patterns
                .importance
                .captures(line)
                .and_then(|c| Importance::parse(&c[1]))
                .unwrap_or(global_importance);

            let section = NoteSection {
                title: title.clone(),
                importance,
                ..Default::default()
            };
            // A repeated title restarts that section in place
            let index = match doc.sections.iter().position(|s| s.title == title) {
                Some(index) => {
                    doc.sections[index] = section;
                    index
                }
                None => {
                    doc.sections.push(section);
                    doc.sections.len() - 1
                }
            };
            current = Some(index);
            continue;
        }

        let trimmed = line.trim();

        if let Some(caps) = patterns.topic.captures(trimmed) {
            doc.main_topic = caps[1].trim().to_string();
            current = None;
            continue;
        }

        if let Some(caps) = patterns.tags.captures(trimmed) {
            doc.tags.extend(
                caps[1]
                    .trim()
                    .split(':')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            );
            continue;
        }

        if let Some(index) = current {
            if trimmed.is_empty() {
                continue;
            }
            let section = &mut doc.sections[index];
            section.content_lines.push(line.to_string());
            if let Some((term, _)) = line.split_once("::") {
                section.key_terms.push(term.trim().replace("* ", "").replace("- ", ""));
            }
        }
    }

    doc
}

/// Read and parse one note file
pub fn parse_note_file(file_path: &Path) -> Result<NoteDocument> {
    let content = fs::read_to_string(file_path)?;
    Ok(parse_note(file_path, &content))
}

/// Collect every `*.wiki` file below `notes_dir`, sorted by path
pub fn find_note_files(notes_dir: &Path) -> Result<Vec<PathBuf>> {
    if !notes_dir.exists() {
        return Err(PlannerError::NotesDirNotFound(notes_dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(notes_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", notes_dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "wiki"))
        .collect();

    files.sort();
    Ok(files)
}

/// Identity source of a note: its path below `notes_dir`, `/`-separated.
/// Top-level notes keep their bare file name.
pub fn note_key(notes_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(notes_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse every note file below `notes_dir`
pub fn scan_notes(notes_dir: &Path) -> Result<NotesScan> {
    let files = find_note_files(notes_dir)?;
    let mut scan = NotesScan::default();
    let mut seen = HashSet::new();

    for path in files {
        log::debug!("Processing: {}", path.display());
        let mut doc = parse_note_file(&path)?;
        doc.file_name = note_key(notes_dir, &path);
        for section in &doc.sections {
            if !seen.insert(format!("{}#{}", doc.file_name, section.title)) {
                log::warn!(
                    "Duplicate section '{}' in {}; both share one review record",
                    section.title,
                    doc.file_name
                );
            }
        }
        log::debug!(
            "  Main topic: '{}', sections: {:?}",
            doc.main_topic,
            doc.sections.iter().map(|s| s.title.as_str()).collect::<Vec<_>>()
        );
        scan.files_processed += 1;
        scan.documents.push(doc);
    }

    log::debug!(
        "Files processed: {}, sections found: {}",
        scan.files_processed,
        scan.documents.iter().map(|d| d.sections.len()).sum::<usize>()
    );
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
= Cell Biology =
:biology:cells:
== Mitosis == {importance:high}
* Prophase :: chromosomes condense
- Metaphase :: chromosomes align
Spindle fibres attach at the kinetochore.

== Meiosis ==
Two rounds of division.
";

    #[test]
    fn test_parse_note_structure() {
        let doc = parse_note(Path::new("notes/cells.wiki"), SAMPLE);

        assert_eq!(doc.file_name, "cells.wiki");
        assert_eq!(doc.main_topic, "Cell Biology");
        assert_eq!(doc.tags, vec!["biology", "cells"]);
        assert_eq!(doc.sections.len(), 2);

        let mitosis = &doc.sections[0];
        assert_eq!(mitosis.title, "Mitosis");
        assert_eq!(mitosis.importance, Importance::High);
        assert_eq!(mitosis.content_lines.len(), 3);
        assert_eq!(mitosis.key_terms, vec!["Prophase", "Metaphase"]);

        let meiosis = &doc.sections[1];
        assert_eq!(meiosis.importance, Importance::Medium);
        assert_eq!(meiosis.content_lines.len(), 1);
        assert!(meiosis.key_terms.is_empty());
    }

    #[test]
    fn test_main_topic_closes_section() {
        let content = "== First ==\nline a\n= Second Topic =\nstray line\n";
        let doc = parse_note(Path::new("a.wiki"), content);

        assert_eq!(doc.main_topic, "Second Topic");
        assert_eq!(doc.sections[0].content_lines, vec!["line a"]);
    }

    #[test]
    fn test_items_carry_file_tags() {
        let doc = parse_note(Path::new("cells.wiki"), SAMPLE);
        let items = doc.to_items();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.key(), "cells.wiki#Mitosis");
        assert_eq!(items[0].key_terms.len(), 2);
        assert_eq!(items[1].tags, vec!["biology", "cells"]);
        assert_eq!(items[1].main_topic(), "Cell Biology");
    }

    #[test]
    fn test_scan_notes_recursive() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("micro");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("cells.wiki"), SAMPLE).unwrap();
        fs::write(nested.join("viruses.wiki"), "= Viruses =\n== Capsids ==\nshell\n").unwrap();
        fs::write(temp.path().join("readme.md"), "# ignored").unwrap();

        let scan = scan_notes(temp.path()).unwrap();
        assert_eq!(scan.files_processed, 2);
        assert_eq!(scan.documents[0].file_name, "cells.wiki");
        assert_eq!(scan.documents[1].file_name, "micro/viruses.wiki");
        assert_eq!(scan.documents[1].sections[0].title, "Capsids");
    }

    #[test]
    fn test_same_name_in_subdirectories_stays_distinct() {
        let temp = TempDir::new().unwrap();
        for dir in ["a", "b"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
            fs::write(temp.path().join(dir).join("x.wiki"), "= X =\n== S ==\nline\n").unwrap();
        }

        let scan = scan_notes(temp.path()).unwrap();
        let keys: Vec<String> = scan
            .documents
            .iter()
            .flat_map(|doc| doc.to_items())
            .map(|item| item.id.key())
            .collect();
        assert_eq!(keys, vec!["a/x.wiki#S", "b/x.wiki#S"]);
    }

    #[test]
    fn test_scan_missing_dir() {
        let temp = TempDir::new().unwrap();
        let result = scan_notes(&temp.path().join("missing"));
        assert!(matches!(result, Err(PlannerError::NotesDirNotFound(_))));
    }
}
