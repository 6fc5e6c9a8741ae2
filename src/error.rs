use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unreadable review history in {}: {source}", path.display())]
    UnreadableMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Notes directory not found: {}", .0.display())]
    NotesDirNotFound(PathBuf),

    #[error("Glossary file not found: {}", .0.display())]
    GlossaryNotFound(PathBuf),

    #[error("Could not determine data directory")]
    DataDirNotFound,

    #[error("Invalid importance level: {0}")]
    InvalidImportance(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
