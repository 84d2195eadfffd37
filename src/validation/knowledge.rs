//! Read-only access to the Oracle knowledge base
//!
//! The knowledge base lives in `.oracle/knowledge/` as one JSON array per
//! category. Guardian never writes to it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCategory {
    Pattern,
    Preference,
    Gotcha,
    Solution,
    Correction,
}

impl KnowledgeCategory {
    pub const ALL: [KnowledgeCategory; 5] = [
        KnowledgeCategory::Pattern,
        KnowledgeCategory::Preference,
        KnowledgeCategory::Gotcha,
        KnowledgeCategory::Solution,
        KnowledgeCategory::Correction,
    ];

    /// File holding this category inside `knowledge/`
    pub fn file_name(&self) -> &'static str {
        match self {
            KnowledgeCategory::Pattern => "patterns.json",
            KnowledgeCategory::Preference => "preferences.json",
            KnowledgeCategory::Gotcha => "gotchas.json",
            KnowledgeCategory::Solution => "solutions.json",
            KnowledgeCategory::Correction => "corrections.json",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

fn default_category() -> KnowledgeCategory {
    KnowledgeCategory::Pattern
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Set from the file the entry was read from
    #[serde(skip_deserializing, default = "default_category")]
    pub category: KnowledgeCategory,
    #[serde(default)]
    pub priority: KnowledgePriority,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl KnowledgeEntry {
    pub fn new(
        category: KnowledgeCategory,
        priority: KnowledgePriority,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            category,
            priority,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            created: None,
        }
    }
}

/// Anything that can hand the validator a set of knowledge entries
pub trait KnowledgeSource {
    fn load_entries(&self) -> Vec<KnowledgeEntry>;
}

/// No knowledge available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKnowledge;

impl KnowledgeSource for NoKnowledge {
    fn load_entries(&self) -> Vec<KnowledgeEntry> {
        Vec::new()
    }
}

impl KnowledgeSource for Vec<KnowledgeEntry> {
    fn load_entries(&self) -> Vec<KnowledgeEntry> {
        self.clone()
    }
}

/// Knowledge stored under an `.oracle` directory
#[derive(Debug, Clone)]
pub struct FileKnowledgeBase {
    oracle_dir: PathBuf,
}

impl FileKnowledgeBase {
    pub fn new(oracle_dir: impl Into<PathBuf>) -> Self {
        Self {
            oracle_dir: oracle_dir.into(),
        }
    }

    pub fn knowledge_dir(&self) -> PathBuf {
        self.oracle_dir.join("knowledge")
    }
}

impl KnowledgeSource for FileKnowledgeBase {
    fn load_entries(&self) -> Vec<KnowledgeEntry> {
        let dir = self.knowledge_dir();
        let mut entries = Vec::new();

        for category in KnowledgeCategory::ALL {
            let path = dir.join(category.file_name());
            if path.exists() {
                entries.extend(read_category(&path, category));
            }
        }

        debug!("Loaded {} knowledge entries from {}", entries.len(), dir.display());
        entries
    }
}

/// Entries of one category file; unreadable files and malformed entries are skipped
fn read_category(path: &Path, category: KnowledgeCategory) -> Vec<KnowledgeEntry> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(e) => {
            warn!("Skipping malformed {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<KnowledgeEntry>(value) {
            Ok(mut entry) => {
                entry.category = category;
                Some(entry)
            }
            Err(e) => {
                debug!("Skipping entry in {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}
