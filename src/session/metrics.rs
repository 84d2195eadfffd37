//! Bounded per-session event record
//!
//! Only metrics are kept, never conversation content: line counts per file,
//! normalized error keys, edit timestamps and truncated correction messages.
//! Every collection is capped and evicts its oldest entries, so the record
//! stays small no matter how long a session runs.

use crate::storage::Record;
use crate::utils::string::take_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Events kept per file for code volume
pub const MAX_CODE_EVENTS: usize = 100;
/// Occurrences kept per error key
pub const MAX_ERROR_OCCURRENCES: usize = 50;
/// Edit timestamps kept per file
pub const MAX_EDIT_TIMESTAMPS: usize = 100;
/// Corrections kept per session
pub const MAX_CORRECTIONS: usize = 100;
/// Error keys are truncated to this many characters
pub const ERROR_KEY_MAX_CHARS: usize = 200;
/// Correction messages are truncated to this many characters
pub const CORRECTION_MAX_CHARS: usize = 500;

/// Append and evict from the front past `cap`
fn push_bounded<T>(deque: &mut VecDeque<T>, item: T, cap: usize) {
    deque.push_back(item);
    trim_front(deque, cap);
}

fn trim_front<T>(deque: &mut VecDeque<T>, cap: usize) {
    while deque.len() > cap {
        deque.pop_front();
    }
}

/// Normalize an error message to its tracking key
///
/// The key is the first line, trimmed, truncated to 200 characters.
pub fn normalize_error_key(message: &str) -> String {
    let first_line = message.split('\n').next().unwrap_or_default().trim();
    take_chars(first_line, ERROR_KEY_MAX_CHARS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEvent {
    pub timestamp: DateTime<Utc>,
    pub lines: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCodeVolume {
    pub total_lines: u64,
    pub events: VecDeque<CodeEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub occurrences: VecDeque<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEditRecord {
    pub count: u64,
    pub timestamps: VecDeque<DateTime<Utc>>,
}

impl FileEditRecord {
    /// Edits at or after `cutoff`
    pub fn edits_since(&self, cutoff: DateTime<Utc>) -> usize {
        self.timestamps.iter().filter(|ts| **ts >= cutoff).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// One observed session event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CodeWritten { file: String, lines: u32 },
    Error { message: String },
    FileEdit { file: String },
    Correction { message: String },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::CodeWritten { .. } => "code-written",
            SessionEvent::Error { .. } => "error",
            SessionEvent::FileEdit { .. } => "file-edit",
            SessionEvent::Correction { .. } => "correction",
        }
    }
}

/// Working memory of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Host-supplied session identifier, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub session_start: DateTime<Utc>,
    #[serde(default)]
    pub code_written: BTreeMap<String, FileCodeVolume>,
    #[serde(default)]
    pub errors: BTreeMap<String, ErrorRecord>,
    #[serde(default)]
    pub file_edits: BTreeMap<String, FileEditRecord>,
    #[serde(default)]
    pub corrections: VecDeque<Correction>,
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

impl SessionMetrics {
    /// Empty metrics for a session that started at `start`
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            session_id: None,
            session_start: start,
            code_written: BTreeMap::new(),
            errors: BTreeMap::new(),
            file_edits: BTreeMap::new(),
            corrections: VecDeque::new(),
        }
    }

    /// Drop everything and start a new session at `at`
    pub fn reset(&mut self, at: DateTime<Utc>) {
        *self = Self::starting_at(at);
    }

    /// Switch to `session_id`, resetting if a different session was active
    ///
    /// Returns true if the stored metrics were replaced.
    pub fn begin_session(&mut self, session_id: &str, at: DateTime<Utc>) -> bool {
        match self.session_id.as_deref() {
            Some(current) if current == session_id => false,
            Some(_) => {
                self.reset(at);
                self.session_id = Some(session_id.to_string());
                true
            }
            None => {
                self.session_id = Some(session_id.to_string());
                false
            }
        }
    }

    pub fn record_code_written(&mut self, file: &str, lines: u32, at: DateTime<Utc>) {
        let entry = self.code_written.entry(file.to_string()).or_default();
        entry.total_lines += u64::from(lines);
        push_bounded(
            &mut entry.events,
            CodeEvent {
                timestamp: at,
                lines,
            },
            MAX_CODE_EVENTS,
        );
    }

    /// Record an error, returning its normalized key
    pub fn record_error(&mut self, message: &str, at: DateTime<Utc>) -> String {
        let key = normalize_error_key(message);
        let entry = self.errors.entry(key.clone()).or_insert_with(|| ErrorRecord {
            count: 0,
            first_seen: at,
            last_seen: at,
            occurrences: VecDeque::new(),
        });
        entry.count += 1;
        entry.last_seen = at;
        push_bounded(&mut entry.occurrences, at, MAX_ERROR_OCCURRENCES);
        key
    }

    pub fn record_file_edit(&mut self, file: &str, at: DateTime<Utc>) {
        let entry = self.file_edits.entry(file.to_string()).or_default();
        entry.count += 1;
        push_bounded(&mut entry.timestamps, at, MAX_EDIT_TIMESTAMPS);
    }

    pub fn record_correction(&mut self, message: &str, at: DateTime<Utc>) {
        push_bounded(
            &mut self.corrections,
            Correction {
                timestamp: at,
                message: take_chars(message, CORRECTION_MAX_CHARS),
            },
            MAX_CORRECTIONS,
        );
    }

    /// Apply one event
    pub fn apply(&mut self, event: &SessionEvent, at: DateTime<Utc>) {
        match event {
            SessionEvent::CodeWritten { file, lines } => self.record_code_written(file, *lines, at),
            SessionEvent::Error { message } => {
                self.record_error(message, at);
            }
            SessionEvent::FileEdit { file } => self.record_file_edit(file, at),
            SessionEvent::Correction { message } => self.record_correction(message, at),
        }
    }

    pub fn total_errors(&self) -> u64 {
        self.errors.values().map(|e| e.count).sum()
    }

    pub fn total_lines_written(&self) -> u64 {
        self.code_written.values().map(|c| c.total_lines).sum()
    }

    /// Corrections at or after `cutoff`
    pub fn corrections_since(&self, cutoff: DateTime<Utc>) -> usize {
        self.corrections
            .iter()
            .filter(|c| c.timestamp >= cutoff)
            .count()
    }
}

impl Record for SessionMetrics {
    const FILE_NAME: &'static str = "session_state.json";

    fn normalize(&mut self) {
        for volume in self.code_written.values_mut() {
            trim_front(&mut volume.events, MAX_CODE_EVENTS);
        }
        for error in self.errors.values_mut() {
            trim_front(&mut error.occurrences, MAX_ERROR_OCCURRENCES);
        }
        for edits in self.file_edits.values_mut() {
            trim_front(&mut edits.timestamps, MAX_EDIT_TIMESTAMPS);
        }
        trim_front(&mut self.corrections, MAX_CORRECTIONS);
    }
}
