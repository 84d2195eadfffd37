//! Common test utilities and helpers

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use guardian_core::StateStore;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Fresh state directory inside a temp dir
pub fn create_test_store() -> (TempDir, StateStore) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = StateStore::new(temp.path().join(".guardian"));
    (temp, store)
}

/// Fixed reference time so window arithmetic is deterministic
pub fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// Write one knowledge category file under `<oracle_dir>/knowledge/`
pub fn write_knowledge(oracle_dir: &Path, file_name: &str, body: &str) {
    let dir = oracle_dir.join("knowledge");
    fs::create_dir_all(&dir).expect("Failed to create knowledge dir");
    fs::write(dir.join(file_name), body).expect("Failed to write knowledge file");
}
