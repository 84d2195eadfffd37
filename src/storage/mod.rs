//! File-resident state records
//!
//! Every piece of Guardian state (session metrics, configuration, acceptance
//! statistics, rejection history) is a single file inside the `.guardian`
//! directory. Invocations are short-lived and may run concurrently, so every
//! read-modify-write goes through [`StateStore::update`], which holds an
//! exclusive advisory lock on a sibling `.lock` file for the whole
//! load → mutate → save sequence. Writes go to a temp file and are renamed
//! into place, so plain readers never observe a half-written record and do
//! not need the lock.
//!
//! Unreadable or malformed records load as their default value; the caller's
//! workflow must never be blocked by Guardian state.

use crate::error::{GuardianError, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(10);

/// A value persisted as one file in the state directory
pub trait Record: Serialize + DeserializeOwned + Default {
    /// File name inside the state directory
    const FILE_NAME: &'static str;

    fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Repair invariants after decoding (clamping, trimming to caps)
    fn normalize(&mut self) {}
}

/// Exclusive lock on one record, released on drop
struct RecordLock {
    file: File,
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Directory of state records
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout: LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of<R: Record>(&self) -> PathBuf {
        self.dir.join(R::FILE_NAME)
    }

    /// Whether the record has ever been written
    pub fn exists<R: Record>(&self) -> bool {
        self.path_of::<R>().exists()
    }

    /// Load a record, falling back to its default when missing or corrupt
    pub fn load<R: Record>(&self) -> R {
        let path = self.path_of::<R>();
        let mut record = read_record::<R>(&path);
        record.normalize();
        record
    }

    /// Replace a record on disk
    pub fn save<R: Record>(&self, record: &R) -> Result<()> {
        let _lock = self.lock::<R>()?;
        write_atomic(&self.path_of::<R>(), &record.encode()?)
    }

    /// Write the default record unless one exists, under the record lock
    ///
    /// Returns whether a record was created.
    pub fn ensure<R: Record>(&self) -> Result<bool> {
        let _lock = self.lock::<R>()?;
        let path = self.path_of::<R>();
        if path.exists() {
            return Ok(false);
        }
        write_atomic(&path, &R::default().encode()?)?;
        Ok(true)
    }

    /// Load, mutate and save a record while holding its lock
    pub fn update<R, T, F>(&self, f: F) -> Result<T>
    where
        R: Record,
        F: FnOnce(&mut R) -> T,
    {
        let _lock = self.lock::<R>()?;
        let path = self.path_of::<R>();

        let mut record = read_record::<R>(&path);
        record.normalize();
        let out = f(&mut record);

        write_atomic(&path, &record.encode()?)?;
        Ok(out)
    }

    /// Like [`update`](Self::update) but never fails
    ///
    /// When the lock or the write fails the mutation is still applied to an
    /// in-memory copy so the caller can report on it; the failure is logged.
    pub fn update_best_effort<R, T, F>(&self, f: F) -> T
    where
        R: Record,
        F: Fn(&mut R) -> T,
    {
        match self.update::<R, T, _>(&f) {
            Ok(out) => out,
            Err(e) => {
                warn!("Failed to persist {}: {}", R::FILE_NAME, e);
                let mut record = self.load::<R>();
                f(&mut record)
            }
        }
    }

    fn lock<R: Record>(&self) -> Result<RecordLock> {
        fs::create_dir_all(&self.dir)?;

        let lock_path = self.dir.join(format!(".{}.lock", R::FILE_NAME));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false) // Lock file content doesn't matter, just the lock
            .open(&lock_path)?;

        let start = Instant::now();
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => break,
                Err(err) => {
                    if err.kind() != ErrorKind::WouldBlock
                        && err.raw_os_error() != fs2::lock_contended_error().raw_os_error()
                    {
                        return Err(err.into());
                    }
                    if start.elapsed() >= self.lock_timeout {
                        return Err(GuardianError::Lock(format!(
                            "timed out after {:?} waiting for {}",
                            self.lock_timeout,
                            lock_path.display()
                        )));
                    }
                    std::thread::sleep(LOCK_RETRY);
                }
            }
        }

        Ok(RecordLock { file })
    }
}

fn read_record<R: Record>(path: &Path) -> R {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} not found, using default", path.display());
            return R::default();
        }
        Err(e) => {
            warn!("Failed to read {}: {}, using default", path.display(), e);
            return R::default();
        }
    };

    match R::decode(&raw) {
        Ok(record) => record,
        Err(e) => {
            warn!("Malformed {}: {}, using default", path.display(), e);
            R::default()
        }
    }
}

/// Write content atomically by writing to a temp file first, then renaming.
///
/// Callers hold the record lock, so the temp name cannot collide.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("record");
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, content)?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Counter {
        value: u64,
        entries: Vec<String>,
    }

    impl Record for Counter {
        const FILE_NAME: &'static str = "counter.json";

        fn normalize(&mut self) {
            self.entries.truncate(3);
        }
    }

    #[test]
    fn test_missing_record_loads_default() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());

        assert!(!store.exists::<Counter>());
        assert_eq!(store.load::<Counter>(), Counter::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("nested"));

        let counter = Counter {
            value: 7,
            entries: vec!["a".into()],
        };
        store.save(&counter).unwrap();

        assert!(store.exists::<Counter>());
        assert_eq!(store.load::<Counter>(), counter);
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());
        fs::write(store.path_of::<Counter>(), "{ this is not valid json }").unwrap();

        assert_eq!(store.load::<Counter>(), Counter::default());

        // And an update on top of corrupt state starts fresh
        let value = store
            .update(|c: &mut Counter| {
                c.value += 1;
                c.value
            })
            .unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_normalize_runs_on_load() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::new(temp.path());
        fs::write(
            store.path_of::<Counter>(),
            r#"{"value": 1, "entries": ["a", "b", "c", "d", "e"]}"#,
        )
        .unwrap();

        assert_eq!(store.load::<Counter>().entries.len(), 3);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(StateStore::new(temp.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.update(|c: &mut Counter| c.value += 1).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load::<Counter>().value, 200);
    }

    #[test]
    fn test_ensure_never_replaces_a_written_record() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(StateStore::new(temp.path()));

        // Writers and initializers racing on a fresh directory
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        if i % 2 == 0 {
                            store.update(|c: &mut Counter| c.value += 1).unwrap();
                        } else {
                            store.ensure::<Counter>().unwrap();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load::<Counter>().value, 60);
        assert!(!store.ensure::<Counter>().unwrap());
    }

    #[test]
    fn test_update_best_effort_applies_in_memory_on_failure() {
        let temp = TempDir::new().unwrap();
        // A regular file where the state directory should be makes every
        // write fail
        let blocker = temp.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let store = StateStore::new(&blocker);

        let value = store.update_best_effort(|c: &mut Counter| {
            c.value += 5;
            c.value
        });
        assert_eq!(value, 5);
    }
}
