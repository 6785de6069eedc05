//! JSON file store for paper records
//!
//! Every operation reads the whole file and mutations rewrite it. Writers in
//! this process are serialized; separate processes sharing the file still
//! race and the last writer wins.

use super::models::PaperRecord;
use super::timestamp::{now_timestamp, sort_key};
use crate::errors::{AppError, Result};
use crate::metrics;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// State of the backing file at the last read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    /// No file yet
    Missing,
    Loaded,
    /// File exists but is not a JSON array of records
    Corrupt { reason: String },
}

/// Records plus what was found on disk
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub records: Vec<PaperRecord>,
    pub status: StoreStatus,
}

/// Paper store backed by a single JSON file
#[derive(Debug)]
pub struct PaperStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PaperStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and report whether it was missing, valid or corrupt
    pub fn load_snapshot(&self) -> StoreSnapshot {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return StoreSnapshot {
                    records: Vec::new(),
                    status: StoreStatus::Missing,
                };
            }
            Err(e) => {
                return StoreSnapshot {
                    records: Vec::new(),
                    status: StoreStatus::Corrupt { reason: e.to_string() },
                };
            }
        };

        match serde_json::from_str::<Vec<PaperRecord>>(&raw) {
            Ok(records) => StoreSnapshot {
                records,
                status: StoreStatus::Loaded,
            },
            Err(e) => StoreSnapshot {
                records: Vec::new(),
                status: StoreStatus::Corrupt { reason: e.to_string() },
            },
        }
    }

    /// All records in insertion order.
    ///
    /// A missing or unreadable file yields an empty set. Corruption is logged
    /// so it is never silent; use [`PaperStore::load_snapshot`] to tell the
    /// cases apart.
    pub fn load(&self) -> Vec<PaperRecord> {
        let snapshot = self.load_snapshot();
        if let StoreStatus::Corrupt { reason } = &snapshot.status {
            warn!(
                path = %self.path.display(),
                reason = %reason,
                "Paper store is unreadable, treating as empty"
            );
        }
        snapshot.records
    }

    /// Replace the file contents with `records`.
    ///
    /// The new content is written to a sibling temp file and renamed over the
    /// target, so readers never see a partial write.
    pub fn save(&self, records: &[PaperRecord]) -> Result<()> {
        let _guard = self.lock();
        self.preserve_if_corrupt()?;
        self.write_all(records)
    }

    /// Insert a record unless its id is already stored.
    ///
    /// Assigns `timestamp` when absent. Returns whether the record was added.
    #[instrument(skip(self, record), fields(paper_id = %record.id))]
    pub fn add(&self, mut record: PaperRecord) -> Result<bool> {
        let _guard = self.lock();
        let mut records = self.load_for_write()?;

        if record.timestamp.is_none() {
            record.timestamp = Some(now_timestamp());
        }

        if records.iter().any(|r| r.id == record.id) {
            debug!("Paper already stored, skipping");
            metrics::record_store_op("add_duplicate");
            return Ok(false);
        }

        records.push(record);
        self.write_all(&records)?;
        metrics::record_store_op("add");
        Ok(true)
    }

    /// All records, newest first. Ties keep insertion order.
    pub fn history(&self, limit: Option<usize>) -> Vec<PaperRecord> {
        let mut records = self.load();
        records.sort_by(|a, b| {
            sort_key(b.timestamp.as_deref()).cmp(&sort_key(a.timestamp.as_deref()))
        });
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        records
    }

    /// Look up one record by id
    pub fn get(&self, id: &str) -> Option<PaperRecord> {
        self.load().into_iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock();
        let mut records = self.load_for_write()?;
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            return Ok(false);
        }

        self.write_all(&records)?;
        metrics::record_store_op("delete");
        Ok(true)
    }

    /// Empty the store unconditionally
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock();
        self.preserve_if_corrupt()?;
        self.write_all(&[])?;
        metrics::record_store_op("clear");
        info!(path = %self.path.display(), "Paper store cleared");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // Writes are rename-based, so a poisoned lock leaves the file intact.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load for a mutation, copying a corrupt file aside first
    fn load_for_write(&self) -> Result<Vec<PaperRecord>> {
        let snapshot = self.load_snapshot();
        if let StoreStatus::Corrupt { reason } = &snapshot.status {
            warn!(
                path = %self.path.display(),
                reason = %reason,
                "Paper store is unreadable, starting from an empty set"
            );
            self.backup_corrupt()?;
        }
        Ok(snapshot.records)
    }

    fn preserve_if_corrupt(&self) -> Result<()> {
        if matches!(self.load_snapshot().status, StoreStatus::Corrupt { .. }) {
            self.backup_corrupt()?;
        }
        Ok(())
    }

    fn backup_corrupt(&self) -> Result<()> {
        let secs = chrono::Utc::now().timestamp();
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", secs));
        let backup = PathBuf::from(name);

        fs::copy(&self.path, &backup).map_err(|e| AppError::storage(&backup, e))?;
        warn!(backup = %backup.display(), "Corrupt paper store preserved");
        Ok(())
    }

    fn write_all(&self, records: &[PaperRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let json = serde_json::to_vec_pretty(records)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| AppError::storage(&self.path, e))?;
        tmp.write_all(&json)
            .and_then(|_| tmp.flush())
            .map_err(|e| AppError::storage(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| AppError::storage(&self.path, e.error))?;

        debug!(path = %self.path.display(), count = records.len(), "Paper store written");
        Ok(())
    }
}
