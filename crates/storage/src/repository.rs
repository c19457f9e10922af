//! Repository Implementation

use crate::record::SnapshotRecord;
use crate::{SnapshotSink, StorageError};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info};

/// In-memory snapshot history with a retention limit
pub struct Repository {
    snapshots: Mutex<VecDeque<SnapshotRecord>>,
    max_records: usize,
}

impl Repository {
    /// Create a new in-memory repository
    pub fn new(max_records: usize) -> Self {
        info!("Creating in-memory repository (retention: {} records)", max_records);
        Self {
            snapshots: Mutex::new(VecDeque::with_capacity(max_records.min(10_000))),
            max_records: max_records.max(1),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, VecDeque<SnapshotRecord>>, StorageError> {
        self.snapshots
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Insert a snapshot, dropping the oldest beyond retention
    pub fn insert(&self, record: SnapshotRecord) -> Result<(), StorageError> {
        let mut log = self.lock()?;

        while log.len() >= self.max_records {
            log.pop_front();
        }

        log.push_back(record);
        debug!("Stored snapshot ({} held)", log.len());
        Ok(())
    }

    /// Most recent snapshots, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<SnapshotRecord>, StorageError> {
        let log = self.lock()?;
        Ok(log.iter().rev().take(limit).cloned().collect())
    }

    /// Snapshots at or after a timestamp, oldest first
    pub fn since(&self, since: NaiveDateTime) -> Result<Vec<SnapshotRecord>, StorageError> {
        let log = self.lock()?;
        Ok(log.iter().filter(|r| r.timestamp >= since).cloned().collect())
    }

    /// Snapshots taken on one calendar day, oldest first
    pub fn on_day(&self, day: NaiveDate) -> Result<Vec<SnapshotRecord>, StorageError> {
        let log = self.lock()?;
        Ok(log.iter().filter(|r| r.timestamp.date() == day).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        if let Ok(mut log) = self.snapshots.lock() {
            log.clear();
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new(86_400)
    }
}

impl SnapshotSink for Repository {
    fn append(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
        self.insert(record.clone())
    }
}
