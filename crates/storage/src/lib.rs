//! Storage Layer
//!
//! Persists focus snapshots: one append-only CSV file per day, plus an
//! in-memory repository for recent history and daily summaries.

mod daily_log;
mod record;
mod repository;
mod summary;

pub use daily_log::DailyCsvLog;
pub use record::{SnapshotRecord, CSV_HEADER};
pub use repository::Repository;
pub use summary::DailySummary;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Destination for persisted snapshots
pub trait SnapshotSink: Send + Sync {
    fn append(&self, record: &SnapshotRecord) -> Result<(), StorageError>;
}

/// Writes every record to all inner sinks.
///
/// Every sink is attempted; the first failure is returned afterwards.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<std::sync::Arc<dyn SnapshotSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<std::sync::Arc<dyn SnapshotSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SnapshotSink for FanoutSink {
    fn append(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.append(record) {
                warn!("Snapshot sink failed: {}", e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the daily CSV logs; `None` disables file logging
    pub log_dir: Option<String>,
    /// Snapshots kept in memory
    pub max_records: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_dir: Some("focus_logs".to_string()),
            max_records: 86_400,
        }
    }
}
