//! Append-only CSV log, one file per day

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::record::{SnapshotRecord, CSV_HEADER};
use crate::{SnapshotSink, StorageError};

/// RFC 4180 record terminator
const LINE_END: &str = "\r\n";

/// Writes `<dir>/<YYYY-MM-DD>.csv`, adding the header when a day's file
/// is first created.
#[derive(Debug)]
pub struct DailyCsvLog {
    dir: PathBuf,
    // Serializes header check and append across sessions
    write_lock: Mutex<()>,
}

impl DailyCsvLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        info!("Focus log directory: {}", dir.display());
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a record for `day` (YYYY-MM-DD) goes to
    pub fn path_for_day(&self, day: &str) -> PathBuf {
        self.dir.join(format!("{day}.csv"))
    }

    fn io_err(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl SnapshotSink for DailyCsvLog {
    fn append(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_err(&self.dir, e))?;

        let path = self.path_for_day(&record.day());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Self::io_err(&path, e))?;

        let is_new = file.metadata().map_err(|e| Self::io_err(&path, e))?.len() == 0;

        let mut buf = String::new();
        if is_new {
            debug!("Starting new focus log {}", path.display());
            buf.push_str(&CSV_HEADER.join(","));
            buf.push_str(LINE_END);
        }
        buf.push_str(&record.to_csv_row());
        buf.push_str(LINE_END);

        file.write_all(buf.as_bytes()).map_err(|e| Self::io_err(&path, e))
    }
}
