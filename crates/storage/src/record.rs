//! Persisted snapshot record

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column order of the daily log
pub const CSV_HEADER: [&str; 6] = [
    "timestamp",
    "status",
    "gaze_status",
    "faces_detected",
    "phone_detected",
    "focus_score",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the focus log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Local wall-clock time of the snapshot
    #[serde(with = "local_timestamp")]
    pub timestamp: NaiveDateTime,
    pub status: String,
    pub gaze_status: String,
    pub faces_detected: u32,
    /// 0 or 1
    pub phone_detected: u8,
    pub focus_score: i32,
}

impl SnapshotRecord {
    /// Day key used for the log file name
    pub fn day(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn phone_in_view(&self) -> bool {
        self.phone_detected != 0
    }

    /// CSV line without the trailing newline
    pub fn to_csv_row(&self) -> String {
        [
            self.timestamp_string(),
            self.status.clone(),
            self.gaze_status.clone(),
            self.faces_detected.to_string(),
            self.phone_detected.to_string(),
            self.focus_score.to_string(),
        ]
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// Quote fields containing separators, quotes or line breaks
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

mod local_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
impl SnapshotRecord {
    pub(crate) fn sample() -> Self {
        Self {
            timestamp: chrono::NaiveDate::from_ymd_opt(2026, 10, 18)
                .and_then(|d| d.and_hms_opt(9, 30, 0))
                .unwrap(),
            status: "Focused (screen)".to_string(),
            gaze_status: "screen".to_string(),
            faces_detected: 1,
            phone_detected: 0,
            focus_score: 87,
        }
    }
}
