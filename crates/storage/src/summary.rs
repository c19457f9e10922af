//! Daily summary of persisted snapshots

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::SnapshotRecord;

/// Aggregate of a day's snapshots, the input for study reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub snapshots: usize,
    /// Snapshot count per status label
    pub by_status: BTreeMap<String, usize>,
    pub average_score: f64,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,
    /// Share of snapshots with a "Focused" status, 0..1
    pub focused_share: f64,
    pub phone_snapshots: usize,
}

impl DailySummary {
    pub fn from_records(records: &[SnapshotRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let mut by_status = BTreeMap::new();
        let mut focused = 0usize;
        let mut phone = 0usize;
        let mut total_score = 0i64;

        for record in records {
            *by_status.entry(record.status.clone()).or_insert(0) += 1;
            if record.status.starts_with("Focused") {
                focused += 1;
            }
            if record.phone_in_view() {
                phone += 1;
            }
            total_score += i64::from(record.focus_score);
        }

        let n = records.len();
        Self {
            snapshots: n,
            by_status,
            average_score: total_score as f64 / n as f64,
            min_score: records.iter().map(|r| r.focus_score).min(),
            max_score: records.iter().map(|r| r.focus_score).max(),
            focused_share: focused as f64 / n as f64,
            phone_snapshots: phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, phone: u8, score: i32) -> SnapshotRecord {
        SnapshotRecord {
            status: status.to_string(),
            phone_detected: phone,
            focus_score: score,
            ..SnapshotRecord::sample()
        }
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record("Focused (screen)", 0, 100),
            record("Focused (temporary glance away)", 0, 90),
            record("Not Focused (Phone Detected)", 1, 50),
            record("Focused (screen)", 0, 80),
        ];
        let summary = DailySummary::from_records(&records);

        assert_eq!(summary.snapshots, 4);
        assert_eq!(summary.by_status["Focused (screen)"], 2);
        assert_eq!(summary.phone_snapshots, 1);
        assert_eq!(summary.min_score, Some(50));
        assert_eq!(summary.max_score, Some(100));
        assert!((summary.average_score - 80.0).abs() < 1e-9);
        assert!((summary.focused_share - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DailySummary::from_records(&[]);
        assert_eq!(summary.snapshots, 0);
        assert_eq!(summary.min_score, None);
    }
}
