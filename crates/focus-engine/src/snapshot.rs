//! Throttled status snapshots for persistence

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SnapshotThrottle;
use crate::pose::GazeClass;
use crate::state::SessionState;
use crate::status::Status;

/// One persisted view of a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    pub gaze: GazeClass,
    pub faces_detected: usize,
    pub phone_detected: bool,
    pub focus_score: i32,
}

/// Decides on which cycles a snapshot goes out
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    throttle: SnapshotThrottle,
}

impl SnapshotRecorder {
    pub fn new(throttle: SnapshotThrottle) -> Self {
        Self { throttle }
    }

    /// Advance the throttle by one cycle; true when a snapshot is due
    pub fn tick(&self, state: &mut SessionState, now: DateTime<Utc>) -> bool {
        match self.throttle {
            SnapshotThrottle::EveryCycles { cycles } => {
                state.frame_counter += 1;
                if state.frame_counter >= cycles.max(1) {
                    state.frame_counter = 0;
                    true
                } else {
                    false
                }
            }
            SnapshotThrottle::Interval { millis } => {
                let interval = TimeDelta::milliseconds(i64::try_from(millis).unwrap_or(i64::MAX));
                let since = now.signed_duration_since(state.last_snapshot);
                if since < TimeDelta::zero() {
                    // Observation clock is behind the anchor: restart the interval here
                    state.last_snapshot = now;
                    false
                } else if since >= interval {
                    state.last_snapshot = now;
                    true
                } else {
                    false
                }
            }
        }
    }
}
