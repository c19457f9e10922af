//! Cycle results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pose::{GazeClass, HeadPose};
use crate::snapshot::StatusSnapshot;
use crate::status::Status;

/// Everything one cycle produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub timestamp: DateTime<Utc>,

    pub status: Status,

    pub gaze: GazeClass,

    /// Measured pose when exactly one face was visible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_pose: Option<HeadPose>,

    pub faces_detected: usize,

    pub phone_detected: bool,

    pub away_exceeded: bool,

    pub focus_score: i32,

    /// The notifier should fire for this cycle
    pub alert: bool,

    /// Snapshot due for persistence this cycle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<StatusSnapshot>,
}

/// Latest state of a session, for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    /// `None` until the first cycle completes
    pub status: Option<Status>,
    pub gaze: GazeClass,
    pub faces_detected: usize,
    pub phone_detected: bool,
    pub focus_score: i32,
    pub sound_enabled: bool,
}
