//! Focus status classification

use serde::{Deserialize, Serialize};

use crate::pose::GazeClass;

/// UI color band for a status. Not used by any decision logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Green
    Ok,
    /// Yellow
    Caution,
    /// Red
    Critical,
}

/// Fused verdict for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    NoOrMultipleFace,
    PhoneDetected,
    FocusedScreen,
    FocusedNotebook,
    AwayTooLong,
    TemporaryGlanceAway,
}

impl Status {
    /// Ordered decision list. Face count dominates, then phone, then gaze.
    pub fn classify(faces_detected: usize, phone_detected: bool, gaze: GazeClass, away_exceeded: bool) -> Self {
        if faces_detected != 1 {
            return Status::NoOrMultipleFace;
        }
        if phone_detected {
            return Status::PhoneDetected;
        }
        match gaze {
            GazeClass::Screen => Status::FocusedScreen,
            GazeClass::Notebook => Status::FocusedNotebook,
            GazeClass::Away if away_exceeded => Status::AwayTooLong,
            GazeClass::Away => Status::TemporaryGlanceAway,
        }
    }

    /// False for the statuses that trigger alerts
    pub fn is_focused(self) -> bool {
        !matches!(
            self,
            Status::NoOrMultipleFace | Status::PhoneDetected | Status::AwayTooLong
        )
    }

    pub fn severity(self) -> Severity {
        match self {
            Status::FocusedScreen | Status::FocusedNotebook => Severity::Ok,
            Status::TemporaryGlanceAway => Severity::Caution,
            Status::NoOrMultipleFace | Status::PhoneDetected | Status::AwayTooLong => Severity::Critical,
        }
    }

    /// Persisted label
    pub fn label(self) -> &'static str {
        match self {
            Status::NoOrMultipleFace => "Not Focused (Multiple/No Face)",
            Status::PhoneDetected => "Not Focused (Phone Detected)",
            Status::FocusedScreen => "Focused (screen)",
            Status::FocusedNotebook => "Focused (notebook)",
            Status::AwayTooLong => "Not Focused (Looking Away >10s)",
            Status::TemporaryGlanceAway => "Focused (temporary glance away)",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
