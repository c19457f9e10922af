//! JSON-lines input for the monitor
//!
//! Each line is one message tagged by `type`:
//!
//! ```json
//! {"type":"frame","frame_width":640,"frame_height":480,"faces":[[[0.5,0.4]]],"detections":[]}
//! {"type":"toggle_sound"}
//! {"type":"set_sound","enabled":false}
//! {"type":"reset_score"}
//! ```

use chrono::{DateTime, Utc};
use focus_engine::{Detection, FocusConfig, FocusError, FrameObservation, Landmark};
use serde::{Deserialize, Serialize};

use crate::runner::SessionCommand;
use crate::MonitorError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorInput {
    Frame(FrameInput),
    SetSound { enabled: bool },
    ToggleSound,
    ResetScore,
}

impl MonitorInput {
    /// The session command carried by a non-frame message
    pub fn command(&self) -> Option<SessionCommand> {
        match self {
            MonitorInput::Frame(_) => None,
            MonitorInput::SetSound { enabled } => Some(SessionCommand::SetSound(*enabled)),
            MonitorInput::ToggleSound => Some(SessionCommand::ToggleSound),
            MonitorInput::ResetScore => Some(SessionCommand::ResetScore),
        }
    }
}

/// Raw perception output for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInput {
    /// Capture time; receive time is used when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default)]
    pub faces: Vec<Vec<Landmark>>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl FrameInput {
    pub fn into_observation(
        self,
        config: &FocusConfig,
        received_at: DateTime<Utc>,
    ) -> Result<FrameObservation, FocusError> {
        FrameObservation::from_detections(
            self.faces,
            &self.detections,
            &config.phone_class,
            config.phone_confidence,
            self.timestamp.unwrap_or(received_at),
            self.frame_width,
            self.frame_height,
        )
    }
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<MonitorInput>, MonitorError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| MonitorError::Input { line: line_no, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_parse_commands() {
        let toggle = parse_line(r#"{"type":"toggle_sound"}"#, 1).unwrap().unwrap();
        assert_eq!(toggle.command(), Some(SessionCommand::ToggleSound));

        let set = parse_line(r#"{"type":"set_sound","enabled":false}"#, 2).unwrap().unwrap();
        assert_eq!(set.command(), Some(SessionCommand::SetSound(false)));

        let reset = parse_line(r#" {"type":"reset_score"} "#, 3).unwrap().unwrap();
        assert_eq!(reset.command(), Some(SessionCommand::ResetScore));
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        assert!(parse_line("", 1).unwrap().is_none());
        assert!(parse_line("   ", 2).unwrap().is_none());
        assert!(parse_line("# recorded 2026-10-18", 3).unwrap().is_none());
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let err = parse_line(r#"{"type":"dance"}"#, 7).unwrap_err();
        assert!(matches!(err, MonitorError::Input { line: 7, .. }));
        assert!(err.to_string().starts_with("Bad input on line 7"));
    }

    #[test]
    fn test_frame_to_observation() {
        let line = r#"{"type":"frame","timestamp":"2026-10-18T09:30:00Z","frame_width":640,"frame_height":480,
            "faces":[[[0.5,0.5],[0.5,0.6]]],
            "detections":[{"class_name":"cell phone","confidence":0.8},{"class_name":"book","confidence":0.9}]}"#;
        let line = line.replace('\n', "");
        let Some(MonitorInput::Frame(frame)) = parse_line(&line, 1).unwrap() else {
            panic!("expected a frame");
        };

        let fallback = DateTime::<Utc>::UNIX_EPOCH;
        let obs = frame.into_observation(&FocusConfig::default(), fallback).unwrap();
        assert!(obs.phone_detected);
        assert_eq!(obs.faces_detected(), 1);
        assert_eq!(obs.timestamp.to_rfc3339(), "2026-10-18T09:30:00+00:00");
    }

    #[test]
    fn test_frame_without_timestamp_uses_receive_time() {
        let frame = FrameInput {
            timestamp: None,
            frame_width: 640,
            frame_height: 480,
            faces: vec![],
            detections: vec![],
        };
        let received = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(42);
        let obs = frame.into_observation(&FocusConfig::default(), received).unwrap();
        assert_eq!(obs.timestamp, received);
        assert!(!obs.phone_detected);
    }

    #[test]
    fn test_zero_sized_frame_rejected() {
        let frame = FrameInput {
            timestamp: None,
            frame_width: 0,
            frame_height: 480,
            faces: vec![],
            detections: vec![],
        };
        assert!(matches!(
            frame.into_observation(&FocusConfig::default(), Utc::now()),
            Err(FocusError::InvalidFrame { width: 0, height: 480 })
        ));
    }
}
