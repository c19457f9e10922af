//! Study Focus Engine
//!
//! Turns noisy per-frame perception into a stable focus verdict:
//! - Head pose classification (screen / notebook / away)
//! - Continuous look-away tracking
//! - Status fusion (face count, phone, gaze)
//! - Time-weighted bounded focus score
//! - Alert cooldown decisions
//! - Throttled snapshots for persistence
//!
//! Side effects (sound, storage) are left to the caller: a cycle only
//! reports whether an alert should fire and which snapshot is due.

pub mod analysis;
pub mod config;
pub mod observation;
pub mod pose;
pub mod score;
pub mod snapshot;
pub mod state;
pub mod status;

pub use analysis::{CycleOutcome, SessionView};
pub use config::{FocusConfig, LandmarkLayout, PoseThresholds, ScoreRates, ScoringModel, SnapshotThrottle};
pub use observation::{phone_present, Detection, FrameObservation, Landmark};
pub use pose::{GazeClass, HeadPose, PixelPoint, PoseEstimator};
pub use score::ScoreIntegrator;
pub use snapshot::{SnapshotRecorder, StatusSnapshot};
pub use state::{elapsed_secs, AwayTimer, SessionState, FOCUS_MAX, FOCUS_MIN};
pub use status::{Severity, Status};

use alerting::AlertGate;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

/// Focus engine error types
#[derive(Error, Debug)]
pub enum FocusError {
    #[error("Landmark set too short: need {required} points, got {got}")]
    IncompleteLandmarks { required: usize, got: usize },

    #[error("Invalid frame size {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// One monitored session: the pipeline plus its private state
pub struct FocusSession {
    pose: PoseEstimator,
    away: AwayTimer,
    scorer: ScoreIntegrator,
    gate: AlertGate,
    recorder: SnapshotRecorder,
    state: SessionState,
    last: Option<CycleOutcome>,
}

impl FocusSession {
    /// Start a session at `started_at`
    pub fn new(config: FocusConfig, started_at: DateTime<Utc>) -> Result<Self, FocusError> {
        let pose = &config.pose;
        if pose.yaw_ratio_min >= pose.yaw_ratio_max {
            return Err(FocusError::Config(format!(
                "yaw ratio band is empty: {} >= {}",
                pose.yaw_ratio_min, pose.yaw_ratio_max
            )));
        }
        if pose.pitch_limit_deg <= 0.0 {
            return Err(FocusError::Config("pitch limit must be positive".to_string()));
        }

        Ok(Self {
            pose: PoseEstimator::new(&config),
            away: AwayTimer::new(config.away_threshold_ms),
            scorer: ScoreIntegrator::new(config.scoring, config.rates.clone()),
            gate: AlertGate::new(config.alert.clone()),
            recorder: SnapshotRecorder::new(config.snapshot),
            state: SessionState::new(started_at),
            last: None,
        })
    }

    /// Run one full cycle.
    ///
    /// Stages run in a fixed order: pose, away timer, status, score, alert
    /// gate, snapshot throttle. An incomplete landmark set fails the cycle
    /// before any state is touched.
    pub fn process(&mut self, obs: &FrameObservation) -> Result<CycleOutcome, FocusError> {
        let now = obs.timestamp;
        let faces_detected = obs.faces_detected();

        let (gaze, head_pose) = match obs.faces.as_slice() {
            [face] => {
                let (gaze, pose) = self.pose.gaze(face, obs.frame_width, obs.frame_height)?;
                (gaze, Some(pose))
            }
            _ => (GazeClass::Away, None),
        };

        self.away.update(&mut self.state.look_away_start, gaze, now);
        let away_exceeded = self.away.exceeded(self.state.look_away_start, now);

        let status = Status::classify(faces_detected, obs.phone_detected, gaze, away_exceeded);

        let dt = elapsed_secs(self.state.last_tick, now);
        self.state.focus_score = self
            .scorer
            .advance(self.state.focus_score, status, obs.phone_detected, dt);
        self.state.last_tick = now;

        let triggered = !status.is_focused() || obs.phone_detected;
        let alert = self
            .gate
            .evaluate(
                &mut self.state.last_alert_time,
                triggered,
                self.state.sound_enabled,
                now,
            )
            .fired();

        let snapshot = self.recorder.tick(&mut self.state, now).then(|| StatusSnapshot {
            timestamp: now,
            status,
            gaze,
            faces_detected,
            phone_detected: obs.phone_detected,
            focus_score: self.state.focus_score,
        });

        debug!(
            "Cycle: {} gaze={} score={} dt={:.3}s",
            status, gaze, self.state.focus_score, dt
        );

        let outcome = CycleOutcome {
            timestamp: now,
            status,
            gaze,
            head_pose,
            faces_detected,
            phone_detected: obs.phone_detected,
            away_exceeded,
            focus_score: self.state.focus_score,
            alert,
            snapshot,
        };
        self.last = Some(outcome.clone());
        Ok(outcome)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.state.sound_enabled = enabled;
    }

    /// Flip sound on/off, returning the new setting
    pub fn toggle_sound(&mut self) -> bool {
        self.state.sound_enabled = !self.state.sound_enabled;
        self.state.sound_enabled
    }

    pub fn reset_score(&mut self) {
        self.state.reset_score();
    }

    pub fn focus_score(&self) -> i32 {
        self.state.focus_score
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Alerts fired so far in this session
    pub fn alerts_fired(&self) -> usize {
        self.gate.fire_count()
    }

    /// Latest payload for display
    pub fn view(&self) -> SessionView {
        SessionView {
            status: self.last.as_ref().map(|o| o.status),
            gaze: self.last.as_ref().map_or(GazeClass::Away, |o| o.gaze),
            faces_detected: self.last.as_ref().map_or(0, |o| o.faces_detected),
            phone_detected: self.last.as_ref().is_some_and(|o| o.phone_detected),
            focus_score: self.state.focus_score,
            sound_enabled: self.state.sound_enabled,
        }
    }
}
