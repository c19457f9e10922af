//! Focus engine configuration

use alerting::AlertConfig;
use serde::{Deserialize, Serialize};

/// Positions of the landmarks the pose classifier reads.
///
/// Defaults follow the 468-point face mesh ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkLayout {
    pub nose_tip: usize,
    pub chin: usize,
    pub left_ear: usize,
    pub right_ear: usize,
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self {
            nose_tip: 1,
            chin: 152,
            left_ear: 234,
            right_ear: 454,
        }
    }
}

impl LandmarkLayout {
    /// Smallest landmark count that contains every required index
    pub fn required_len(&self) -> usize {
        self.nose_tip
            .max(self.chin)
            .max(self.left_ear)
            .max(self.right_ear)
            + 1
    }
}

/// Head pose classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseThresholds {
    /// Open interval of ear-distance ratios that count as a frontal face
    pub yaw_ratio_min: f64,
    pub yaw_ratio_max: f64,
    /// Pitch magnitude separating screen from notebook/away (degrees)
    pub pitch_limit_deg: f64,
}

impl Default for PoseThresholds {
    fn default() -> Self {
        Self {
            yaw_ratio_min: 0.7,
            yaw_ratio_max: 1.3,
            pitch_limit_deg: 15.0,
        }
    }
}

/// Signed score rates in points per second
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRates {
    pub focused: f64,
    pub glance: f64,
    pub phone: f64,
    pub not_focused: f64,
}

impl Default for ScoreRates {
    fn default() -> Self {
        Self {
            focused: 20.0,
            glance: 5.0,
            phone: -25.0,
            not_focused: -15.0,
        }
    }
}

/// How the focus score moves each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringModel {
    /// Rate per second scaled by elapsed time, truncated to whole points
    #[default]
    TimeWeighted,
    /// Fixed step per cycle: -2 when distracted, +1 otherwise
    PerCycle,
}

/// When a status snapshot is emitted for persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SnapshotThrottle {
    /// Every N cycles (assumes a steady frame rate)
    EveryCycles { cycles: u32 },
    /// Whenever this much wall-clock time has passed since the last one
    Interval { millis: u64 },
}

impl Default for SnapshotThrottle {
    fn default() -> Self {
        SnapshotThrottle::EveryCycles { cycles: 30 }
    }
}

/// Focus engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Continuous away time before the status escalates (milliseconds)
    pub away_threshold_ms: u64,

    /// Object class that counts as a phone
    pub phone_class: String,

    /// Minimum (exclusive) detection confidence for a phone
    pub phone_confidence: f32,

    pub landmarks: LandmarkLayout,
    pub pose: PoseThresholds,
    pub scoring: ScoringModel,
    pub rates: ScoreRates,
    pub snapshot: SnapshotThrottle,
    pub alert: AlertConfig,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            away_threshold_ms: 10_000,
            phone_class: "cell phone".to_string(),
            phone_confidence: 0.5,
            landmarks: LandmarkLayout::default(),
            pose: PoseThresholds::default(),
            scoring: ScoringModel::default(),
            rates: ScoreRates::default(),
            snapshot: SnapshotThrottle::default(),
            alert: AlertConfig::default(),
        }
    }
}

impl FocusConfig {
    /// Create strict config (shorter grace period, tighter frontal band)
    pub fn strict() -> Self {
        Self {
            away_threshold_ms: 5_000,
            pose: PoseThresholds {
                yaw_ratio_min: 0.8,
                yaw_ratio_max: 1.25,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create lenient config (longer grace period, slower alerts)
    pub fn lenient() -> Self {
        Self {
            away_threshold_ms: 20_000,
            alert: AlertConfig { cooldown_ms: 10_000 },
            ..Default::default()
        }
    }

    /// Take the fields a preset owns (away threshold, pose band, alert
    /// cooldown) and keep everything else as loaded
    pub fn apply_preset(&mut self, preset: &FocusConfig) {
        self.away_threshold_ms = preset.away_threshold_ms;
        self.pose = preset.pose.clone();
        self.alert = preset.alert.clone();
    }
}
