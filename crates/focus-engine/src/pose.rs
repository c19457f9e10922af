//! Head pose estimation from face landmarks

use serde::{Deserialize, Serialize};

use crate::config::{LandmarkLayout, PoseThresholds};
use crate::observation::Landmark;
use crate::{FocusConfig, FocusError};

const YAW_EPSILON: f64 = 1e-6;

/// Where the head is pointed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeClass {
    Screen,
    Notebook,
    Away,
}

impl GazeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            GazeClass::Screen => "screen",
            GazeClass::Notebook => "notebook",
            GazeClass::Away => "away",
        }
    }
}

impl std::fmt::Display for GazeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(self, other: PixelPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Head pose measured from four landmarks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    /// Angle of the nose-to-chin vector in degrees, (-180, 180]
    pub pitch_deg: f64,
    /// Nose-to-left-ear over nose-to-right-ear distance
    pub yaw_ratio: f64,
}

impl HeadPose {
    /// Measure pose from pixel-space points
    pub fn from_points(nose: PixelPoint, chin: PixelPoint, left_ear: PixelPoint, right_ear: PixelPoint) -> Self {
        let pitch_deg = (chin.y - nose.y).atan2(chin.x - nose.x).to_degrees();
        let yaw_ratio = nose.distance(left_ear) / (nose.distance(right_ear) + YAW_EPSILON);
        Self { pitch_deg, yaw_ratio }
    }

    /// First matching rule wins: frontal and level is screen, frontal and
    /// tilted down is notebook, anything else is away.
    pub fn classify(&self, thresholds: &PoseThresholds) -> GazeClass {
        let frontal = self.yaw_ratio > thresholds.yaw_ratio_min && self.yaw_ratio < thresholds.yaw_ratio_max;
        let limit = thresholds.pitch_limit_deg;

        if frontal && self.pitch_deg > -limit && self.pitch_deg < limit {
            GazeClass::Screen
        } else if frontal && self.pitch_deg > limit {
            GazeClass::Notebook
        } else {
            GazeClass::Away
        }
    }
}

/// Landmark-geometry head pose classifier. Stateless.
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    layout: LandmarkLayout,
    thresholds: PoseThresholds,
}

impl PoseEstimator {
    pub fn new(config: &FocusConfig) -> Self {
        Self {
            layout: config.landmarks,
            thresholds: config.pose.clone(),
        }
    }

    /// Estimate head pose for one face.
    ///
    /// Landmarks must follow the configured layout; a set too short to
    /// hold every required index is rejected.
    pub fn estimate(&self, landmarks: &[Landmark], width: u32, height: u32) -> Result<HeadPose, FocusError> {
        let required = self.layout.required_len();
        if landmarks.len() < required {
            return Err(FocusError::IncompleteLandmarks {
                required,
                got: landmarks.len(),
            });
        }

        let (w, h) = (f64::from(width), f64::from(height));
        let to_px = |idx: usize| {
            let (x, y) = landmarks[idx];
            PixelPoint::new(x * w, y * h)
        };

        Ok(HeadPose::from_points(
            to_px(self.layout.nose_tip),
            to_px(self.layout.chin),
            to_px(self.layout.left_ear),
            to_px(self.layout.right_ear),
        ))
    }

    /// Estimate and classify in one step
    pub fn gaze(&self, landmarks: &[Landmark], width: u32, height: u32) -> Result<(GazeClass, HeadPose), FocusError> {
        let pose = self.estimate(landmarks, width, height)?;
        Ok((pose.classify(&self.thresholds), pose))
    }
}
