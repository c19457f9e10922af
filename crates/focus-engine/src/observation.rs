//! Per-cycle perception inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::FocusError;

/// Normalized 2D landmark (0..1 in both axes)
pub type Landmark = (f64, f64);

/// Object detector output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Detector class label (e.g. "cell phone")
    pub class_name: String,

    /// Detection confidence
    pub confidence: f32,

    /// Bounding box [x1, y1, x2, y2] in pixels
    #[serde(default)]
    pub bbox: [f32; 4],
}

/// True when any detection is a phone above the confidence floor
pub fn phone_present(detections: &[Detection], class_name: &str, min_confidence: f32) -> bool {
    detections
        .iter()
        .any(|d| d.class_name == class_name && d.confidence > min_confidence)
}

/// Everything the engine needs from one captured frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameObservation {
    /// One landmark set per detected face
    pub faces: Vec<Vec<Landmark>>,

    pub phone_detected: bool,

    /// Capture time
    pub timestamp: DateTime<Utc>,

    /// Frame size in pixels
    pub frame_width: u32,
    pub frame_height: u32,
}

impl FrameObservation {
    pub fn new(
        faces: Vec<Vec<Landmark>>,
        phone_detected: bool,
        timestamp: DateTime<Utc>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, FocusError> {
        if frame_width == 0 || frame_height == 0 {
            return Err(FocusError::InvalidFrame {
                width: frame_width,
                height: frame_height,
            });
        }
        Ok(Self {
            faces,
            phone_detected,
            timestamp,
            frame_width,
            frame_height,
        })
    }

    /// Build an observation straight from raw detector output
    pub fn from_detections(
        faces: Vec<Vec<Landmark>>,
        detections: &[Detection],
        phone_class: &str,
        phone_confidence: f32,
        timestamp: DateTime<Utc>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, FocusError> {
        let phone_detected = phone_present(detections, phone_class, phone_confidence);
        Self::new(faces, phone_detected, timestamp, frame_width, frame_height)
    }

    pub fn faces_detected(&self) -> usize {
        self.faces.len()
    }
}
