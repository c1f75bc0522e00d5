//! Engagement data types
//!
//! This module defines the landmark input and the per-frame metrics records that
//! flow through the engagement pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single normalized face-mesh landmark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position (0-1, left to right)
    pub x: f64,
    /// Vertical position (0-1, top to bottom)
    pub y: f64,
    /// Relative depth, if the landmark source provides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Eye gaze direction classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeDirection {
    Center,
    Left,
    Right,
    Up,
    Down,
}

/// Head pose classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadPose {
    Forward,
    Left,
    Right,
    Up,
    Down,
}

/// Direction of recent engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl EngagementTrend {
    /// Mean difference required to leave `Stable` (strictly exceeded)
    pub const THRESHOLD: f64 = 5.0;

    /// Classify the difference between a recent mean and an older mean
    pub fn from_delta(delta: f64) -> Self {
        if delta > Self::THRESHOLD {
            EngagementTrend::Increasing
        } else if delta < -Self::THRESHOLD {
            EngagementTrend::Decreasing
        } else {
            EngagementTrend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementTrend::Increasing => "increasing",
            EngagementTrend::Decreasing => "decreasing",
            EngagementTrend::Stable => "stable",
        }
    }
}

/// Engagement metrics for one observed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// Attention score (0-100)
    pub attention_score: u8,
    /// Where the eyes are pointed
    pub eye_gaze_direction: GazeDirection,
    /// Head orientation
    pub head_pose: HeadPose,
    /// Blinks-per-minute proxy (single frame heuristic)
    pub blink_rate: u32,
    /// Whether a face was detected in the frame
    pub is_present: bool,
    /// Capture time of the frame
    pub timestamp: DateTime<Utc>,
}

impl EngagementMetrics {
    /// Record for a frame with no detected face
    pub fn absent(timestamp: DateTime<Utc>) -> Self {
        Self {
            attention_score: 0,
            eye_gaze_direction: GazeDirection::Center,
            head_pose: HeadPose::Forward,
            blink_rate: 0,
            is_present: false,
            timestamp,
        }
    }
}

/// One frame delivered by the landmark source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time
    pub timestamp: DateTime<Utc>,
    /// Landmarks of the first detected face; `None` or empty means no face
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl Frame {
    pub fn with_face(timestamp: DateTime<Utc>, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp,
            landmarks: Some(landmarks),
        }
    }

    pub fn without_face(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            landmarks: None,
        }
    }

    /// Landmarks if a face is present
    pub fn face(&self) -> Option<&[Landmark]> {
        match &self.landmarks {
            Some(points) if !points.is_empty() => Some(points.as_slice()),
            _ => None,
        }
    }
}

/// Session-level engagement summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    /// Frames processed by the monitor
    pub frames: u64,
    /// Frames with a detected face
    pub frames_present: u64,
    /// Fraction of frames with a detected face (0-1)
    pub presence_ratio: f64,
    /// Samples currently held in history
    pub samples: usize,
    /// Rounded mean attention over the averaging window
    pub average_engagement: u8,
    /// Recent trend
    pub trend: EngagementTrend,
}
