//! Engagement scoring
//!
//! Maps one face-mesh landmark snapshot to an [`EngagementMetrics`] record. The
//! heuristics are proxies computed from a handful of landmarks, not calibrated
//! measurements.

use crate::engagement::types::{EngagementMetrics, GazeDirection, HeadPose, Landmark};
use crate::error::SetuError;
use chrono::{DateTime, Utc};

/// Face-mesh landmark indices used by the scorer
pub const NOSE_TIP: usize = 1;
pub const FOREHEAD: usize = 10;
pub const LEFT_EYE_CORNER: usize = 33;
pub const LEFT_EYELID_BOTTOM: usize = 145;
pub const LEFT_EYELID_TOP: usize = 159;
pub const CHIN: usize = 175;
pub const RIGHT_EYE_CORNER: usize = 263;

/// Minimum snapshot length covering every index above
pub const MIN_LANDMARKS: usize = RIGHT_EYE_CORNER + 1;

/// Eye-corner distance of a face looking straight at the camera
const REFERENCE_FACE_WIDTH: f64 = 0.3;

const SYMMETRY_WEIGHT: f64 = 0.6;
const ALIGNMENT_WEIGHT: f64 = 0.4;

/// Penalty per normalized unit of eye/nose vertical offset
const ALIGNMENT_PENALTY: f64 = 5.0;

/// Horizontal eye-center/nose offset still treated as looking at the screen
const GAZE_CENTER_THRESHOLD: f64 = 0.02;

const HEAD_UP_RATIO: f64 = 0.4;
const HEAD_DOWN_RATIO: f64 = 0.6;

/// Eyelid gap below which the eye is treated as closing
const EYELID_CLOSED_GAP: f64 = 0.01;
const BLINK_RATE_ELEVATED: u32 = 25;
const BLINK_RATE_BASELINE: u32 = 15;

/// Stateless engagement scorer
pub struct EngagementScorer;

impl EngagementScorer {
    /// Score a frame, treating `None` as no detected face
    pub fn score_frame(
        landmarks: Option<&[Landmark]>,
        timestamp: DateTime<Utc>,
    ) -> Result<EngagementMetrics, SetuError> {
        match landmarks {
            Some(points) if !points.is_empty() => Self::score(points, timestamp),
            _ => Ok(EngagementMetrics::absent(timestamp)),
        }
    }

    /// Score a snapshot of a detected face
    pub fn score(
        landmarks: &[Landmark],
        timestamp: DateTime<Utc>,
    ) -> Result<EngagementMetrics, SetuError> {
        let face = FacePoints::extract(landmarks)?;

        Ok(EngagementMetrics {
            attention_score: compute_attention_score(&face),
            eye_gaze_direction: compute_gaze_direction(&face),
            head_pose: compute_head_pose(&face),
            blink_rate: compute_blink_rate(&face),
            is_present: true,
            timestamp,
        })
    }
}

/// The subset of landmarks the heuristics read
struct FacePoints {
    nose_tip: Landmark,
    forehead: Landmark,
    chin: Landmark,
    left_eye: Landmark,
    right_eye: Landmark,
    eyelid_top: Landmark,
    eyelid_bottom: Landmark,
}

impl FacePoints {
    fn extract(landmarks: &[Landmark]) -> Result<Self, SetuError> {
        if landmarks.len() < MIN_LANDMARKS {
            return Err(SetuError::InvalidLandmarkSet(format!(
                "expected at least {} landmarks, got {}",
                MIN_LANDMARKS,
                landmarks.len()
            )));
        }

        let point = |index: usize| -> Result<Landmark, SetuError> {
            let p = landmarks[index];
            if p.is_finite() {
                Ok(p)
            } else {
                Err(SetuError::InvalidLandmarkSet(format!(
                    "landmark {} has non-finite coordinates",
                    index
                )))
            }
        };

        Ok(Self {
            nose_tip: point(NOSE_TIP)?,
            forehead: point(FOREHEAD)?,
            chin: point(CHIN)?,
            left_eye: point(LEFT_EYE_CORNER)?,
            right_eye: point(RIGHT_EYE_CORNER)?,
            eyelid_top: point(LEFT_EYELID_TOP)?,
            eyelid_bottom: point(LEFT_EYELID_BOTTOM)?,
        })
    }
}

/// Compute attention score from face symmetry and vertical alignment
///
/// Formula: `round(100 * (0.6 * symmetry + 0.4 * alignment))`
/// where `symmetry = min(1, eye_distance / 0.3)` and
/// `alignment = max(0, 1 - 5 * |eye_level - nose_y|)`
fn compute_attention_score(face: &FacePoints) -> u8 {
    let eye_distance = (face.left_eye.x - face.right_eye.x).abs();
    let symmetry = (eye_distance / REFERENCE_FACE_WIDTH).min(1.0);

    let eye_level = (face.left_eye.y + face.right_eye.y) / 2.0;
    let alignment = (1.0 - (eye_level - face.nose_tip.y).abs() * ALIGNMENT_PENALTY).max(0.0);

    let weighted = symmetry * SYMMETRY_WEIGHT + alignment * ALIGNMENT_WEIGHT;
    (weighted * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Classify gaze from the eye-center offset relative to the nose tip
fn compute_gaze_direction(face: &FacePoints) -> GazeDirection {
    let eye_center_x = (face.left_eye.x + face.right_eye.x) / 2.0;
    let offset = eye_center_x - face.nose_tip.x;

    if offset.abs() < GAZE_CENTER_THRESHOLD {
        GazeDirection::Center
    } else if offset > 0.0 {
        GazeDirection::Right
    } else {
        GazeDirection::Left
    }
}

/// Classify head pitch from where the nose sits between forehead and chin
///
/// Only `Forward`, `Up` and `Down` are produced.
fn compute_head_pose(face: &FacePoints) -> HeadPose {
    let ratio = (face.nose_tip.y - face.forehead.y) / (face.chin.y - face.forehead.y);

    // NaN from a degenerate face falls through both comparisons
    if ratio < HEAD_UP_RATIO {
        HeadPose::Up
    } else if ratio > HEAD_DOWN_RATIO {
        HeadPose::Down
    } else {
        HeadPose::Forward
    }
}

/// Single-frame blink proxy: a nearly closed eyelid reports an elevated rate
fn compute_blink_rate(face: &FacePoints) -> u32 {
    let eye_height = (face.eyelid_top.y - face.eyelid_bottom.y).abs();
    if eye_height < EYELID_CLOSED_GAP {
        BLINK_RATE_ELEVATED
    } else {
        BLINK_RATE_BASELINE
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Number of points in a face-mesh snapshot
    pub const FACE_MESH_POINTS: usize = 468;

    /// Build a face with the given eye-corner distance and eye/nose vertical gap
    pub fn face(eye_distance: f64, vertical_gap: f64) -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.5); FACE_MESH_POINTS];
        points[LEFT_EYE_CORNER] = Landmark::new(0.5 - eye_distance / 2.0, 0.4);
        points[RIGHT_EYE_CORNER] = Landmark::new(0.5 + eye_distance / 2.0, 0.4);
        points[NOSE_TIP] = Landmark::new(0.5, 0.4 + vertical_gap);
        points[FOREHEAD] = Landmark::new(0.5, 0.2);
        points[CHIN] = Landmark::new(0.5, 0.8);
        points[LEFT_EYELID_TOP] = Landmark::new(0.4, 0.38);
        points[LEFT_EYELID_BOTTOM] = Landmark::new(0.4, 0.42);
        points
    }
}
