//! Engagement monitoring session
//!
//! A monitor owns one aggregator for one classroom or test session. Frames are
//! processed synchronously, one at a time, in arrival order.

use crate::engagement::aggregator::{EngagementAggregator, DEFAULT_AVERAGE_WINDOW_SECS};
use crate::engagement::scorer::EngagementScorer;
use crate::engagement::types::{EngagementMetrics, EngagementSummary, Frame};
use crate::error::SetuError;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Stateful engagement processor for a single session
pub struct EngagementMonitor {
    aggregator: EngagementAggregator,
    average_window: Duration,
    last_timestamp: Option<DateTime<Utc>>,
    frames: u64,
    frames_present: u64,
}

impl Default for EngagementMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl EngagementMonitor {
    /// Create a monitor with default history size and averaging window
    pub fn new() -> Self {
        Self::with_aggregator(EngagementAggregator::default())
    }

    /// Create a monitor with a specific history size
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_aggregator(EngagementAggregator::new(capacity))
    }

    /// Create a monitor around an existing aggregator (e.g. restored history)
    pub fn with_aggregator(aggregator: EngagementAggregator) -> Self {
        let last_timestamp = aggregator.latest().map(|m| m.timestamp);
        Self {
            aggregator,
            average_window: Duration::seconds(DEFAULT_AVERAGE_WINDOW_SECS),
            last_timestamp,
            frames: 0,
            frames_present: 0,
        }
    }

    /// Set the window used by [`EngagementMonitor::summary_at`]
    pub fn with_average_window(mut self, window: Duration) -> Self {
        self.average_window = window;
        self
    }

    /// Process one frame and return its metrics
    ///
    /// Frames with a detected face are recorded into history. Frames without a
    /// face, and faces whose landmark set is invalid, produce an absent record
    /// that is returned but not recorded.
    pub fn process_frame(&mut self, frame: &Frame) -> EngagementMetrics {
        let timestamp = self.monotonic(frame.timestamp);
        self.frames += 1;

        let metrics = match EngagementScorer::score_frame(frame.face(), timestamp) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(error = %e, "discarding invalid landmark set");
                EngagementMetrics::absent(timestamp)
            }
        };

        if metrics.is_present {
            self.frames_present += 1;
            self.aggregator.record_metrics(metrics.clone());
        } else {
            debug!(%timestamp, "no face in frame");
        }

        metrics
    }

    /// Clamp timestamps so the stream never goes backwards
    fn monotonic(&mut self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let adjusted = match self.last_timestamp {
            Some(last) if timestamp < last => {
                warn!(%timestamp, %last, "frame timestamp went backwards, clamping");
                last
            }
            _ => timestamp,
        };
        self.last_timestamp = Some(adjusted);
        adjusted
    }

    /// Summary relative to the last processed frame
    pub fn summary(&self) -> EngagementSummary {
        self.summary_at(self.last_timestamp.unwrap_or_else(Utc::now))
    }

    /// Summary with the averaging window ending at `now`
    pub fn summary_at(&self, now: DateTime<Utc>) -> EngagementSummary {
        let presence_ratio = if self.frames == 0 {
            0.0
        } else {
            self.frames_present as f64 / self.frames as f64
        };

        EngagementSummary {
            frames: self.frames,
            frames_present: self.frames_present,
            presence_ratio,
            samples: self.aggregator.len(),
            average_engagement: self.aggregator.average_engagement_at(self.average_window, now),
            trend: self.aggregator.engagement_trend(),
        }
    }

    pub fn aggregator(&self) -> &EngagementAggregator {
        &self.aggregator
    }

    /// Save history to JSON for persistence
    pub fn save_history(&self) -> Result<String, SetuError> {
        Ok(self.aggregator.to_json()?)
    }

    /// Replace history with state loaded from JSON
    pub fn load_history(&mut self, json: &str) -> Result<(), SetuError> {
        self.aggregator = EngagementAggregator::from_json(json)
            .map_err(|e| SetuError::ParseError(e.to_string()))?;
        self.last_timestamp = self.aggregator.latest().map(|m| m.timestamp);
        Ok(())
    }

    /// Stop monitoring: drop history and counters
    pub fn reset(&mut self) {
        self.aggregator.clear();
        self.last_timestamp = None;
        self.frames = 0;
        self.frames_present = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::scorer::fixtures::face;
    use crate::engagement::scorer::MIN_LANDMARKS;
    use crate::engagement::types::{EngagementTrend, Landmark};
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        base_time() + Duration::milliseconds(ms)
    }

    #[test]
    fn test_frames_without_face() {
        let mut monitor = EngagementMonitor::new();
        let outputs: Vec<EngagementMetrics> = (0..3)
            .map(|i| monitor.process_frame(&Frame::without_face(at(i * 33))))
            .collect();

        assert_eq!(outputs.len(), 3);
        for metrics in &outputs {
            assert_eq!(metrics.attention_score, 0);
            assert!(!metrics.is_present);
        }

        let summary = monitor.summary_at(at(100));
        assert_eq!(summary.average_engagement, 0);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.frames_present, 0);
        assert_eq!(summary.presence_ratio, 0.0);
    }

    #[test]
    fn test_increasing_engagement_trend() {
        let mut monitor = EngagementMonitor::new();
        let mut last = None;
        for i in 0..12 {
            // Symmetry and alignment both improve with every frame
            let eye_distance = 0.1 + 0.02 * i as f64;
            let vertical_gap = 0.15 - 0.0125 * i as f64;
            let metrics = monitor.process_frame(&Frame::with_face(
                at(i * 100),
                face(eye_distance, vertical_gap),
            ));
            assert!(metrics.is_present);
            if let Some(prev) = last {
                assert!(metrics.attention_score > prev);
            }
            last = Some(metrics.attention_score);
        }

        assert_eq!(monitor.summary().trend, EngagementTrend::Increasing);
    }

    #[test]
    fn test_invalid_landmarks_recover_to_absent() {
        let mut monitor = EngagementMonitor::new();
        let short = vec![Landmark::new(0.5, 0.5); MIN_LANDMARKS - 10];
        let metrics = monitor.process_frame(&Frame::with_face(at(0), short));

        assert!(!metrics.is_present);
        assert_eq!(metrics.attention_score, 0);
        assert!(monitor.aggregator().is_empty());
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let mut monitor = EngagementMonitor::new();
        monitor.process_frame(&Frame::with_face(at(1000), face(0.3, 0.0)));
        let metrics = monitor.process_frame(&Frame::with_face(at(500), face(0.3, 0.0)));
        assert_eq!(metrics.timestamp, at(1000));
    }

    #[test]
    fn test_presence_ratio() {
        let mut monitor = EngagementMonitor::new();
        monitor.process_frame(&Frame::with_face(at(0), face(0.3, 0.0)));
        monitor.process_frame(&Frame::without_face(at(100)));
        monitor.process_frame(&Frame::with_face(at(200), face(0.3, 0.0)));
        monitor.process_frame(&Frame::without_face(at(300)));

        let summary = monitor.summary();
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.presence_ratio, 0.5);
        assert_eq!(summary.average_engagement, 100);
    }

    #[test]
    fn test_history_persistence() {
        let mut monitor = EngagementMonitor::with_capacity(5);
        for i in 0..3 {
            monitor.process_frame(&Frame::with_face(at(i * 100), face(0.3, 0.0)));
        }
        let json = monitor.save_history().unwrap();

        let mut restored = EngagementMonitor::new();
        restored.load_history(&json).unwrap();
        assert_eq!(restored.aggregator().len(), 3);
        assert_eq!(restored.aggregator().capacity(), 5);

        // Restored history still clamps older frames
        let metrics = restored.process_frame(&Frame::without_face(at(0)));
        assert_eq!(metrics.timestamp, at(200));
    }

    #[test]
    fn test_load_history_rejects_garbage() {
        let mut monitor = EngagementMonitor::new();
        assert!(matches!(
            monitor.load_history("not json"),
            Err(SetuError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_history_rejects_zero_capacity() {
        let mut monitor = EngagementMonitor::new();
        assert!(matches!(
            monitor.load_history(r#"{"history":{"capacity":0,"items":[]}}"#),
            Err(SetuError::ParseError(_))
        ));
        assert_eq!(monitor.aggregator().capacity(), 100);
    }

    #[test]
    fn test_load_history_with_huge_capacity_keeps_recording() {
        let mut monitor = EngagementMonitor::new();
        monitor
            .load_history(r#"{"history":{"capacity":18446744073709551615,"items":[]}}"#)
            .unwrap();

        let metrics = monitor.process_frame(&Frame::with_face(base_time(), face(0.3, 0.0)));
        assert!(metrics.is_present);
        assert_eq!(monitor.aggregator().len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut monitor = EngagementMonitor::new();
        monitor.process_frame(&Frame::with_face(at(0), face(0.3, 0.0)));
        monitor.reset();
        let summary = monitor.summary_at(at(0));
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.samples, 0);
    }
}
