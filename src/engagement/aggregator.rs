//! Rolling engagement aggregation
//!
//! This module keeps a bounded history of engagement metrics and derives windowed
//! averages and trend direction from it. All reads are recomputed from the
//! current history contents.

use crate::engagement::ring::RingBuffer;
use crate::engagement::types::{EngagementMetrics, EngagementTrend};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default history size (number of metrics records)
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default averaging window in seconds
pub const DEFAULT_AVERAGE_WINDOW_SECS: i64 = 60;

/// Samples needed before a trend is reported
const TREND_MIN_SAMPLES: usize = 10;

/// Samples in each half of the trend comparison
const TREND_HALF: usize = 5;

/// Rolling store of engagement metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementAggregator {
    history: RingBuffer<EngagementMetrics>,
}

impl Default for EngagementAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EngagementAggregator {
    /// Create an aggregator holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        Self {
            history: RingBuffer::new(capacity),
        }
    }

    /// Append a metrics record, evicting the oldest when full
    pub fn record_metrics(&mut self, metrics: EngagementMetrics) {
        self.history.push(metrics);
    }

    /// Rounded mean attention over records newer than `window`, relative to now
    pub fn average_engagement(&self, window: Duration) -> u8 {
        self.average_engagement_at(window, Utc::now())
    }

    /// Rounded mean attention over records with `now - timestamp < window`
    ///
    /// Returns 0 when no record falls inside the window.
    pub fn average_engagement_at(&self, window: Duration, now: DateTime<Utc>) -> u8 {
        let (sum, count) = self
            .history
            .iter()
            .filter(|m| now - m.timestamp < window)
            .fold((0u64, 0u64), |(sum, count), m| {
                (sum + m.attention_score as u64, count + 1)
            });

        if count == 0 {
            return 0;
        }
        (sum as f64 / count as f64).round() as u8
    }

    /// Compare the mean of the last 5 records with the 5 before them
    pub fn engagement_trend(&self) -> EngagementTrend {
        let len = self.history.len();
        if len < TREND_MIN_SAMPLES {
            return EngagementTrend::Stable;
        }

        let mut tail = self.history.iter().skip(len - 2 * TREND_HALF);
        let older = Self::mean_score(tail.by_ref().take(TREND_HALF));
        let recent = Self::mean_score(tail);

        EngagementTrend::from_delta(recent - older)
    }

    fn mean_score<'a>(records: impl Iterator<Item = &'a EngagementMetrics>) -> f64 {
        let (sum, count) = records.fold((0u64, 0u64), |(sum, count), m| {
            (sum + m.attention_score as u64, count + 1)
        });
        if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        }
    }

    /// Records oldest first
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &EngagementMetrics> + '_ {
        self.history.iter()
    }

    /// Most recent record
    pub fn latest(&self) -> Option<&EngagementMetrics> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Load aggregator state from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize aggregator state to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::types::{GazeDirection, HeadPose};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn make_metrics(score: u8, offset_secs: i64) -> EngagementMetrics {
        EngagementMetrics {
            attention_score: score,
            eye_gaze_direction: GazeDirection::Center,
            head_pose: HeadPose::Forward,
            blink_rate: 15,
            is_present: true,
            timestamp: base_time() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut aggregator = EngagementAggregator::default();
        for i in 0..150 {
            aggregator.record_metrics(make_metrics((i % 100) as u8, i));
        }

        assert_eq!(aggregator.len(), 100);
        let offsets: Vec<i64> = aggregator
            .history()
            .map(|m| (m.timestamp - base_time()).num_seconds())
            .collect();
        let expected: Vec<i64> = (50..150).collect();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn test_average_over_window() {
        let mut aggregator = EngagementAggregator::default();
        aggregator.record_metrics(make_metrics(10, 0));
        aggregator.record_metrics(make_metrics(60, 100));
        aggregator.record_metrics(make_metrics(81, 110));

        let now = base_time() + Duration::seconds(120);
        // Only the last two are younger than 60s: (60 + 81) / 2 = 70.5 -> 71
        assert_eq!(aggregator.average_engagement_at(Duration::seconds(60), now), 71);
        // Everything: (10 + 60 + 81) / 3 = 50.33 -> 50
        assert_eq!(aggregator.average_engagement_at(Duration::seconds(600), now), 50);
    }

    #[test]
    fn test_average_window_is_exclusive() {
        let mut aggregator = EngagementAggregator::default();
        aggregator.record_metrics(make_metrics(90, 0));

        let now = base_time() + Duration::seconds(60);
        assert_eq!(aggregator.average_engagement_at(Duration::seconds(60), now), 0);
        assert_eq!(aggregator.average_engagement_at(Duration::seconds(61), now), 90);
    }

    #[test]
    fn test_average_of_empty_history_is_zero() {
        let aggregator = EngagementAggregator::default();
        assert_eq!(
            aggregator.average_engagement(Duration::seconds(DEFAULT_AVERAGE_WINDOW_SECS)),
            0
        );
    }

    #[test]
    fn test_trend_needs_ten_samples() {
        let mut aggregator = EngagementAggregator::default();
        for (i, score) in [0u8, 0, 0, 0, 0, 100, 100, 100, 100].iter().enumerate() {
            aggregator.record_metrics(make_metrics(*score, i as i64));
        }
        assert_eq!(aggregator.engagement_trend(), EngagementTrend::Stable);
    }

    #[test]
    fn test_trend_boundary_is_stable() {
        let mut aggregator = EngagementAggregator::default();
        for i in 0..5 {
            aggregator.record_metrics(make_metrics(50, i));
        }
        for i in 5..10 {
            aggregator.record_metrics(make_metrics(55, i));
        }
        assert_eq!(aggregator.engagement_trend(), EngagementTrend::Stable);
    }

    #[test]
    fn test_trend_just_above_boundary_increases() {
        let mut aggregator = EngagementAggregator::default();
        for i in 0..5 {
            aggregator.record_metrics(make_metrics(50, i));
        }
        // Recent mean 55.2
        for (i, score) in [55u8, 55, 55, 55, 56].iter().enumerate() {
            aggregator.record_metrics(make_metrics(*score, 5 + i as i64));
        }
        assert_eq!(aggregator.engagement_trend(), EngagementTrend::Increasing);
    }

    #[test]
    fn test_trend_decreasing() {
        let mut aggregator = EngagementAggregator::default();
        for i in 0..5 {
            aggregator.record_metrics(make_metrics(80, i));
        }
        for i in 5..10 {
            aggregator.record_metrics(make_metrics(40, i));
        }
        assert_eq!(aggregator.engagement_trend(), EngagementTrend::Decreasing);
    }

    #[test]
    fn test_trend_only_uses_last_ten() {
        let mut aggregator = EngagementAggregator::default();
        // Old spike that must not influence the comparison
        for i in 0..5 {
            aggregator.record_metrics(make_metrics(100, i));
        }
        for i in 5..15 {
            aggregator.record_metrics(make_metrics(30, i));
        }
        assert_eq!(aggregator.engagement_trend(), EngagementTrend::Stable);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut aggregator = EngagementAggregator::new(3);
        for i in 0..4 {
            aggregator.record_metrics(make_metrics(10 * i as u8, i));
        }

        let json = aggregator.to_json().unwrap();
        let loaded = EngagementAggregator::from_json(&json).unwrap();

        assert_eq!(loaded.capacity(), 3);
        assert_eq!(
            loaded.history().cloned().collect::<Vec<_>>(),
            aggregator.history().cloned().collect::<Vec<_>>()
        );
        assert_eq!(loaded.latest().map(|m| m.attention_score), Some(30));
    }

    #[test]
    fn test_clear_history() {
        let mut aggregator = EngagementAggregator::default();
        aggregator.record_metrics(make_metrics(40, 0));
        aggregator.clear();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.engagement_trend(), EngagementTrend::Stable);
    }
}
