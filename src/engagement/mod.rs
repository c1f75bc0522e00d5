//! Engagement detection module
//!
//! This module turns face-mesh landmark snapshots into attention signals and keeps
//! a bounded rolling history for windowed averages and trend detection.
//!
//! Pipeline: Frame → Scorer → Aggregator → Summary

pub mod aggregator;
pub mod monitor;
pub mod ring;
pub mod scorer;
pub mod types;

pub use aggregator::{EngagementAggregator, DEFAULT_AVERAGE_WINDOW_SECS, DEFAULT_HISTORY_CAPACITY};
pub use monitor::EngagementMonitor;
pub use ring::RingBuffer;
pub use scorer::EngagementScorer;
pub use types::{
    EngagementMetrics, EngagementSummary, EngagementTrend, Frame, GazeDirection, HeadPose,
    Landmark,
};
