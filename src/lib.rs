//! Shiksha Setu - Core engine for a bilingual learning platform
//!
//! Setu provides the non-UI pieces of the platform: attention scoring from
//! face-mesh landmarks with a rolling engagement history, Hindi/English string
//! lookup with a persisted language preference, and the local fallbacks used
//! when the remote tutor or compiler is unavailable.
//!
//! ## Modules
//!
//! - **Engagement**: Frame → Scorer → Aggregator → Summary
//! - **Locale**: translation catalog and the language preference context
//! - **Tutor**: rule-based replies behind a chat backend seam
//! - **Compiler**: remote execution with local pseudo-execution fallback
//! - **Proctor**: secure test violation tracking, timing and results
//! - **Auth**: the signed-in user, persisted across restarts

pub mod auth;
pub mod compiler;
pub mod config;
pub mod engagement;
pub mod error;
pub mod locale;
pub mod proctor;
pub mod store;
pub mod tutor;

pub use auth::{AuthSession, Role, User};
pub use config::SetuConfig;
pub use engagement::{
    EngagementAggregator, EngagementMetrics, EngagementMonitor, EngagementScorer,
    EngagementTrend, Frame, Landmark,
};
pub use error::SetuError;
pub use locale::{translate, LanguageContext, Locale};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

/// Setu version
pub const SETU_VERSION: &str = env!("CARGO_PKG_VERSION");
