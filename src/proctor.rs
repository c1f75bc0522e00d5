//! Secure test monitoring
//!
//! Tracks browser events during a running test and records violations for tab
//! switches, prohibited shortcuts, right clicks and denied camera or fullscreen
//! access. Handlers return whether the event should be suppressed by the caller.
//! The monitor also keeps the countdown and the answers, and produces the
//! [`TestResult`] on submission.

use crate::error::SetuError;
use crate::store::KeyValueStore;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

/// Default test length (one hour)
pub const DEFAULT_TEST_DURATION_SECS: i64 = 3600;

const RESULT_KEY_PREFIX: &str = "test_result_";

/// Kind of test violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    TabSwitch,
    ProhibitedKey,
    RightClick,
    CameraDenied,
    FullscreenDenied,
}

/// A recorded violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Key that triggered a prohibited-key violation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub at: DateTime<Utc>,
}

impl Violation {
    /// Human-readable log line
    pub fn message(&self) -> String {
        let time = self.at.format("%H:%M:%S");
        match self.kind {
            ViolationKind::TabSwitch => format!("Tab switch detected at {}", time),
            ViolationKind::ProhibitedKey => format!(
                "Prohibited key combination: {} at {}",
                self.key.as_deref().unwrap_or(""),
                time
            ),
            ViolationKind::RightClick => format!("Right-click attempt at {}", time),
            ViolationKind::CameraDenied => "Camera access denied".to_string(),
            ViolationKind::FullscreenDenied => "Fullscreen mode denied".to_string(),
        }
    }
}

/// A key press with modifier state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::new(key)
        }
    }

    pub fn ctrl_shift(key: &str) -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::new(key)
        }
    }

    /// Copy, paste, select-all, new tab and developer tools shortcuts
    pub fn is_prohibited(&self) -> bool {
        (self.ctrl && matches!(self.key.as_str(), "c" | "v" | "a" | "t"))
            || self.key == "F12"
            || (self.ctrl && self.shift && self.key == "I")
    }
}

/// Format seconds as `HH:MM:SS`
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// A submitted test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub student_id: String,
    pub test_id: String,
    /// Answers keyed by question id
    pub answers: BTreeMap<String, String>,
    pub score: u32,
    /// Violation log lines, oldest first
    pub violations: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

impl TestResult {
    /// Persist under `test_result_<id>`
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), SetuError> {
        store.write(&Self::key(&self.id), &serde_json::to_string(self)?)
    }

    pub fn load<S: KeyValueStore>(store: &S, id: &str) -> Result<Option<Self>, SetuError> {
        match store.read(&Self::key(id))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn key(id: &str) -> String {
        format!("{}{}", RESULT_KEY_PREFIX, id)
    }
}

/// Violation tracking for one test attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecureTestMonitor {
    active: bool,
    tab_switches: u32,
    violations: Vec<Violation>,
    duration_secs: i64,
    started_at: Option<DateTime<Utc>>,
    answers: BTreeMap<u32, String>,
}

impl Default for SecureTestMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureTestMonitor {
    pub fn new() -> Self {
        Self {
            active: false,
            tab_switches: 0,
            violations: Vec::new(),
            duration_secs: DEFAULT_TEST_DURATION_SECS,
            started_at: None,
            answers: BTreeMap::new(),
        }
    }

    /// Monitor for a test of a different length
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_secs = duration.num_seconds().max(0);
        self
    }

    /// Begin monitoring; the countdown starts at `at`
    pub fn start(&mut self, at: DateTime<Utc>) {
        info!(duration_secs = self.duration_secs, "secure test started");
        self.active = true;
        self.started_at = Some(at);
    }

    /// Stop monitoring; recorded violations are kept
    pub fn finish(&mut self) {
        info!(violations = self.violations.len(), "secure test finished");
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Page visibility changed
    pub fn on_visibility_change(&mut self, hidden: bool, at: DateTime<Utc>) {
        if self.active && hidden {
            self.tab_switches += 1;
            self.record(ViolationKind::TabSwitch, None, at);
        }
    }

    /// Key pressed; returns true if the press should be suppressed
    pub fn on_key_down(&mut self, event: &KeyEvent, at: DateTime<Utc>) -> bool {
        if self.active && event.is_prohibited() {
            self.record(ViolationKind::ProhibitedKey, Some(event.key.clone()), at);
            return true;
        }
        false
    }

    /// Context menu requested; returns true if it should be suppressed
    pub fn on_context_menu(&mut self, at: DateTime<Utc>) -> bool {
        if self.active {
            self.record(ViolationKind::RightClick, None, at);
            return true;
        }
        false
    }

    /// Camera permission was refused when the test started
    pub fn on_camera_denied(&mut self, at: DateTime<Utc>) {
        if self.active {
            self.record(ViolationKind::CameraDenied, None, at);
        }
    }

    /// Fullscreen was refused when the test started
    pub fn on_fullscreen_denied(&mut self, at: DateTime<Utc>) {
        if self.active {
            self.record(ViolationKind::FullscreenDenied, None, at);
        }
    }

    /// Record or replace the answer to a question; ignored when not active
    pub fn answer(&mut self, question_id: u32, answer: &str) -> bool {
        if !self.active {
            return false;
        }
        self.answers.insert(question_id, answer.to_string());
        true
    }

    pub fn answers(&self) -> &BTreeMap<u32, String> {
        &self.answers
    }

    /// Time left at `now`, never negative
    ///
    /// Before the test starts the full duration remains.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        let total = Duration::seconds(self.duration_secs);
        let Some(started_at) = self.started_at else {
            return total;
        };
        let left = total - (now - started_at).max(Duration::zero());
        left.max(Duration::zero())
    }

    /// Time left at `now` as `HH:MM:SS`
    pub fn time_remaining_label(&self, now: DateTime<Utc>) -> String {
        format_clock(self.time_remaining(now).num_seconds())
    }

    pub fn is_time_up(&self, now: DateTime<Utc>) -> bool {
        self.started_at.is_some() && self.time_remaining(now) == Duration::zero()
    }

    /// Finish the test and build its result
    pub fn submit(
        &mut self,
        student_id: &str,
        test_id: &str,
        score: u32,
        at: DateTime<Utc>,
    ) -> TestResult {
        self.finish();
        TestResult {
            id: Uuid::new_v4().simple().to_string(),
            student_id: student_id.to_string(),
            test_id: test_id.to_string(),
            answers: self
                .answers
                .iter()
                .map(|(id, answer)| (id.to_string(), answer.clone()))
                .collect(),
            score,
            violations: self.violation_log(),
            submitted_at: at,
        }
    }

    fn record(&mut self, kind: ViolationKind, key: Option<String>, at: DateTime<Utc>) {
        let violation = Violation { kind, key, at };
        info!(violation = %violation.message(), "test violation");
        self.violations.push(violation);
    }

    pub fn tab_switch_count(&self) -> u32 {
        self.tab_switches
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violation log lines, oldest first
    pub fn violation_log(&self) -> Vec<String> {
        self.violations.iter().map(Violation::message).collect()
    }
}
