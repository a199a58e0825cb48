use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recording session lifecycle state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    /// No session; ready to start
    Idle,
    /// Start requested, waiting for the engine to confirm
    Starting,
    /// Session live, results flowing
    Listening,
    /// Stop requested, waiting for the engine to confirm
    Stopping,
    /// A fatal or permission error stopped the session; an explicit user
    /// start is required to leave this state
    Error,
}

impl RecordingState {
    /// Whether a session is live or being brought up.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Listening)
    }
}

/// Snapshot of the session controller for the status surface
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// Current lifecycle state
    pub state: RecordingState,

    /// Id of the current (or most recent) recording session
    pub session_id: Option<String>,

    /// When the current session started
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since the current session started
    pub duration_secs: f64,

    /// Committed transcript length in characters
    pub committed_chars: usize,

    /// User-visible error, if one is being shown
    pub error: Option<String>,
}

/// Transcript buffers as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptView {
    /// Text the engine has committed to
    pub committed: String,

    /// Pending interim text, replaced event by event
    pub interim: String,

    /// Committed plus interim, as rendered in the transcript area
    pub display: String,
}
