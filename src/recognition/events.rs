use serde::{Deserialize, Serialize};

/// A single recognition hypothesis from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Recognized text
    pub transcript: String,
    /// Whether the engine has committed to this text
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn final_text(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }

    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }
}

/// Events emitted by a recognition engine session.
///
/// The engine's callback surface (started/result/error/ended) is folded into
/// one enum so the session controller's transition function can consume it
/// directly and be exercised without a live engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine confirmed the session is live
    Started,
    /// New results, starting at `index` within the session's result list
    Result {
        index: usize,
        results: Vec<RecognitionResult>,
    },
    /// The engine reported an error code (e.g. "no-speech", "not-allowed")
    Error { code: String },
    /// The session ended, whether or not a stop was requested
    Ended,
}
