use serde::{Deserialize, Serialize};

use super::events::RecognitionResult;

/// Session control command published to the recognition service
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCommand {
    pub session_id: String,
    pub command: String, // "start" | "stop"
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub device_id: Option<String>,
    pub timestamp: String, // RFC3339 timestamp
}

/// Engine event message received from the recognition service
#[derive(Debug, Serialize, Deserialize)]
pub struct EngineEventMessage {
    pub session_id: String,
    pub event: String, // "started" | "result" | "error" | "ended"
    pub index: Option<usize>,
    pub results: Option<Vec<RecognitionResult>>,
    pub code: Option<String>,
    pub timestamp: String,
}
