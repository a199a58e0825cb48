use std::time::Duration;

use crate::config::RecognitionConfig;

/// Configuration for the session controller
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Recognition language tag (e.g. "en-US")
    pub locale: String,

    /// Keep the session open across utterances
    pub continuous: bool,

    /// Deliver interim (non-final) results
    pub interim_results: bool,

    /// How long to wait for the engine to confirm a stop before forcing the
    /// transition to Idle and discarding late events
    pub stop_grace: Duration,

    /// Mandatory settle delay between stop confirmation and the next start
    /// during a restart, so the engine's teardown is never raced
    pub restart_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            continuous: true,
            interim_results: true,
            stop_grace: Duration::from_secs(2),
            restart_settle: Duration::from_millis(250),
        }
    }
}

impl From<&RecognitionConfig> for SessionConfig {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            continuous: config.continuous,
            interim_results: config.interim_results,
            stop_grace: config.stop_grace(),
            restart_settle: config.restart_settle(),
        }
    }
}
