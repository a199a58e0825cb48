use anyhow::Result;
use tokio::sync::mpsc;

use super::events::EngineEvent;
use crate::config::RecognitionConfig;

/// Options for one recognition session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Unique id for this session, echoed back in every engine message
    pub session_id: String,
    /// Recognition language tag (e.g. "en-US")
    pub locale: String,
    /// Keep the session open across utterances
    pub continuous: bool,
    /// Deliver interim (non-final) results
    pub interim_results: bool,
    /// Capture device the engine should listen on, if one was selected
    pub device_id: Option<String>,
}

/// Continuous speech recognition engine trait
///
/// Implementations:
/// - NATS: remote recognition service reached over pub/sub
/// - Scripted: in-process engine driven by tests and local development
#[async_trait::async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Begin a recognition session
    ///
    /// Returns a channel receiver that will receive engine events. The
    /// engine emits `Started` once the session is live and `Ended` when it
    /// terminates, whether or not `stop` was requested.
    async fn start(&mut self, options: SessionOptions) -> Result<mpsc::Receiver<EngineEvent>>;

    /// Request session shutdown
    ///
    /// Confirmation arrives as an `Ended` event on the session channel; the
    /// caller is responsible for bounding how long it waits for it.
    async fn stop(&mut self) -> Result<()>;

    /// Check if a session is currently live
    fn is_active(&self) -> bool;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

/// Recognition engine factory
pub struct EngineFactory;

impl EngineFactory {
    /// Create the engine named by the configuration
    ///
    /// An unknown backend name means the recognition capability is not
    /// available on this installation; callers surface that once and
    /// disable the feature.
    pub async fn create(config: &RecognitionConfig) -> Result<Box<dyn RecognitionEngine>> {
        match config.backend.as_str() {
            "nats" => {
                let engine = super::nats::NatsEngine::connect(&config.url).await?;
                Ok(Box::new(engine))
            }
            "scripted" => Ok(Box::new(super::scripted::ScriptedEngine::new())),
            other => {
                anyhow::bail!("speech recognition backend \"{}\" is not supported", other)
            }
        }
    }
}
