use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::engine::{RecognitionEngine, SessionOptions};
use super::events::EngineEvent;
use super::messages::{EngineEventMessage, SessionCommand};

const CONTROL_SUBJECT: &str = "recognition.session.control";
const EVENT_SUBJECT: &str = "recognition.events.>";

/// Recognition engine backed by a remote service over NATS
///
/// Control commands go out on a single subject; session events come back on
/// a wildcard subscription and are filtered by session id, so late messages
/// from a previous session never reach the current one.
pub struct NatsEngine {
    client: Client,
    active: Arc<AtomicBool>,
    session: Option<ActiveSession>,
}

struct ActiveSession {
    options: SessionOptions,
    task: JoinHandle<()>,
}

impl NatsEngine {
    /// Connect to the recognition service's NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to recognition service at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to the recognition service")?;

        info!("Connected to recognition service");

        Ok(Self {
            client,
            active: Arc::new(AtomicBool::new(false)),
            session: None,
        })
    }

    async fn publish_command(&self, command: &str, options: &SessionOptions) -> Result<()> {
        let message = SessionCommand {
            session_id: options.session_id.clone(),
            command: command.to_string(),
            locale: options.locale.clone(),
            continuous: options.continuous,
            interim_results: options.interim_results,
            device_id: options.device_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(CONTROL_SUBJECT, payload.into())
            .await
            .with_context(|| format!("Failed to publish {} command", command))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RecognitionEngine for NatsEngine {
    async fn start(&mut self, options: SessionOptions) -> Result<mpsc::Receiver<EngineEvent>> {
        // A previous session's listener may still be draining; replace it.
        if let Some(old) = self.session.take() {
            warn!("Replacing live session {}", old.options.session_id);
            old.task.abort();
        }

        let mut subscriber = self
            .client
            .subscribe(EVENT_SUBJECT)
            .await
            .context("Failed to subscribe to recognition events")?;

        self.publish_command("start", &options).await?;

        let (tx, rx) = mpsc::channel(64);
        let session_id = options.session_id.clone();
        let active = Arc::clone(&self.active);
        active.store(true, Ordering::SeqCst);

        let task_session_id = session_id.clone();
        let task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let message = match serde_json::from_slice::<EngineEventMessage>(&msg.payload) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("Failed to parse recognition event: {}", e);
                        continue;
                    }
                };

                if message.session_id != task_session_id {
                    continue;
                }

                let event = match message.event.as_str() {
                    "started" => EngineEvent::Started,
                    "result" => EngineEvent::Result {
                        index: message.index.unwrap_or(0),
                        results: message.results.unwrap_or_default(),
                    },
                    "error" => EngineEvent::Error {
                        code: message.code.unwrap_or_else(|| "unknown".to_string()),
                    },
                    "ended" => EngineEvent::Ended,
                    other => {
                        warn!("Unknown recognition event \"{}\"", other);
                        continue;
                    }
                };

                let ended = matches!(event, EngineEvent::Ended);

                if tx.send(event).await.is_err() {
                    // Session consumer went away; nothing left to deliver to.
                    break;
                }

                if ended {
                    break;
                }
            }

            active.store(false, Ordering::SeqCst);
        });

        info!("Recognition session {} requested", session_id);

        self.session = Some(ActiveSession { options, task });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };

        info!("Requesting stop for session {}", session.options.session_id);

        let options = session.options.clone();
        self.publish_command("stop", &options).await?;

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "nats"
    }
}
