use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::error::RecognitionErrorKind;
use super::status::{RecordingState, SessionStatus, TranscriptView};
use super::transcript::Transcript;
use crate::recognition::{EngineEvent, RecognitionEngine, SessionOptions};

/// Owns the recognition session lifecycle and the accumulated transcript
///
/// One controller drives at most one engine session at a time. Engine
/// events are pumped through a per-session task; each session carries an
/// epoch token, so events from a torn-down session are discarded instead of
/// landing in its successor's transcript.
#[derive(Clone)]
pub struct SessionController {
    engine: Arc<Mutex<Box<dyn RecognitionEngine>>>,
    core: Arc<Mutex<Core>>,
    config: SessionConfig,
    epoch: Arc<AtomicU64>,
    state_tx: watch::Sender<RecordingState>,
}

struct Core {
    state: RecordingState,
    transcript: Transcript,
    error: Option<String>,
    intentional_stop: bool,
    session_id: Option<String>,
    started_at: Option<chrono::DateTime<Utc>>,
    options: Option<SessionOptions>,
    pump: Option<JoinHandle<()>>,
}

impl Core {
    fn set_state(&mut self, state: RecordingState, tx: &watch::Sender<RecordingState>) {
        if self.state != state {
            debug!("session state: {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        tx.send_replace(state);
    }
}

/// What the event pump should do after handling an event.
enum Flow {
    Continue,
    Stop,
    Restart,
}

impl SessionController {
    pub fn new(engine: Box<dyn RecognitionEngine>, config: SessionConfig) -> Self {
        let (state_tx, _) = watch::channel(RecordingState::Idle);

        Self {
            engine: Arc::new(Mutex::new(engine)),
            core: Arc::new(Mutex::new(Core {
                state: RecordingState::Idle,
                transcript: Transcript::new(),
                error: None,
                intentional_stop: false,
                session_id: None,
                started_at: None,
                options: None,
                pump: None,
            })),
            config,
            epoch: Arc::new(AtomicU64::new(0)),
            state_tx,
        }
    }

    /// Begin a new recording session
    ///
    /// Valid from Idle and Error. A start while a session is already live
    /// is a no-op; a start while a stop is in progress is refused, because
    /// a stop always runs to completion first. The transcript is reset at
    /// this instant and never mid-session.
    pub async fn start(&self, device: Option<String>) -> Result<()> {
        {
            let mut core = self.core.lock().await;
            match core.state {
                RecordingState::Starting | RecordingState::Listening => {
                    debug!("Start ignored: session already active");
                    return Ok(());
                }
                RecordingState::Stopping => bail!("a stop is still in progress"),
                RecordingState::Idle | RecordingState::Error => {}
            }

            core.error = None;
            core.transcript.clear();
        }

        self.begin_session(device).await
    }

    /// Stop the current recording session
    ///
    /// Requests engine shutdown and waits for the Ended confirmation up to
    /// the grace period; on expiry the transition to Idle is forced and
    /// any late events from the session are discarded.
    pub async fn stop(&self) -> Result<()> {
        {
            let mut core = self.core.lock().await;
            match core.state {
                RecordingState::Listening | RecordingState::Starting => {}
                _ => return Ok(()),
            }

            core.intentional_stop = true;
            core.set_state(RecordingState::Stopping, &self.state_tx);
        }

        {
            let mut engine = self.engine.lock().await;
            if let Err(e) = engine.stop().await {
                warn!("Engine stop request failed: {}", e);
            }
        }

        let mut state_rx = self.state_tx.subscribe();
        let confirmed = timeout(self.config.stop_grace, async {
            loop {
                if *state_rx.borrow_and_update() != RecordingState::Stopping {
                    break;
                }
                if state_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .is_ok();

        if !confirmed {
            warn!(
                "Engine did not confirm stop within {:?}; forcing Idle",
                self.config.stop_grace
            );

            // Void the session token so late callbacks no-op.
            self.epoch.fetch_add(1, Ordering::SeqCst);

            let mut core = self.core.lock().await;
            if let Some(pump) = core.pump.take() {
                pump.abort();
            }
            core.transcript.drop_interim();
            core.set_state(RecordingState::Idle, &self.state_tx);
        }

        Ok(())
    }

    /// Tear down the current session and start a fresh one, preserving the
    /// committed transcript. Used when the input device changes. The old
    /// session is fully quiesced and a settle delay observed before the
    /// next start, so the engine's teardown is never raced. No-op when no
    /// session is active.
    pub async fn restart(&self, device: Option<String>) -> Result<()> {
        let active = { self.core.lock().await.state.is_active() };
        if !active {
            debug!("Restart ignored: no active session");
            return Ok(());
        }

        self.stop().await?;
        tokio::time::sleep(self.config.restart_settle).await;
        self.begin_session(device).await
    }

    /// Stop any active session. Called on service shutdown.
    pub async fn shutdown(&self) {
        if let Err(e) = self.stop().await {
            warn!("Session stop during shutdown failed: {}", e);
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let core = self.core.lock().await;

        let duration_secs = core
            .started_at
            .map(|t| Utc::now().signed_duration_since(t).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        SessionStatus {
            state: core.state,
            session_id: core.session_id.clone(),
            started_at: core.started_at,
            duration_secs,
            committed_chars: core.transcript.committed().len(),
            error: core.error.clone(),
        }
    }

    pub async fn transcript(&self) -> TranscriptView {
        let core = self.core.lock().await;

        TranscriptView {
            committed: core.transcript.committed().to_string(),
            interim: core.transcript.interim().to_string(),
            display: core.transcript.display(),
        }
    }

    /// Empty the transcript. Valid in any state, including mid-session.
    pub async fn clear_transcript(&self) {
        let mut core = self.core.lock().await;
        core.transcript.clear();
    }

    pub fn state(&self) -> RecordingState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<RecordingState> {
        self.state_tx.subscribe()
    }

    /// Bring up an engine session and its event pump. The committed
    /// transcript is left untouched; clearing is the caller's decision.
    async fn begin_session(&self, device: Option<String>) -> Result<()> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = uuid::Uuid::new_v4().to_string();

        let options = SessionOptions {
            session_id: session_id.clone(),
            locale: self.config.locale.clone(),
            continuous: self.config.continuous,
            interim_results: self.config.interim_results,
            device_id: device,
        };

        {
            let mut core = self.core.lock().await;
            if let Some(pump) = core.pump.take() {
                pump.abort();
            }
            core.intentional_stop = false;
            core.session_id = Some(session_id.clone());
            core.started_at = Some(Utc::now());
            core.options = Some(options.clone());
            core.set_state(RecordingState::Starting, &self.state_tx);
        }

        let rx = {
            let mut engine = self.engine.lock().await;
            engine.start(options).await
        };

        let rx = match rx {
            Ok(rx) => rx,
            Err(e) => {
                error!("Engine start failed: {}", e);
                let mut core = self.core.lock().await;
                core.error = Some(format!("Could not start speech recognition: {}", e));
                core.set_state(RecordingState::Error, &self.state_tx);
                return Err(e);
            }
        };

        let controller = self.clone();
        let pump = tokio::spawn(async move {
            controller.pump(epoch, rx).await;
        });

        {
            let mut core = self.core.lock().await;
            core.pump = Some(pump);
        }

        info!("Recognition session {} starting", session_id);

        Ok(())
    }

    /// Per-session event loop. Exits when the session is over; re-requests
    /// an engine start in place when an unexpected end has to be masked.
    async fn pump(&self, epoch: u64, mut rx: mpsc::Receiver<EngineEvent>) {
        let mut channel_closed = false;

        loop {
            let event = match rx.recv().await {
                Some(event) => event,
                None if channel_closed => break,
                None => {
                    // Engine dropped the channel without an Ended event;
                    // treat it as one.
                    channel_closed = true;
                    EngineEvent::Ended
                }
            };

            match self.handle_event(epoch, event).await {
                Flow::Continue => {}
                Flow::Stop => break,
                Flow::Restart => {
                    let options = { self.core.lock().await.options.clone() };
                    let Some(options) = options else { break };

                    let result = {
                        let mut engine = self.engine.lock().await;
                        engine.start(options).await
                    };

                    match result {
                        Ok(new_rx) => {
                            rx = new_rx;
                            channel_closed = false;
                            info!("Recognition session re-requested after unexpected end");
                        }
                        Err(e) => {
                            error!("Auto-restart failed: {}", e);
                            let mut core = self.core.lock().await;
                            core.error =
                                Some(format!("Could not restart speech recognition: {}", e));
                            core.set_state(RecordingState::Error, &self.state_tx);
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_event(&self, epoch: u64, event: EngineEvent) -> Flow {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            // Event from a torn-down session.
            return Flow::Stop;
        }

        let mut core = self.core.lock().await;

        match event {
            EngineEvent::Started => {
                if core.state == RecordingState::Starting {
                    core.error = None;
                    core.set_state(RecordingState::Listening, &self.state_tx);
                }
                Flow::Continue
            }

            EngineEvent::Result { index, results } => {
                match core.state {
                    RecordingState::Listening => core.transcript.apply(index, &results),
                    _ => debug!("Result outside a live session ignored"),
                }
                Flow::Continue
            }

            EngineEvent::Error { code } => {
                let kind = RecognitionErrorKind::classify(&code);

                if kind == RecognitionErrorKind::Transient {
                    debug!("Transient recognition error absorbed: {}", code);
                    return Flow::Continue;
                }

                error!("Recognition session error: {}", code);
                core.error = Some(kind.user_message(&code));
                core.intentional_stop = true;
                core.transcript.drop_interim();
                core.set_state(RecordingState::Error, &self.state_tx);
                drop(core);

                // Make sure the engine session is released even though the
                // user never asked for a stop.
                let mut engine = self.engine.lock().await;
                if let Err(e) = engine.stop().await {
                    warn!("Engine stop after error failed: {}", e);
                }

                Flow::Continue
            }

            EngineEvent::Ended => {
                core.transcript.drop_interim();

                match core.state {
                    RecordingState::Stopping => {
                        core.set_state(RecordingState::Idle, &self.state_tx);
                        Flow::Stop
                    }
                    RecordingState::Listening if !core.intentional_stop => {
                        info!("Recognition session ended unexpectedly; restarting");
                        core.set_state(RecordingState::Starting, &self.state_tx);
                        Flow::Restart
                    }
                    RecordingState::Listening => {
                        core.set_state(RecordingState::Idle, &self.state_tx);
                        Flow::Stop
                    }
                    RecordingState::Starting => {
                        core.error =
                            Some("Speech recognition ended before it started.".to_string());
                        core.set_state(RecordingState::Error, &self.state_tx);
                        Flow::Stop
                    }
                    RecordingState::Idle | RecordingState::Error => Flow::Stop,
                }
            }
        }
    }
}
