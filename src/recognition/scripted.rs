use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::engine::{RecognitionEngine, SessionOptions};
use super::events::EngineEvent;

/// In-process recognition engine driven from the outside
///
/// Used by tests and local development: sessions emit no events on their
/// own, a `ScriptedHandle` feeds them in. `Started` is emitted as soon as a
/// session begins; a confirming engine emits `Ended` on stop, an
/// unresponsive one swallows the stop request so callers can exercise
/// their grace-period handling.
pub struct ScriptedEngine {
    shared: Arc<Shared>,
    confirm_stop: bool,
}

struct Shared {
    feed: Mutex<Option<mpsc::Sender<EngineEvent>>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
    last_options: Mutex<Option<SessionOptions>>,
    active: AtomicBool,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                feed: Mutex::new(None),
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                last_options: Mutex::new(None),
                active: AtomicBool::new(false),
            }),
            confirm_stop: true,
        }
    }

    /// An engine that never confirms stop requests
    pub fn unresponsive() -> Self {
        let mut engine = Self::new();
        engine.confirm_stop = false;
        engine
    }

    /// Get a handle for feeding events into the current session
    pub fn handle(&self) -> ScriptedHandle {
        ScriptedHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecognitionEngine for ScriptedEngine {
    async fn start(&mut self, options: SessionOptions) -> Result<mpsc::Receiver<EngineEvent>> {
        let (tx, rx) = mpsc::channel(64);

        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        *self.shared.last_options.lock().unwrap() = Some(options);

        // The capability confirms the session immediately.
        let _ = tx.try_send(EngineEvent::Started);

        *self.shared.feed.lock().unwrap() = Some(tx);
        self.shared.active.store(true, Ordering::SeqCst);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.shared.stops.fetch_add(1, Ordering::SeqCst);
        self.shared.active.store(false, Ordering::SeqCst);

        if self.confirm_stop {
            let feed = self.shared.feed.lock().unwrap().clone();
            if let Some(tx) = feed {
                let _ = tx.send(EngineEvent::Ended).await;
            }
        }

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Test/dev handle into a `ScriptedEngine`'s current session.
#[derive(Clone)]
pub struct ScriptedHandle {
    shared: Arc<Shared>,
}

impl ScriptedHandle {
    /// Feed an event into the current session. Returns false if no session
    /// is accepting events.
    pub async fn emit(&self, event: EngineEvent) -> bool {
        let feed = self.shared.feed.lock().unwrap().clone();
        match feed {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// End the current session from the engine side, as a spurious
    /// termination would (no stop request involved).
    pub async fn end_session(&self) -> bool {
        self.emit(EngineEvent::Ended).await
    }

    /// Sender for the current session's event channel, if one is live.
    /// Lets tests hold on to a torn-down session's feed and prove its late
    /// events go nowhere.
    pub fn session_feed(&self) -> Option<mpsc::Sender<EngineEvent>> {
        self.shared.feed.lock().unwrap().clone()
    }

    /// Number of times a session was started.
    pub fn starts(&self) -> usize {
        self.shared.starts.load(Ordering::SeqCst)
    }

    /// Number of stop requests received.
    pub fn stops(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent start.
    pub fn last_options(&self) -> Option<SessionOptions> {
        self.shared.last_options.lock().unwrap().clone()
    }
}
