pub mod clipboard;
pub mod config;
pub mod devices;
pub mod http;
pub mod recognition;
pub mod session;

pub use config::Config;
pub use devices::{CpalProvider, DeviceManager, DeviceProvider, InputDevice, PreferenceStore};
pub use http::{create_router, AppState};
pub use recognition::{
    EngineEvent, EngineFactory, RecognitionEngine, RecognitionResult, ScriptedEngine,
    SessionOptions,
};
pub use session::{
    RecordingState, SessionConfig, SessionController, SessionStatus, Transcript, TranscriptView,
};
