//! Recognition session management
//!
//! This module provides the `SessionController` abstraction that manages:
//! - The recognition session lifecycle (start/stop/restart)
//! - Auto-restart masking of spurious engine terminations
//! - Transcript accumulation (committed + pending interim text)
//! - Error classification and the single user-visible error slot

mod config;
mod controller;
mod error;
mod status;
mod transcript;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::RecognitionErrorKind;
pub use status::{RecordingState, SessionStatus, TranscriptView};
pub use transcript::Transcript;
