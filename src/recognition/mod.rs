//! Recognition capability boundary
//!
//! The platform's continuous speech recognition is consumed as an opaque
//! engine behind the `RecognitionEngine` trait: start a session, receive a
//! stream of `EngineEvent`s, request a stop. The production engine talks to
//! a remote recognition service over NATS; the scripted engine exists for
//! tests and local development.

pub mod engine;
pub mod events;
pub mod messages;
pub mod nats;
pub mod scripted;

pub use engine::{EngineFactory, RecognitionEngine, SessionOptions};
pub use events::{EngineEvent, RecognitionResult};
pub use messages::{EngineEventMessage, SessionCommand};
pub use nats::NatsEngine;
pub use scripted::{ScriptedEngine, ScriptedHandle};
