//! HTTP API server for the dictation screen
//!
//! This module provides the REST surface the page talks to:
//! - POST /session/start, /session/stop - record/stop toggle
//! - GET /session/status - lifecycle state and the error banner slot
//! - GET /session/transcript - committed + interim text
//! - POST /session/transcript/clear, /session/transcript/copy
//! - GET /devices, POST /devices/select, POST /devices/refresh
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
