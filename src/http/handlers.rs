use super::state::AppState;
use crate::clipboard;
use crate::devices::InputDevice;
use crate::session::SessionController;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct CopyResponse {
    /// False when the transcript was empty and nothing was copied
    pub copied: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectDeviceRequest {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<InputDevice>,
    pub selected: Option<String>,
    pub is_initializing: bool,
    pub error: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

fn recognition_unavailable(state: &AppState) -> axum::response::Response {
    let error = state
        .unsupported
        .clone()
        .unwrap_or_else(|| "Speech recognition is not available.".to_string());

    (StatusCode::NOT_IMPLEMENTED, Json(ErrorResponse { error })).into_response()
}

fn controller(state: &AppState) -> Result<&SessionController, axum::response::Response> {
    state
        .controller
        .as_ref()
        .ok_or_else(|| recognition_unavailable(state))
}

/// POST /session/start
/// Begin a new recording session using the selected input device
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    let controller = match controller(&state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let device = {
        let devices = state.devices.lock().await;
        devices.selected().map(str::to_string)
    };

    match controller.start(device).await {
        Ok(()) => (StatusCode::OK, Json(controller.status().await)).into_response(),
        Err(e) => {
            error!("Failed to start session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to start session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /session/stop
/// Stop the current recording session
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    let controller = match controller(&state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match controller.stop().await {
        Ok(()) => (StatusCode::OK, Json(controller.status().await)).into_response(),
        Err(e) => {
            error!("Failed to stop session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to stop session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /session/status
/// Current lifecycle state, timing, and the user-visible error slot
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let controller = match controller(&state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    (StatusCode::OK, Json(controller.status().await)).into_response()
}

/// GET /session/transcript
/// Committed text plus the pending interim segment
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let controller = match controller(&state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    (StatusCode::OK, Json(controller.transcript().await)).into_response()
}

/// POST /session/transcript/clear
/// Empty the transcript, in any state
pub async fn clear_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let controller = match controller(&state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    controller.clear_transcript().await;

    (StatusCode::OK, Json(controller.transcript().await)).into_response()
}

/// POST /session/transcript/copy
/// Copy the displayed transcript to the system clipboard
pub async fn copy_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let controller = match controller(&state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let view = controller.transcript().await;

    match clipboard::copy_text(&view.display) {
        Ok(copied) => (StatusCode::OK, Json(CopyResponse { copied })).into_response(),
        Err(e) => {
            error!("Clipboard write failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Could not copy to clipboard: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /devices
/// List audio input devices and the current selection
pub async fn list_devices(State(state): State<AppState>) -> impl IntoResponse {
    device_list_snapshot(&state).await.into_response()
}

/// POST /devices/select
/// Choose an input device; restarts the session when one is active
pub async fn select_device(
    State(state): State<AppState>,
    Json(req): Json<SelectDeviceRequest>,
) -> impl IntoResponse {
    let selected = {
        let mut devices = state.devices.lock().await;

        if let Err(e) = devices.select(&req.device_id) {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }

        devices.selected().map(str::to_string)
    };

    if let Some(controller) = &state.controller {
        if controller.state().is_active() {
            info!("Device changed while listening; restarting session");

            if let Err(e) = controller.restart(selected).await {
                error!("Restart after device change failed: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!("Failed to restart with the new device: {}", e),
                    }),
                )
                    .into_response();
            }
        }
    }

    device_list_snapshot(&state).await.into_response()
}

/// POST /devices/refresh
/// Device-change notification: re-enumerate and apply fallback selection
pub async fn refresh_devices(State(state): State<AppState>) -> impl IntoResponse {
    let (selection_changed, selected) = {
        let mut devices = state.devices.lock().await;
        let changed = devices.handle_devices_changed();
        (changed, devices.selected().map(str::to_string))
    };

    if selection_changed {
        if let Some(controller) = &state.controller {
            if controller.state().is_active() {
                if let Err(e) = controller.restart(selected).await {
                    error!("Restart after device fallback failed: {}", e);
                }
            }
        }
    }

    device_list_snapshot(&state).await.into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn device_list_snapshot(state: &AppState) -> (StatusCode, Json<DeviceListResponse>) {
    let devices = state.devices.lock().await;

    (
        StatusCode::OK,
        Json(DeviceListResponse {
            devices: devices.devices().to_vec(),
            selected: devices.selected().map(str::to_string),
            is_initializing: devices.is_initializing(),
            error: devices.last_error().map(str::to_string),
        }),
    )
}
