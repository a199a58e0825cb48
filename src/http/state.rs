use crate::devices::DeviceManager;
use crate::session::SessionController;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The session controller, absent when the recognition capability is
    /// unavailable on this installation
    pub controller: Option<SessionController>,

    /// Input device and preference tracking
    pub devices: Arc<Mutex<DeviceManager>>,

    /// Why recognition is unavailable, when it is
    pub unsupported: Option<String>,
}

impl AppState {
    pub fn new(
        controller: Option<SessionController>,
        devices: DeviceManager,
        unsupported: Option<String>,
    ) -> Self {
        Self {
            controller,
            devices: Arc::new(Mutex::new(devices)),
            unsupported,
        }
    }
}
