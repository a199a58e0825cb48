use anyhow::{bail, Result};
use tracing::{info, warn};

use super::preference::{PreferenceStore, Preferences};
use super::provider::{DeviceProvider, InputDevice};

const PERMISSION_MESSAGE: &str =
    "Please grant microphone permission to list audio input devices.";

/// Tracks the available input devices and the user's persisted choice
///
/// Enumeration failures leave the previous device list in place (empty on
/// the first failure) and surface a permission message. The preference file
/// is written only on user-driven selection, never on automatic fallback.
pub struct DeviceManager {
    provider: Box<dyn DeviceProvider>,
    store: PreferenceStore,
    devices: Vec<InputDevice>,
    selected: Option<String>,
    is_initializing: bool,
    last_error: Option<String>,
}

impl DeviceManager {
    pub fn new(provider: Box<dyn DeviceProvider>, store: PreferenceStore) -> Self {
        Self {
            provider,
            store,
            devices: Vec::new(),
            selected: None,
            is_initializing: true,
            last_error: None,
        }
    }

    /// Load the persisted preference and run the first enumeration. If the
    /// persisted device is gone, selection falls back to the first
    /// available device without overwriting the preference.
    pub fn initialize(&mut self) {
        let prefs = self.store.load();
        self.selected = prefs.input_device;

        if let Err(e) = self.enumerate() {
            warn!("Initial device enumeration failed: {}", e);
        }

        if let Some(selected) = self.selected.clone() {
            if !self.contains(&selected) {
                let fallback = self.devices.first().map(|d| d.id.clone());
                warn!(
                    "Preferred device \"{}\" not present; using {:?}",
                    selected, fallback
                );
                self.selected = fallback;
            }
        }

        self.is_initializing = false;
    }

    /// Refresh the device list. Requests a transient capture grant to
    /// unlock device labels, then lists audio inputs.
    pub fn enumerate(&mut self) -> Result<()> {
        let result = self
            .provider
            .request_access()
            .and_then(|_| self.provider.list_input_devices());

        match result {
            Ok(devices) => {
                info!("Enumerated {} audio input devices", devices.len());
                self.devices = devices;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Device enumeration failed: {}", e);
                self.last_error = Some(PERMISSION_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Select a device from the current list and persist the choice.
    pub fn select(&mut self, device_id: &str) -> Result<()> {
        if !self.contains(device_id) {
            bail!("unknown input device \"{}\"", device_id);
        }

        self.selected = Some(device_id.to_string());
        self.store.save(&Preferences {
            input_device: self.selected.clone(),
        })?;

        info!("Input device selected: {}", device_id);

        Ok(())
    }

    /// Platform device-change notification: re-enumerate, and if the
    /// selected device disappeared, fall back to the first available one
    /// (or none). Returns true when the selection changed, in which case
    /// an active session needs a restart.
    pub fn handle_devices_changed(&mut self) -> bool {
        let _ = self.enumerate();

        match self.selected.clone() {
            Some(selected) if !self.contains(&selected) => {
                let fallback = self.devices.first().map(|d| d.id.clone());
                warn!(
                    "Selected device \"{}\" disappeared; falling back to {:?}",
                    selected, fallback
                );
                self.selected = fallback;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.iter().any(|d| d.id == device_id)
    }

    pub fn devices(&self) -> &[InputDevice] {
        &self.devices
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_initializing(&self) -> bool {
        self.is_initializing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
