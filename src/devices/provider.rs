use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use serde::Serialize;

/// An audio input device as shown in the device selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDevice {
    /// Opaque identifier used for selection and persistence
    pub id: String,
    /// Human-readable name
    pub label: String,
}

/// Platform device capability seam
///
/// The real implementation sits on cpal; tests substitute their own.
pub trait DeviceProvider: Send + Sync {
    /// Request a transient capture grant so device labels are available.
    /// The grant is released immediately; nothing is recorded.
    fn request_access(&self) -> Result<()>;

    /// List the available audio input devices.
    fn list_input_devices(&self) -> Result<Vec<InputDevice>>;
}

/// Device provider backed by the host audio subsystem.
pub struct CpalProvider;

impl DeviceProvider for CpalProvider {
    fn request_access(&self) -> Result<()> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .context("No audio input device available")?;

        // Querying the input config touches the device, which raises the
        // OS capture prompt on platforms that gate microphone access. No
        // stream is opened.
        device
            .default_input_config()
            .context("Microphone access was denied")?;

        Ok(())
    }

    fn list_input_devices(&self) -> Result<Vec<InputDevice>> {
        let host = cpal::default_host();

        let devices = host
            .input_devices()
            .context("Failed to enumerate audio input devices")?;

        let mut list = Vec::new();
        for device in devices {
            // Devices that refuse to report a name are unusable for
            // selection; skip them.
            let Ok(name) = device.name() else { continue };
            list.push(InputDevice {
                id: name.clone(),
                label: name,
            });
        }

        Ok(list)
    }
}
