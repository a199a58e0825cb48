//! Audio input device management
//!
//! Device enumeration sits behind the `DeviceProvider` trait (cpal in
//! production), the user's chosen device persists as a single preference
//! value, and a device change while a session is live triggers a session
//! restart from the HTTP layer.

mod manager;
mod preference;
mod provider;

pub use manager::DeviceManager;
pub use preference::{PreferenceStore, Preferences};
pub use provider::{CpalProvider, DeviceProvider, InputDevice};
