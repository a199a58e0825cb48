use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub devices: DevicesConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct RecognitionConfig {
    /// Which engine implementation to use ("nats" or "scripted")
    pub backend: String,

    /// NATS server URL for the recognition service
    pub url: String,

    /// Recognition language tag (e.g. "en-US")
    pub locale: String,

    /// Keep the session open across utterances
    pub continuous: bool,

    /// Deliver interim (non-final) results
    pub interim_results: bool,

    /// How long to wait for the engine to confirm a stop before forcing Idle
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,

    /// Settle delay between stop confirmation and the next start on restart
    #[serde(default = "default_restart_settle_ms")]
    pub restart_settle_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct DevicesConfig {
    /// Override for the preference file path
    pub preferences_path: Option<String>,
}

fn default_stop_grace_ms() -> u64 {
    2000
}

fn default_restart_settle_ms() -> u64 {
    250
}

impl RecognitionConfig {
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    pub fn restart_settle(&self) -> Duration {
        Duration::from_millis(self.restart_settle_ms)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
