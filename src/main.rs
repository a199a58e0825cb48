use anyhow::{Context, Result};
use clap::Parser;
use livescribe::devices::{CpalProvider, DeviceManager, PreferenceStore};
use livescribe::http::{create_router, AppState};
use livescribe::recognition::EngineFactory;
use livescribe::session::{SessionConfig, SessionController};
use livescribe::Config;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "livescribe", about = "Continuous dictation session service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/livescribe")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    // Device manager: read the preference once, enumerate once.
    let preference_path = match &cfg.devices.preferences_path {
        Some(path) => PathBuf::from(path),
        None => PreferenceStore::default_path()?,
    };
    let mut devices = DeviceManager::new(
        Box::new(CpalProvider),
        PreferenceStore::new(preference_path),
    );
    devices.initialize();

    // Recognition engine. Failure here means the capability is unavailable:
    // the service still runs so the page can show the error, but the
    // feature is disabled.
    let (controller, unsupported) = match EngineFactory::create(&cfg.recognition).await {
        Ok(engine) => {
            info!("Recognition engine ready: {}", engine.name());
            let controller =
                SessionController::new(engine, SessionConfig::from(&cfg.recognition));
            (Some(controller), None)
        }
        Err(e) => {
            warn!("Speech recognition unavailable: {}", e);
            (
                None,
                Some(format!("Speech recognition is not available: {}", e)),
            )
        }
    };

    let state = AppState::new(controller.clone(), devices, unsupported);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // Release the recognition session and capture handle on the way out.
    if let Some(controller) = controller {
        controller.shutdown().await;
    }

    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
