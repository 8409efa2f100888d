pub mod config;
pub mod display;
pub mod poller;
pub mod sms;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::display::ConsoleDisplay;
use crate::poller::Poller;
use crate::sms::{CalibrationError, NativeSmsLib, SensorSession, SessionError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error("failed to wait for Ctrl-C: {0}")]
    Signal(#[from] std::io::Error),
}

/// Installs the `tracing` subscriber at `level`.
pub fn init_tracing(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init();
}

/// Reads the sensor and prints each sample until Ctrl-C.
pub async fn run() -> Result<(), AppError> {
    let config = Config::load();
    let level = config
        .as_ref()
        .ok()
        .and_then(|c| c.max_level().ok())
        .unwrap_or(tracing::Level::INFO);
    init_tracing(level);
    let config = config?;

    let backend = NativeSmsLib::acquire()?;
    let session = SensorSession::new(backend);

    // On failure the session is dropped, releasing the sensor, and nothing is shown.
    let handle = Poller::start(session, config.polling_frequency(), ConsoleDisplay::stdout())?;
    tracing::info!(
        "Reading Sudden Motion Sensor at {} Hz (Ctrl-C to quit)",
        handle.polling_frequency()
    );

    tokio::signal::ctrl_c().await?;
    handle.stop().await;
    Ok(())
}
