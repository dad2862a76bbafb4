//! Callwatch-Daemon – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Daemon.

use anyhow::Result;
use callwatch_daemon::{config::DaemonConfig, Daemon};
use callwatch_observability::logging_initialisieren;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("CALLWATCH_CONFIG").unwrap_or_else(|_| "callwatch.toml".into());

    let config = DaemonConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Callwatch-Daemon wird initialisiert"
    );

    Daemon::neu(config).starten().await
}
