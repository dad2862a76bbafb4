//! callwatch-daemon – Bibliotheks-Root
//!
//! Verbindet die Konfiguration mit Bus-Schicht und Anruf-Monitor.

pub mod config;

use std::sync::Arc;

use anyhow::Result;
use callwatch_monitor::CallMonitor;
use callwatch_ofono::ZbusOfono;
use config::DaemonConfig;
use tokio::sync::broadcast::error::RecvError;

/// Zeile auf stdout fuer einen Statuswechsel
pub fn statuszeile(anruf_aktiv: bool) -> &'static str {
    if anruf_aktiv {
        "call-active"
    } else {
        "call-idle"
    }
}

/// Haelt den laufenden Daemon-Zustand zusammen
pub struct Daemon {
    pub config: DaemonConfig,
}

impl Daemon {
    /// Erstellt einen neuen Daemon aus der gegebenen Konfiguration
    pub fn neu(config: DaemonConfig) -> Self {
        Self { config }
    }

    /// Verbindet den Bus, startet den Monitor und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Bus-Verbindung herstellen
    /// 2. Anruf-Monitor starten
    /// 3. Statuswechsel ausgeben bis Ctrl-C / SIGTERM
    /// 4. Monitor beenden
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            dienst = %self.config.ofono.dienst,
            bus = ?self.config.ofono.bus,
            "Daemon startet"
        );

        let bus = ZbusOfono::verbinden(self.config.ofono.bus.into(), &self.config.ofono.dienst)
            .await?;
        let mut monitor = CallMonitor::starten(Arc::new(bus));
        let mut status = monitor.abonnieren();

        tracing::info!("Daemon laeuft. Warte auf Shutdown-Signal (Ctrl-C / SIGTERM)...");
        let stopp = shutdown_signal();
        tokio::pin!(stopp);

        loop {
            tokio::select! {
                ergebnis = &mut stopp => {
                    ergebnis?;
                    tracing::info!("Shutdown-Signal empfangen, Daemon wird beendet");
                    break;
                }
                empfangen = status.recv() => match empfangen {
                    Ok(ereignis) => self.melden(ereignis.anruf_aktiv),
                    Err(RecvError::Lagged(verpasst)) => {
                        tracing::warn!(verpasst, "Statuswechsel verpasst");
                        self.melden(monitor.anruf_aktiv());
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!("Anruf-Monitor hat sich beendet");
                        break;
                    }
                },
            }
        }

        monitor.beenden().await;
        Ok(())
    }

    fn melden(&self, anruf_aktiv: bool) {
        if self.config.ausgabe.stdout {
            println!("{}", statuszeile(anruf_aktiv));
        }
    }
}

/// Wartet auf Ctrl-C oder SIGTERM
#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        ergebnis = tokio::signal::ctrl_c() => ergebnis,
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuszeilen() {
        assert_eq!(statuszeile(true), "call-active");
        assert_eq!(statuszeile(false), "call-idle");
    }
}
