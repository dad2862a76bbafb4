//! callwatch-monitor – Ueberwachung aktiver Telefonanrufe
//!
//! Beobachtet den oFono-Dienst ueber das [`callwatch_core::OfonoBus`]-Trait und
//! verdichtet den Zustand aller Anrufe auf ein einziges Signal: "mindestens
//! ein Anruf aktiv". Das Signal wird flankengesteuert versendet, nur beim
//! Wechsel zwischen null und nicht-null aktiven Anrufen.
//!
//! ## Module
//! - [`klassifikation`] – Anrufzustaende und die Aktiv/Inaktiv-Einteilung
//! - [`zaehler`] – Aktiv-Zaehler und Versand von [`callwatch_core::StatusGeaendert`]
//! - [`anrufe`] – ein Eintrag pro bekanntem Anruf
//! - [`modems`] – ein Eintrag pro Modem samt Anrufverwaltung
//! - [`monitor`] – Ereignisschleife und oeffentliches Handle [`CallMonitor`]
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use callwatch_monitor::CallMonitor;
//! use callwatch_ofono::{BusTyp, ZbusOfono};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bus = ZbusOfono::verbinden(BusTyp::System, "org.ofono").await?;
//!     let mut monitor = CallMonitor::starten(Arc::new(bus));
//!     let mut status = monitor.abonnieren();
//!
//!     while let Ok(ereignis) = status.recv().await {
//!         println!("Anruf aktiv: {}", ereignis.anruf_aktiv);
//!     }
//!     monitor.beenden().await;
//!     Ok(())
//! }
//! ```

pub mod anrufe;
pub mod klassifikation;
pub mod modems;
pub mod monitor;
pub mod zaehler;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use klassifikation::{AnrufZustand, Klassifikation};
pub use monitor::CallMonitor;
pub use zaehler::{AktivZaehler, StatusMelder};
