//! callwatch-core – Gemeinsame Typen, Fehlertypen und der Bus-Vertrag
//!
//! Dieses Crate stellt die Bausteine bereit, die sowohl die konkrete
//! D-Bus-Anbindung (`callwatch-ofono`) als auch der Anruf-Monitor
//! (`callwatch-monitor`) gemeinsam nutzen. Es kennt selbst keinen Bus.

pub mod bus;
pub mod error;
pub mod event;
pub mod ofono;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use bus::{Abonnement, EreignisSender, OfonoBus};
pub use error::{CallwatchError, Result};
pub use event::{BusEreignis, StatusGeaendert};
pub use types::{Eigenschaften, ObjektPfad, Wert};
