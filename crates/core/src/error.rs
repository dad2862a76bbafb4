//! Fehlertypen fuer Callwatch
//!
//! Zentraler Fehler-Enum fuer alle Crates des Workspaces. Die D-Bus-Schicht
//! bildet ihre eigenen Fehler auf [`CallwatchError::Bus`] bzw.
//! [`CallwatchError::Verbindung`] ab.

use thiserror::Error;

/// Globaler Result-Alias fuer Callwatch
pub type Result<T> = std::result::Result<T, CallwatchError>;

/// Alle moeglichen Fehler im Callwatch-System
#[derive(Debug, Error)]
pub enum CallwatchError {
    // --- Verbindung & Bus ---
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Bus-Fehler: {0}")]
    Bus(String),

    #[error("Objekt nicht gefunden: {0}")]
    ObjektNichtGefunden(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),
}

impl CallwatchError {
    /// Erstellt einen Verbindungsfehler
    pub fn verbindung(msg: impl Into<String>) -> Self {
        Self::Verbindung(msg.into())
    }

    /// Erstellt einen Bus-Fehler
    pub fn bus(msg: impl Into<String>) -> Self {
        Self::Bus(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler wiederholbar sein koennte
    ///
    /// Der Monitor selbst wiederholt nie; die Information ist fuer Aufrufer
    /// gedacht, die z.B. den Daemon neu starten wollen.
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(self, Self::Verbindung(_) | Self::Bus(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = CallwatchError::verbindung("Systembus nicht erreichbar");
        assert_eq!(
            e.to_string(),
            "Verbindung fehlgeschlagen: Systembus nicht erreichbar"
        );
    }

    #[test]
    fn wiederholbar_erkennung() {
        assert!(CallwatchError::bus("timeout").ist_wiederholbar());
        assert!(CallwatchError::verbindung("weg").ist_wiederholbar());
        assert!(!CallwatchError::Konfiguration("kaputt".into()).ist_wiederholbar());
        assert!(!CallwatchError::ObjektNichtGefunden("/m1/c1".into()).ist_wiederholbar());
    }
}
