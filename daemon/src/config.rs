//! Daemon-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Daemon ohne Konfigurationsdatei
//! lauffaehig ist.

use callwatch_observability::{log_format_gueltig, log_level_gueltig};
use callwatch_ofono::BusTyp;
use serde::{Deserialize, Serialize};

/// Vollstaendige Daemon-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Verbindung zum oFono-Dienst
    pub ofono: OfonoEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Ausgabe der Statuswechsel
    pub ausgabe: AusgabeEinstellungen,
}

/// Welcher Bus verwendet wird (`system` oder `session`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusWahl {
    #[default]
    System,
    Session,
}

impl From<BusWahl> for BusTyp {
    fn from(wahl: BusWahl) -> Self {
        match wahl {
            BusWahl::System => BusTyp::System,
            BusWahl::Session => BusTyp::Session,
        }
    }
}

/// oFono-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfonoEinstellungen {
    /// Bus-Name des Dienstes
    pub dienst: String,
    pub bus: BusWahl,
}

impl Default for OfonoEinstellungen {
    fn default() -> Self {
        Self {
            dienst: callwatch_core::ofono::DIENST.into(),
            bus: BusWahl::System,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Ausgabe-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AusgabeEinstellungen {
    /// Eine Zeile pro Statuswechsel auf stdout (`call-active` / `call-idle`)
    pub stdout: bool,
}

impl Default for AusgabeEinstellungen {
    fn default() -> Self {
        Self { stdout: true }
    }
}

impl DaemonConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        config.validieren()?;
        Ok(config)
    }

    /// Parst eine Konfiguration aus einem TOML-String
    pub fn aus_toml(inhalt: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(inhalt)
    }

    /// Prueft die Werte, die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if self.ofono.dienst.trim().is_empty() {
            anyhow::bail!("ofono.dienst darf nicht leer sein");
        }
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format '{}'", self.logging.format);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = DaemonConfig::default();
        assert_eq!(cfg.ofono.dienst, "org.ofono");
        assert_eq!(cfg.ofono.bus, BusWahl::System);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.ausgabe.stdout);
        assert!(cfg.validieren().is_ok());
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [ofono]
            bus = "session"

            [logging]
            format = "json"
        "#;
        let cfg = DaemonConfig::aus_toml(toml).unwrap();
        assert_eq!(cfg.ofono.bus, BusWahl::Session);
        assert_eq!(cfg.logging.format, "json");
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.ofono.dienst, "org.ofono");
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.ausgabe.stdout);
    }

    #[test]
    fn unbekannter_bus_ist_fehler() {
        let toml = r#"
            [ofono]
            bus = "peer"
        "#;
        assert!(DaemonConfig::aus_toml(toml).is_err());
    }

    #[test]
    fn validierung_lehnt_ungueltige_werte_ab() {
        let mut cfg = DaemonConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validieren().is_err());

        let mut cfg = DaemonConfig::default();
        cfg.logging.format = "xml".into();
        assert!(cfg.validieren().is_err());

        let mut cfg = DaemonConfig::default();
        cfg.ofono.dienst = "  ".into();
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn bus_wahl_wird_abgebildet() {
        assert_eq!(BusTyp::from(BusWahl::System), BusTyp::System);
        assert_eq!(BusTyp::from(BusWahl::Session), BusTyp::Session);
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let cfg = DaemonConfig::laden("/nicht/vorhanden/callwatch.toml").unwrap();
        assert_eq!(cfg.ofono.dienst, "org.ofono");
    }
}
