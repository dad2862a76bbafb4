//! Aktiv-Zaehler und Versand des Status-Ereignisses
//!
//! Der Zaehler gehoert exklusiv der Monitor-Schleife. Jede Aenderung wird
//! sofort in einem `watch`-Kanal gespiegelt; Wechsel zwischen null und
//! nicht-null gehen zusaetzlich als [`StatusGeaendert`] ueber einen
//! `broadcast`-Kanal an alle Abonnenten.

use callwatch_core::StatusGeaendert;
use tokio::sync::{broadcast, watch};

use crate::klassifikation::Zaehleraenderung;

/// Groesse des Broadcast-Kanals fuer Status-Ereignisse
const STATUS_KANAL_GROESSE: usize = 64;

/// Sendet Status-Ereignisse und den aktuellen Zaehlerstand
#[derive(Debug)]
pub struct StatusMelder {
    status_tx: broadcast::Sender<StatusGeaendert>,
    anzahl_tx: watch::Sender<u32>,
}

impl StatusMelder {
    /// Erstellt einen neuen Melder ohne Abonnenten
    pub fn neu() -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_KANAL_GROESSE);
        let (anzahl_tx, _) = watch::channel(0);
        Self {
            status_tx,
            anzahl_tx,
        }
    }

    /// Abonniert kuenftige Status-Ereignisse
    pub fn abonnieren(&self) -> broadcast::Receiver<StatusGeaendert> {
        self.status_tx.subscribe()
    }

    /// Beobachtet den aktuellen Zaehlerstand
    pub fn anzahl_beobachten(&self) -> watch::Receiver<u32> {
        self.anzahl_tx.subscribe()
    }

    /// Sender-Klon, damit das Handle auch nach dem Start abonnieren kann
    pub(crate) fn status_sender(&self) -> broadcast::Sender<StatusGeaendert> {
        self.status_tx.clone()
    }

    fn anzahl_setzen(&self, anzahl: u32) {
        self.anzahl_tx.send_replace(anzahl);
    }

    fn status_senden(&self, anruf_aktiv: bool) {
        tracing::info!(anruf_aktiv, "Anrufstatus geaendert");
        // Ohne Abonnenten schlaegt send fehl – das ist kein Fehler
        let _ = self.status_tx.send(StatusGeaendert { anruf_aktiv });
    }
}

impl Default for StatusMelder {
    fn default() -> Self {
        Self::neu()
    }
}

/// Anzahl der Anrufe, die gerade als aktiv eingeteilt sind
#[derive(Debug)]
pub struct AktivZaehler {
    anzahl: u32,
    melder: StatusMelder,
}

impl AktivZaehler {
    pub fn neu(melder: StatusMelder) -> Self {
        Self { anzahl: 0, melder }
    }

    pub fn anzahl(&self) -> u32 {
        self.anzahl
    }

    pub fn melder(&self) -> &StatusMelder {
        &self.melder
    }

    /// Wendet eine Zaehleraenderung aus [`crate::Klassifikation::beobachten`] an
    pub fn anwenden(&mut self, aenderung: Zaehleraenderung) {
        match aenderung {
            Zaehleraenderung::Erhoehen => self.erhoehen(),
            Zaehleraenderung::Verringern => self.verringern(),
        }
    }

    /// Ein Anruf ist aktiv geworden; bei 0 -> 1 wird `true` gemeldet
    pub fn erhoehen(&mut self) {
        self.anzahl += 1;
        self.melder.anzahl_setzen(self.anzahl);
        tracing::debug!(anzahl = self.anzahl, "Aktive Anrufe erhoeht");

        if self.anzahl == 1 {
            self.melder.status_senden(true);
        }
    }

    /// Ein aktiver Anruf ist inaktiv geworden oder verschwunden
    ///
    /// Bei 1 -> 0 wird `false` gemeldet. Unter null wird nie gezaehlt: ein
    /// solcher Versuch deutet auf doppeltes Entfernen hin und wird nur
    /// geloggt.
    pub fn verringern(&mut self) {
        if self.anzahl == 0 {
            tracing::warn!("Inkonsistenter Aktiv-Zaehler: Verringern bei 0 ignoriert");
            return;
        }

        self.anzahl -= 1;
        self.melder.anzahl_setzen(self.anzahl);
        tracing::debug!(anzahl = self.anzahl, "Aktive Anrufe verringert");

        if self.anzahl == 0 {
            self.melder.status_senden(false);
        }
    }
}
