//! Modem-Verwaltung – ein Eintrag pro bekanntem Modem
//!
//! Ein Modem bekommt genau dann eine Anrufverwaltung (VoiceCallManager),
//! wenn seine `Interfaces`-Liste `org.ofono.VoiceCallManager` enthaelt.
//! Modem- und Anrufverwaltungs-Proxies werden direkt in der Schleife
//! verbunden; waehrenddessen ruht die Ereignisverarbeitung.
//!
//! Verliert ein Modem die Faehigkeit, wird nur das Abonnement der
//! Anrufverwaltung freigegeben. Bereits verfolgte Anrufe bleiben bestehen,
//! bis sie selbst oder ihr Modem entfernt werden.

use std::collections::HashMap;

use callwatch_core::ofono::{EIGENSCHAFT_INTERFACES, SCHNITTSTELLE_VOICECALL_MANAGER};
use callwatch_core::{Abonnement, Eigenschaften, EreignisSender, ObjektPfad, OfonoBus, Wert};

/// Zustand eines verfolgten Modems
#[derive(Debug)]
pub struct Modemeintrag {
    /// Proxy und `PropertyChanged`-Weiterleitung des Modems
    abo: Abonnement,
    /// Vorhanden solange das Modem Sprachanrufe unterstuetzt
    anrufverwaltung: Option<Abonnement>,
}

impl Modemeintrag {
    pub fn hat_anrufverwaltung(&self) -> bool {
        self.anrufverwaltung.is_some()
    }
}

/// Alle verfolgten Modems, indiziert nach Objektpfad
#[derive(Debug, Default)]
pub struct ModemListe {
    eintraege: HashMap<ObjektPfad, Modemeintrag>,
}

impl ModemListe {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Nimmt ein Modem auf (aus `GetModems` oder `ModemAdded`)
    ///
    /// Bereits bekannte Modems werden ignoriert, damit sich Aufzaehlung und
    /// `ModemAdded` nicht in die Quere kommen.
    pub async fn hinzufuegen<B: OfonoBus + ?Sized>(
        &mut self,
        bus: &B,
        sink: &EreignisSender,
        pfad: ObjektPfad,
        eigenschaften: &Eigenschaften,
    ) -> bool {
        if self.eintraege.contains_key(&pfad) {
            return false;
        }

        tracing::info!(pfad = %pfad, "Modem wird hinzugefuegt");

        let abo = match bus.modem_verbinden(&pfad, sink.clone()).await {
            Ok(abo) => abo,
            Err(e) => {
                tracing::warn!(pfad = %pfad, fehler = %e, "Modem-Proxy konnte nicht erstellt werden");
                return false;
            }
        };

        self.eintraege.insert(
            pfad.clone(),
            Modemeintrag {
                abo,
                anrufverwaltung: None,
            },
        );

        if let Some(schnittstellen) = eigenschaften.get(EIGENSCHAFT_INTERFACES) {
            self.schnittstellen_auswerten(bus, sink, &pfad, schnittstellen)
                .await;
        }
        true
    }

    /// Entfernt ein Modem samt Anrufverwaltung
    ///
    /// Die zugehoerigen Anrufe muss der Aufrufer vorher aus der
    /// [`crate::anrufe::Anrufliste`] entfernen.
    pub fn entfernen(&mut self, pfad: &ObjektPfad) -> bool {
        match self.eintraege.remove(pfad) {
            Some(eintrag) => {
                tracing::info!(
                    pfad = %pfad,
                    anrufverwaltung = eintrag.hat_anrufverwaltung(),
                    "Modem entfernt"
                );
                drop(eintrag.abo);
                true
            }
            None => false,
        }
    }

    /// `Modem.PropertyChanged`; nur `Interfaces` ist von Interesse
    pub async fn eigenschaft_geaendert<B: OfonoBus + ?Sized>(
        &mut self,
        bus: &B,
        sink: &EreignisSender,
        pfad: &ObjektPfad,
        name: &str,
        wert: &Wert,
    ) {
        if name == EIGENSCHAFT_INTERFACES {
            self.schnittstellen_auswerten(bus, sink, pfad, wert).await;
        }
    }

    /// Prueft die Schnittstellenliste auf Sprachanruf-Faehigkeit
    async fn schnittstellen_auswerten<B: OfonoBus + ?Sized>(
        &mut self,
        bus: &B,
        sink: &EreignisSender,
        pfad: &ObjektPfad,
        wert: &Wert,
    ) {
        let Some(eintrag) = self.eintraege.get_mut(pfad) else {
            tracing::debug!(pfad = %pfad, "Schnittstellen fuer unbekanntes Modem ignoriert");
            return;
        };
        let Some(schnittstellen) = wert.als_text_liste() else {
            tracing::warn!(pfad = %pfad, wert = ?wert, "Interfaces ist keine Textliste");
            return;
        };

        let sprachfaehig = schnittstellen
            .iter()
            .any(|s| s == SCHNITTSTELLE_VOICECALL_MANAGER);

        if !sprachfaehig {
            if eintrag.anrufverwaltung.take().is_some() {
                tracing::info!(pfad = %pfad, "Modem unterstuetzt keine Sprachanrufe mehr");
            }
            return;
        }

        if eintrag.anrufverwaltung.is_some() {
            return;
        }

        match bus.anrufverwaltung_verbinden(pfad, sink.clone()).await {
            Ok(abo) => {
                tracing::info!(pfad = %pfad, "Anrufverwaltung verbunden");
                eintrag.anrufverwaltung = Some(abo);
            }
            Err(e) => {
                tracing::warn!(
                    pfad = %pfad,
                    fehler = %e,
                    "Anrufverwaltungs-Proxy konnte nicht erstellt werden"
                );
            }
        }
    }

    /// Gibt alle Modems frei (Monitor wird beendet)
    pub fn alle_entfernen(&mut self) {
        self.eintraege.clear();
    }

    /// Liegt `anruf` unter einem der verfolgten Modems?
    pub fn besitzt_anruf(&self, anruf: &ObjektPfad) -> bool {
        self.eintraege.keys().any(|modem| anruf.liegt_unter(modem))
    }

    pub fn hat_anrufverwaltung(&self, pfad: &ObjektPfad) -> bool {
        self.eintraege
            .get(pfad)
            .is_some_and(Modemeintrag::hat_anrufverwaltung)
    }

    pub fn enthaelt(&self, pfad: &ObjektPfad) -> bool {
        self.eintraege.contains_key(pfad)
    }

    pub fn len(&self) -> usize {
        self.eintraege.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eintraege.is_empty()
    }
}
