//! Anruf-Verwaltung – ein Eintrag pro bekanntem Anruf
//!
//! Ein Eintrag entsteht erst, wenn die Verbindung zum Anruf-Objekt steht.
//! Er startet als [`Klassifikation::Unbekannt`]; die erste Beobachtung
//! (Abfrage der Eigenschaften oder `PropertyChanged`, was zuerst kommt)
//! loest das auf.
//!
//! Der Beitrag zum Aktiv-Zaehler wird nur hier veraendert: beim Wechsel der
//! Klassifikation und beim Abbau eines Eintrags. Alle Abbau-Wege
//! (Entfernen, Modem weg, Monitor beendet, Ersetzen) laufen durch
//! [`Anrufliste::abbauen`].

use std::collections::HashMap;

use callwatch_core::ofono::EIGENSCHAFT_STATE;
use callwatch_core::{Abonnement, Eigenschaften, ObjektPfad, Wert};

use crate::klassifikation::{AnrufZustand, Klassifikation};
use crate::zaehler::AktivZaehler;

/// Zustand eines einzelnen verfolgten Anrufs
#[derive(Debug)]
pub struct Anrufeintrag {
    /// Proxy und `PropertyChanged`-Weiterleitung
    abo: Abonnement,
    klassifikation: Klassifikation,
    /// Unterscheidet Eintraege, die nacheinander unter demselben Pfad liegen
    generation: u64,
}

/// Alle verfolgten Anrufe, indiziert nach Objektpfad
#[derive(Debug, Default)]
pub struct Anrufliste {
    eintraege: HashMap<ObjektPfad, Anrufeintrag>,
    naechste_generation: u64,
}

impl Anrufliste {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Nimmt einen frisch verbundenen Anruf auf und gibt seine Generation zurueck
    ///
    /// Ein bereits vorhandener Eintrag gleichen Pfads wird vorher regulaer
    /// abgebaut.
    pub fn einfuegen(
        &mut self,
        pfad: ObjektPfad,
        abo: Abonnement,
        zaehler: &mut AktivZaehler,
    ) -> u64 {
        if let Some(alt) = self.eintraege.remove(&pfad) {
            tracing::debug!(pfad = %pfad, "Anruf erneut gemeldet, alter Eintrag wird ersetzt");
            Self::abbauen(&pfad, alt, zaehler);
        }

        self.naechste_generation += 1;
        let generation = self.naechste_generation;
        self.eintraege.insert(
            pfad.clone(),
            Anrufeintrag {
                abo,
                klassifikation: Klassifikation::Unbekannt,
                generation,
            },
        );

        tracing::debug!(pfad = %pfad, generation, "Anruf wird verfolgt");
        generation
    }

    /// Entfernt einen Anruf; unbekannte Pfade werden still ignoriert
    pub fn entfernen(&mut self, pfad: &ObjektPfad, zaehler: &mut AktivZaehler) -> bool {
        match self.eintraege.remove(pfad) {
            Some(eintrag) => {
                Self::abbauen(pfad, eintrag, zaehler);
                true
            }
            None => {
                tracing::debug!(pfad = %pfad, "Entfernen fuer unbekannten Anruf ignoriert");
                false
            }
        }
    }

    /// Entfernt alle Anrufe im Namensraum eines Modems
    pub fn entfernen_unter(&mut self, modem: &ObjektPfad, zaehler: &mut AktivZaehler) -> usize {
        let mut betroffen: Vec<ObjektPfad> = self
            .eintraege
            .keys()
            .filter(|pfad| pfad.liegt_unter(modem))
            .cloned()
            .collect();
        betroffen.sort();

        for pfad in &betroffen {
            if let Some(eintrag) = self.eintraege.remove(pfad) {
                Self::abbauen(pfad, eintrag, zaehler);
            }
        }
        betroffen.len()
    }

    /// Baut alle Eintraege ab (Monitor wird beendet)
    pub fn alle_entfernen(&mut self, zaehler: &mut AktivZaehler) {
        let mut alle: Vec<(ObjektPfad, Anrufeintrag)> = self.eintraege.drain().collect();
        alle.sort_by(|a, b| a.0.cmp(&b.0));

        for (pfad, eintrag) in alle {
            Self::abbauen(&pfad, eintrag, zaehler);
        }
    }

    /// `PropertyChanged(State, ...)` eines Anrufs
    pub fn zustand_beobachten(
        &mut self,
        pfad: &ObjektPfad,
        wert: &Wert,
        zaehler: &mut AktivZaehler,
    ) -> bool {
        let Some(eintrag) = self.eintraege.get_mut(pfad) else {
            tracing::debug!(pfad = %pfad, "Zustand fuer unbekannten Anruf ignoriert");
            return false;
        };
        let Some(text) = wert.als_text() else {
            tracing::warn!(pfad = %pfad, wert = ?wert, "Anrufzustand ist kein Text");
            return false;
        };

        tracing::debug!(pfad = %pfad, zustand = text, "Anrufzustand geaendert");
        if let Some(aenderung) = eintrag.klassifikation.beobachten(&AnrufZustand::aus_text(text)) {
            zaehler.anwenden(aenderung);
        }
        true
    }

    /// Ergebnis der Eigenschaftsabfrage nach dem Verbinden
    ///
    /// Wird verworfen, wenn der Eintrag inzwischen weg oder ersetzt ist, oder
    /// wenn ein `PropertyChanged` schneller war.
    pub fn erstbeobachtung(
        &mut self,
        pfad: &ObjektPfad,
        generation: u64,
        eigenschaften: &Eigenschaften,
        zaehler: &mut AktivZaehler,
    ) -> bool {
        match self.eintraege.get(pfad) {
            Some(e) if e.generation == generation && !e.klassifikation.ist_aufgeloest() => {}
            Some(_) => {
                tracing::debug!(pfad = %pfad, "Eigenschaften veraltet, verworfen");
                return false;
            }
            None => {
                tracing::debug!(pfad = %pfad, "Eigenschaften fuer entfernten Anruf verworfen");
                return false;
            }
        }

        match eigenschaften.get(EIGENSCHAFT_STATE) {
            Some(wert) => self.zustand_beobachten(pfad, wert, zaehler),
            None => false,
        }
    }

    pub fn klassifikation(&self, pfad: &ObjektPfad) -> Option<Klassifikation> {
        self.eintraege.get(pfad).map(|e| e.klassifikation)
    }

    pub fn enthaelt(&self, pfad: &ObjektPfad) -> bool {
        self.eintraege.contains_key(pfad)
    }

    /// Anzahl der Eintraege, die gerade als aktiv eingeteilt sind
    pub fn aktive(&self) -> usize {
        self.eintraege
            .values()
            .filter(|e| e.klassifikation.zaehlt())
            .count()
    }

    pub fn len(&self) -> usize {
        self.eintraege.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eintraege.is_empty()
    }

    /// Gibt den Beitrag zum Zaehler zurueck und das Abonnement frei
    fn abbauen(pfad: &ObjektPfad, eintrag: Anrufeintrag, zaehler: &mut AktivZaehler) {
        if eintrag.klassifikation.zaehlt() {
            zaehler.verringern();
        }
        tracing::debug!(
            pfad = %pfad,
            klassifikation = ?eintrag.klassifikation,
            "Anruf nicht mehr verfolgt"
        );
        drop(eintrag.abo);
    }
}
