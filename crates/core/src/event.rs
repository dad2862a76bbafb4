//! Ereignisse zwischen Bus-Schicht, Monitor und Praesentationsschicht

use crate::types::{Eigenschaften, ObjektPfad, Wert};

/// Ereignisse, die die Bus-Schicht aus D-Bus-Signalen erzeugt
///
/// Jedes Ereignis traegt den Pfad des Objekts, von dem es stammt, sodass
/// der Monitor es ohne Rueckfrage dem richtigen Eintrag zuordnen kann.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEreignis {
    // --- Manager ---
    /// `Manager.ModemAdded(path, properties)`
    ModemHinzugefuegt {
        pfad: ObjektPfad,
        eigenschaften: Eigenschaften,
    },
    /// `Manager.ModemRemoved(path)`
    ModemEntfernt { pfad: ObjektPfad },

    // --- Modem ---
    /// `Modem.PropertyChanged(name, value)`
    ModemEigenschaftGeaendert {
        pfad: ObjektPfad,
        name: String,
        wert: Wert,
    },

    // --- VoiceCallManager ---
    /// `VoiceCallManager.CallAdded(path, properties)`
    AnrufHinzugefuegt {
        pfad: ObjektPfad,
        eigenschaften: Eigenschaften,
    },
    /// `VoiceCallManager.CallRemoved(path)`
    AnrufEntfernt { pfad: ObjektPfad },

    // --- VoiceCall ---
    /// `VoiceCall.PropertyChanged(name, value)`
    AnrufEigenschaftGeaendert {
        pfad: ObjektPfad,
        name: String,
        wert: Wert,
    },
}

impl BusEreignis {
    /// Pfad des Objekts, auf das sich das Ereignis bezieht
    pub fn pfad(&self) -> &ObjektPfad {
        match self {
            BusEreignis::ModemHinzugefuegt { pfad, .. }
            | BusEreignis::ModemEntfernt { pfad }
            | BusEreignis::ModemEigenschaftGeaendert { pfad, .. }
            | BusEreignis::AnrufHinzugefuegt { pfad, .. }
            | BusEreignis::AnrufEntfernt { pfad }
            | BusEreignis::AnrufEigenschaftGeaendert { pfad, .. } => pfad,
        }
    }
}

/// Das einzige oeffentliche Ereignis des Monitors (`status-changed`)
///
/// Wird nur bei einem Wechsel der Anzahl aktiver Anrufe zwischen null und
/// nicht-null versendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusGeaendert {
    /// true sobald mindestens ein Anruf aktiv oder gehalten ist
    pub anruf_aktiv: bool,
}
