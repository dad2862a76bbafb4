//! Anrufzustaende und ihre Einteilung in aktiv/inaktiv
//!
//! oFono meldet den Zustand eines Anrufs als Text. Fuer den Monitor zaehlt
//! nur, ob ein Anruf die Leitung belegt (`active`, `held`) oder nicht. Bis
//! zur ersten Beobachtung ist ein Anruf [`Klassifikation::Unbekannt`].

/// Zustand eines Anrufs laut oFono (`VoiceCall.State`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnrufZustand {
    Aktiv,
    Gehalten,
    Waehlend,
    /// Gegenseite klingelt (`alerting`)
    Klingelnd,
    Eingehend,
    /// Zweiter eingehender Anruf waehrend eines laufenden (`waiting`)
    Wartend,
    Getrennt,
    /// Von oFono gemeldeter, hier nicht bekannter Zustand
    Unbekannt(String),
}

impl AnrufZustand {
    /// Parst den Zustandstext von oFono
    pub fn aus_text(text: &str) -> Self {
        match text {
            "active" => Self::Aktiv,
            "held" => Self::Gehalten,
            "dialing" => Self::Waehlend,
            "alerting" => Self::Klingelnd,
            "incoming" => Self::Eingehend,
            "waiting" => Self::Wartend,
            "disconnected" => Self::Getrennt,
            anderer => Self::Unbekannt(anderer.to_string()),
        }
    }

    /// Aktive und gehaltene Anrufe zaehlen als aktiv
    pub fn ist_aktiv(&self) -> bool {
        matches!(self, Self::Aktiv | Self::Gehalten)
    }
}

/// Auswirkung einer Beobachtung auf den Aktiv-Zaehler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zaehleraenderung {
    Erhoehen,
    Verringern,
}

/// Einteilung eines einzelnen Anrufs
///
/// Uebergaenge: `Unbekannt -> {Aktiv, Inaktiv}` bei der ersten Beobachtung,
/// danach `Aktiv <-> Inaktiv`. Zurueck nach `Unbekannt` geht es nie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Klassifikation {
    #[default]
    Unbekannt,
    Aktiv,
    Inaktiv,
}

impl Klassifikation {
    /// Verarbeitet eine Beobachtung und gibt die noetige Zaehleraenderung zurueck
    pub fn beobachten(&mut self, zustand: &AnrufZustand) -> Option<Zaehleraenderung> {
        let neu = if zustand.ist_aktiv() {
            Self::Aktiv
        } else {
            Self::Inaktiv
        };
        let alt = std::mem::replace(self, neu);

        match (alt, neu) {
            (Self::Unbekannt | Self::Inaktiv, Self::Aktiv) => Some(Zaehleraenderung::Erhoehen),
            (Self::Aktiv, Self::Inaktiv) => Some(Zaehleraenderung::Verringern),
            _ => None,
        }
    }

    /// Wurde der Anruf schon mindestens einmal beobachtet?
    pub fn ist_aufgeloest(&self) -> bool {
        !matches!(self, Self::Unbekannt)
    }

    /// Traegt dieser Anruf gerade zum Aktiv-Zaehler bei?
    pub fn zaehlt(&self) -> bool {
        matches!(self, Self::Aktiv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aktiv_und_gehalten_sind_aktiv() {
        assert!(AnrufZustand::aus_text("active").ist_aktiv());
        assert!(AnrufZustand::aus_text("held").ist_aktiv());
    }

    #[test]
    fn alle_anderen_zustaende_sind_inaktiv() {
        for text in [
            "incoming",
            "dialing",
            "alerting",
            "waiting",
            "disconnected",
            "",
            "ACTIVE",
        ] {
            assert!(!AnrufZustand::aus_text(text).ist_aktiv(), "{text}");
        }
    }

    #[test]
    fn unbekannter_text_bleibt_erhalten() {
        assert_eq!(
            AnrufZustand::aus_text("ringing"),
            AnrufZustand::Unbekannt("ringing".into())
        );
        assert_eq!(AnrufZustand::aus_text("alerting"), AnrufZustand::Klingelnd);
    }

    #[test]
    fn erste_beobachtung_aktiv_erhoeht() {
        let mut k = Klassifikation::default();
        assert_eq!(
            k.beobachten(&AnrufZustand::Aktiv),
            Some(Zaehleraenderung::Erhoehen)
        );
        assert_eq!(k, Klassifikation::Aktiv);
        assert!(k.zaehlt());
    }

    #[test]
    fn erste_beobachtung_inaktiv_aendert_nichts() {
        let mut k = Klassifikation::default();
        assert!(!k.ist_aufgeloest());
        assert_eq!(k.beobachten(&AnrufZustand::Eingehend), None);
        assert_eq!(k, Klassifikation::Inaktiv);
        assert!(k.ist_aufgeloest());
    }

    #[test]
    fn gleiche_klasse_zweimal_ist_kein_wechsel() {
        let mut k = Klassifikation::default();
        k.beobachten(&AnrufZustand::Aktiv);
        assert_eq!(k.beobachten(&AnrufZustand::Gehalten), None);
        assert_eq!(k.beobachten(&AnrufZustand::Aktiv), None);

        k.beobachten(&AnrufZustand::Getrennt);
        assert_eq!(k.beobachten(&AnrufZustand::Waehlend), None);
    }

    #[test]
    fn wechsel_in_beide_richtungen() {
        let mut k = Klassifikation::default();
        k.beobachten(&AnrufZustand::Waehlend);
        assert_eq!(
            k.beobachten(&AnrufZustand::Aktiv),
            Some(Zaehleraenderung::Erhoehen)
        );
        assert_eq!(
            k.beobachten(&AnrufZustand::Getrennt),
            Some(Zaehleraenderung::Verringern)
        );
        assert_eq!(
            k.beobachten(&AnrufZustand::Gehalten),
            Some(Zaehleraenderung::Erhoehen)
        );
    }
}
