//! Gemeinsame Datentypen fuer Callwatch
//!
//! Objektpfade verwenden das Newtype-Pattern, damit Modem- und Anrufpfade
//! nicht mit beliebigen Strings verwechselt werden. Eigenschaften von
//! Bus-Objekten werden in einen kleinen typisierten Wert-Enum uebersetzt,
//! sodass der Monitor keine Bus-Bibliothek kennen muss.

use std::collections::HashMap;

/// Objektpfad eines Bus-Objekts (Modem oder Anruf)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjektPfad(String);

impl ObjektPfad {
    /// Erstellt einen neuen Pfad
    pub fn neu(pfad: impl Into<String>) -> Self {
        Self(pfad.into())
    }

    /// Gibt den Pfad als `&str` zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prueft ob dieser Pfad mit `oberpfad` beginnt
    ///
    /// Anrufe liegen unterhalb ihres Modems (`/ril_0/voicecall01` unter
    /// `/ril_0`). Verglichen wird als reines Zeichenketten-Praefix, so wie
    /// oFono seine Pfade vergibt: `/m10/c1` beginnt auch mit `/m1`.
    pub fn liegt_unter(&self, oberpfad: &ObjektPfad) -> bool {
        self.0.starts_with(oberpfad.as_str())
    }
}

impl std::fmt::Display for ObjektPfad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjektPfad {
    fn from(pfad: &str) -> Self {
        Self::neu(pfad)
    }
}

impl From<String> for ObjektPfad {
    fn from(pfad: String) -> Self {
        Self(pfad)
    }
}

/// Wert einer Bus-Eigenschaft
///
/// Nur die Formen, die fuer die Anrufueberwachung relevant sind, werden
/// unterschieden; alles andere landet in [`Wert::Sonstiges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wert {
    Text(String),
    TextListe(Vec<String>),
    Bool(bool),
    /// Nicht naeher interpretierter Wert (Signatur zur Diagnose)
    Sonstiges(String),
}

impl Wert {
    /// Gibt den Text zurueck, falls der Wert ein Text ist
    pub fn als_text(&self) -> Option<&str> {
        match self {
            Wert::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Gibt die Textliste zurueck, falls der Wert eine ist
    pub fn als_text_liste(&self) -> Option<&[String]> {
        match self {
            Wert::TextListe(l) => Some(l),
            _ => None,
        }
    }
}

impl From<&str> for Wert {
    fn from(t: &str) -> Self {
        Wert::Text(t.to_string())
    }
}

impl From<Vec<String>> for Wert {
    fn from(l: Vec<String>) -> Self {
        Wert::TextListe(l)
    }
}

/// Eigenschaftssammlung eines Bus-Objekts (`a{sv}`)
pub type Eigenschaften = HashMap<String, Wert>;
