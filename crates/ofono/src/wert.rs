//! Uebersetzung von D-Bus-Varianten in typisierte Werte

use std::collections::HashMap;

use callwatch_core::{Eigenschaften, Wert};
use zbus::zvariant::{OwnedValue, Value};

/// Wandelt eine D-Bus-Variante in einen [`Wert`] um
///
/// Verschachtelte Varianten (`v` in `v`) werden ausgepackt. Arrays werden
/// nur als Textliste uebernommen, wenn alle Elemente Strings sind.
pub fn wert_umwandeln(wert: &Value<'_>) -> Wert {
    match wert {
        Value::Str(s) => Wert::Text(s.to_string()),
        Value::Bool(b) => Wert::Bool(*b),
        Value::Value(innen) => wert_umwandeln(innen),
        Value::Array(feld) => {
            let mut liste = Vec::with_capacity(feld.len());
            for element in feld.iter() {
                match element {
                    Value::Str(s) => liste.push(s.to_string()),
                    _ => return Wert::Sonstiges(wert.value_signature().to_string()),
                }
            }
            Wert::TextListe(liste)
        }
        anderer => Wert::Sonstiges(anderer.value_signature().to_string()),
    }
}

/// Wandelt ein `a{sv}`-Dictionary in [`Eigenschaften`] um
pub fn eigenschaften_umwandeln(roh: &HashMap<String, OwnedValue>) -> Eigenschaften {
    roh.iter()
        .map(|(name, wert)| (name.clone(), wert_umwandeln(wert)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_wird_uebernommen() {
        let v = Value::from("active");
        assert_eq!(wert_umwandeln(&v), Wert::Text("active".into()));
    }

    #[test]
    fn verschachtelte_variante_wird_ausgepackt() {
        let v = Value::Value(Box::new(Value::from("held")));
        assert_eq!(wert_umwandeln(&v), Wert::Text("held".into()));
    }

    #[test]
    fn stringliste_wird_textliste() {
        let v = Value::from(vec!["org.ofono.VoiceCallManager", "org.ofono.SimManager"]);
        assert_eq!(
            wert_umwandeln(&v),
            Wert::TextListe(vec![
                "org.ofono.VoiceCallManager".into(),
                "org.ofono.SimManager".into()
            ])
        );
    }

    #[test]
    fn bool_und_zahl() {
        assert_eq!(wert_umwandeln(&Value::from(true)), Wert::Bool(true));
        assert!(matches!(wert_umwandeln(&Value::from(7u32)), Wert::Sonstiges(_)));
    }

    #[test]
    fn zahlenliste_ist_sonstiges() {
        let v = Value::from(vec![1u32, 2, 3]);
        assert!(matches!(wert_umwandeln(&v), Wert::Sonstiges(_)));
    }
}
