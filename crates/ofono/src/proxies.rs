//! zbus-Proxies fuer die oFono-Schnittstellen
//!
//! oFono verwendet keine Standard-Properties, sondern eigene
//! `GetProperties`-Methoden und `PropertyChanged`-Signale. Deshalb werden hier
//! keine `#[zbus(property)]`-Eintraege deklariert.
//!
//! Jeder Proxy liegt in einem eigenen Modul, weil zbus fuer gleichnamige
//! Signale (`PropertyChanged`) gleichnamige Typen erzeugt.

pub mod manager {
    use std::collections::HashMap;

    use zbus::proxy;
    use zbus::zvariant::{OwnedObjectPath, OwnedValue};

    /// Eintrag aus `Manager.GetModems()`: Pfad plus Eigenschaften
    pub type ModemEintrag = (OwnedObjectPath, HashMap<String, OwnedValue>);

    /// `org.ofono.Manager` unter `/`
    #[proxy(
        interface = "org.ofono.Manager",
        default_service = "org.ofono",
        default_path = "/"
    )]
    pub trait Manager {
        /// Liefert alle bekannten Modems
        fn get_modems(&self) -> zbus::Result<Vec<ModemEintrag>>;

        #[zbus(signal)]
        fn modem_added(
            &self,
            path: OwnedObjectPath,
            properties: HashMap<String, OwnedValue>,
        ) -> zbus::Result<()>;

        #[zbus(signal)]
        fn modem_removed(&self, path: OwnedObjectPath) -> zbus::Result<()>;
    }
}

pub mod modem {
    use zbus::proxy;
    use zbus::zvariant::OwnedValue;

    /// `org.ofono.Modem`
    #[proxy(interface = "org.ofono.Modem", default_service = "org.ofono")]
    pub trait Modem {
        /// `Interfaces`, `Powered`, `Online`, ... haben sich geaendert
        #[zbus(signal)]
        fn property_changed(&self, name: String, value: OwnedValue) -> zbus::Result<()>;
    }
}

pub mod voice_call_manager {
    use std::collections::HashMap;

    use zbus::proxy;
    use zbus::zvariant::{OwnedObjectPath, OwnedValue};

    /// `org.ofono.VoiceCallManager` (gleicher Pfad wie das Modem)
    #[proxy(interface = "org.ofono.VoiceCallManager", default_service = "org.ofono")]
    pub trait VoiceCallManager {
        #[zbus(signal)]
        fn call_added(
            &self,
            path: OwnedObjectPath,
            properties: HashMap<String, OwnedValue>,
        ) -> zbus::Result<()>;

        #[zbus(signal)]
        fn call_removed(&self, path: OwnedObjectPath) -> zbus::Result<()>;
    }
}

pub mod voice_call {
    use std::collections::HashMap;

    use zbus::proxy;
    use zbus::zvariant::OwnedValue;

    /// `org.ofono.VoiceCall` (Pfad unterhalb des Modems)
    #[proxy(interface = "org.ofono.VoiceCall", default_service = "org.ofono")]
    pub trait VoiceCall {
        fn get_properties(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

        /// Vor allem `State` ist fuer den Monitor relevant
        #[zbus(signal)]
        fn property_changed(&self, name: String, value: OwnedValue) -> zbus::Result<()>;
    }
}
