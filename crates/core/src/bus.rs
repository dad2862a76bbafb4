//! Vertrag zur Bus-Schicht
//!
//! Der Monitor spricht nie direkt mit D-Bus, sondern nur ueber das
//! [`OfonoBus`]-Trait. Die Produktiv-Implementierung liegt in
//! `callwatch-ofono` (zbus), die Tests verwenden einen In-Memory-Bus.
//!
//! Jede Verbindung zu einem entfernten Objekt liefert ein [`Abonnement`]:
//! es haelt den Proxy am Leben und besitzt die Tasks, die Signale als
//! [`BusEreignis`] in den Monitor weiterleiten. Drop des Abonnements beendet
//! die Weiterleitung.

use std::any::Any;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::error::Result;
use crate::event::BusEreignis;
use crate::types::{Eigenschaften, ObjektPfad};

/// Sender, ueber den die Bus-Schicht Ereignisse an den Monitor liefert
pub type EreignisSender = mpsc::UnboundedSender<BusEreignis>;

/// Abstrakte Bus-Schicht fuer den oFono-Dienst
#[async_trait]
pub trait OfonoBus: Send + Sync + 'static {
    /// Verbindet den Manager und leitet `ModemAdded`/`ModemRemoved` weiter
    async fn manager_verbinden(&self, sink: EreignisSender) -> Result<Abonnement>;

    /// `Manager.GetModems()`
    async fn modems_abfragen(&self) -> Result<Vec<(ObjektPfad, Eigenschaften)>>;

    /// Verbindet ein Modem und leitet dessen `PropertyChanged` weiter
    async fn modem_verbinden(&self, pfad: &ObjektPfad, sink: EreignisSender)
        -> Result<Abonnement>;

    /// Verbindet die Anrufverwaltung eines Modems (`CallAdded`/`CallRemoved`)
    async fn anrufverwaltung_verbinden(
        &self,
        pfad: &ObjektPfad,
        sink: EreignisSender,
    ) -> Result<Abonnement>;

    /// Verbindet einen Anruf und leitet dessen `PropertyChanged` weiter
    async fn anruf_verbinden(&self, pfad: &ObjektPfad, sink: EreignisSender)
        -> Result<Abonnement>;

    /// `VoiceCall.GetProperties()`
    async fn anruf_eigenschaften(&self, pfad: &ObjektPfad) -> Result<Eigenschaften>;
}

/// Beobachter-Handle fuer ein entferntes Objekt
///
/// Haelt den Proxy (`halter`) und bricht beim Drop alle
/// Weiterleitungs-Tasks ab.
pub struct Abonnement {
    pfad: ObjektPfad,
    aufgaben: Vec<AbortHandle>,
    halter: Option<Box<dyn Any + Send>>,
}

impl Abonnement {
    /// Erstellt ein leeres Abonnement fuer `pfad`
    pub fn neu(pfad: ObjektPfad) -> Self {
        Self {
            pfad,
            aufgaben: Vec::new(),
            halter: None,
        }
    }

    /// Registriert einen Weiterleitungs-Task
    pub fn mit_aufgabe(mut self, aufgabe: AbortHandle) -> Self {
        self.aufgaben.push(aufgabe);
        self
    }

    /// Haelt ein beliebiges Objekt (typischerweise den Proxy) bis zum Drop
    pub fn mit_halter<T: Any + Send>(mut self, halter: T) -> Self {
        self.halter = Some(Box::new(halter));
        self
    }

    pub fn pfad(&self) -> &ObjektPfad {
        &self.pfad
    }
}

impl Drop for Abonnement {
    fn drop(&mut self) {
        for aufgabe in &self.aufgaben {
            aufgabe.abort();
        }
        tracing::trace!(pfad = %self.pfad, "Abonnement beendet");
    }
}

impl std::fmt::Debug for Abonnement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Abonnement")
            .field("pfad", &self.pfad)
            .field("aufgaben", &self.aufgaben.len())
            .field("halter", &self.halter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct Waechter(Arc<AtomicBool>);

    impl Drop for Waechter {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn drop_gibt_halter_frei() {
        let freigegeben = Arc::new(AtomicBool::new(false));
        let abo = Abonnement::neu(ObjektPfad::neu("/m1"))
            .mit_halter(Waechter(freigegeben.clone()));
        assert_eq!(abo.pfad().as_str(), "/m1");
        assert!(!freigegeben.load(Ordering::SeqCst));

        drop(abo);
        assert!(freigegeben.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn drop_bricht_aufgaben_ab() {
        let aufgabe = tokio::spawn(std::future::pending::<()>());
        let abo = Abonnement::neu(ObjektPfad::neu("/m1/c1")).mit_aufgabe(aufgabe.abort_handle());

        drop(abo);
        let ergebnis = aufgabe.await;
        assert!(ergebnis.is_err_and(|e| e.is_cancelled()));
    }
}
