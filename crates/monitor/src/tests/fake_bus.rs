//! In-Memory-Bus fuer Tests
//!
//! Jede Verbindung wird unter einem Schluessel gezaehlt (`manager`,
//! `modem:/m1`, `vcm:/m1`, `anruf:/m1/c1`). Dieselben Schluessel dienen zum
//! Erzeugen von Fehlern und zum Zurueckhalten einzelner Antworten.
//! Abfragen verwenden `modems` und `eigenschaften:/m1/c1`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use callwatch_core::ofono::{EIGENSCHAFT_INTERFACES, EIGENSCHAFT_STATE};
use callwatch_core::{
    Abonnement, CallwatchError, Eigenschaften, EreignisSender, ObjektPfad, OfonoBus, Result, Wert,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

#[derive(Default)]
struct Zustand {
    modems: Vec<(ObjektPfad, Eigenschaften)>,
    anrufe: HashMap<ObjektPfad, Eigenschaften>,
    defekt: HashSet<String>,
    sperren: HashMap<String, VecDeque<oneshot::Receiver<()>>>,
    verbindungen: HashMap<String, usize>,
    lebend: HashMap<String, usize>,
    manager_sink: Option<EreignisSender>,
}

/// Zaehlt beim Drop das lebende Abonnement herunter
struct AboWaechter {
    schluessel: String,
    zustand: Arc<Mutex<Zustand>>,
}

impl Drop for AboWaechter {
    fn drop(&mut self) {
        let mut z = self.zustand.lock();
        if let Some(n) = z.lebend.get_mut(&self.schluessel) {
            *n = n.saturating_sub(1);
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeBus {
    zustand: Arc<Mutex<Zustand>>,
}

pub(crate) fn eigenschaften_mit_schnittstellen(schnittstellen: &[&str]) -> Eigenschaften {
    let liste: Vec<String> = schnittstellen.iter().map(|s| s.to_string()).collect();
    let mut e = Eigenschaften::new();
    e.insert(EIGENSCHAFT_INTERFACES.to_string(), Wert::from(liste));
    e
}

pub(crate) fn eigenschaften_mit_zustand(zustand: &str) -> Eigenschaften {
    let mut e = Eigenschaften::new();
    e.insert(EIGENSCHAFT_STATE.to_string(), Wert::from(zustand));
    e
}

impl FakeBus {
    pub(crate) fn neu() -> Self {
        Self::default()
    }

    /// Modem, das `GetModems` liefert
    pub(crate) fn mit_modem(self, pfad: &str, schnittstellen: &[&str]) -> Self {
        self.zustand.lock().modems.push((
            ObjektPfad::from(pfad),
            eigenschaften_mit_schnittstellen(schnittstellen),
        ));
        self
    }

    /// Antwort von `GetProperties` fuer einen Anruf
    pub(crate) fn anruf_setzen(&self, pfad: &str, zustand: &str) {
        self.zustand
            .lock()
            .anrufe
            .insert(ObjektPfad::from(pfad), eigenschaften_mit_zustand(zustand));
    }

    /// `GetProperties` ohne `State`
    pub(crate) fn anruf_ohne_zustand(&self, pfad: &str) {
        self.zustand
            .lock()
            .anrufe
            .insert(ObjektPfad::from(pfad), Eigenschaften::new());
    }

    pub(crate) fn defekt(&self, schluessel: &str) {
        self.zustand.lock().defekt.insert(schluessel.to_string());
    }

    /// Haelt die naechste Antwort unter `schluessel` zurueck, bis der
    /// zurueckgegebene Sender ausloest oder verworfen wird
    pub(crate) fn sperren(&self, schluessel: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.zustand
            .lock()
            .sperren
            .entry(schluessel.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    pub(crate) fn verbindungen(&self, schluessel: &str) -> usize {
        self.zustand
            .lock()
            .verbindungen
            .get(schluessel)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn lebend(&self, schluessel: &str) -> usize {
        self.zustand
            .lock()
            .lebend
            .get(schluessel)
            .copied()
            .unwrap_or(0)
    }

    /// Summe aller noch gehaltenen Abonnements
    pub(crate) fn lebend_gesamt(&self) -> usize {
        self.zustand.lock().lebend.values().sum()
    }

    pub(crate) fn manager_sink(&self) -> Option<EreignisSender> {
        self.zustand.lock().manager_sink.clone()
    }

    async fn warten(&self, schluessel: &str) {
        let sperre = self
            .zustand
            .lock()
            .sperren
            .get_mut(schluessel)
            .and_then(VecDeque::pop_front);
        if let Some(rx) = sperre {
            let _ = rx.await;
        }
    }

    fn pruefen(&self, schluessel: &str) -> Result<()> {
        if self.zustand.lock().defekt.contains(schluessel) {
            return Err(CallwatchError::bus(format!("{schluessel} defekt")));
        }
        Ok(())
    }

    fn abonnement(&self, schluessel: String, pfad: &ObjektPfad) -> Result<Abonnement> {
        self.pruefen(&schluessel)?;
        {
            let mut z = self.zustand.lock();
            *z.verbindungen.entry(schluessel.clone()).or_default() += 1;
            *z.lebend.entry(schluessel.clone()).or_default() += 1;
        }
        Ok(Abonnement::neu(pfad.clone()).mit_halter(AboWaechter {
            schluessel,
            zustand: self.zustand.clone(),
        }))
    }
}

#[async_trait]
impl OfonoBus for FakeBus {
    async fn manager_verbinden(&self, sink: EreignisSender) -> Result<Abonnement> {
        self.warten("manager").await;
        let abo = self.abonnement("manager".to_string(), &ObjektPfad::from("/"))?;
        self.zustand.lock().manager_sink = Some(sink);
        Ok(abo)
    }

    async fn modems_abfragen(&self) -> Result<Vec<(ObjektPfad, Eigenschaften)>> {
        self.warten("modems").await;
        self.pruefen("modems")?;
        Ok(self.zustand.lock().modems.clone())
    }

    async fn modem_verbinden(
        &self,
        pfad: &ObjektPfad,
        _sink: EreignisSender,
    ) -> Result<Abonnement> {
        let schluessel = format!("modem:{pfad}");
        self.warten(&schluessel).await;
        self.abonnement(schluessel, pfad)
    }

    async fn anrufverwaltung_verbinden(
        &self,
        pfad: &ObjektPfad,
        _sink: EreignisSender,
    ) -> Result<Abonnement> {
        let schluessel = format!("vcm:{pfad}");
        self.warten(&schluessel).await;
        self.abonnement(schluessel, pfad)
    }

    async fn anruf_verbinden(
        &self,
        pfad: &ObjektPfad,
        _sink: EreignisSender,
    ) -> Result<Abonnement> {
        let schluessel = format!("anruf:{pfad}");
        self.warten(&schluessel).await;
        self.abonnement(schluessel, pfad)
    }

    async fn anruf_eigenschaften(&self, pfad: &ObjektPfad) -> Result<Eigenschaften> {
        let schluessel = format!("eigenschaften:{pfad}");
        self.warten(&schluessel).await;
        self.pruefen(&schluessel)?;
        self.zustand
            .lock()
            .anrufe
            .get(pfad)
            .cloned()
            .ok_or_else(|| CallwatchError::ObjektNichtGefunden(pfad.to_string()))
    }
}
