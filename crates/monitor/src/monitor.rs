//! Anruf-Monitor – Ereignisschleife und oeffentliches Handle
//!
//! Eine einzige Tokio-Task besitzt alle Modem- und Anrufeintraege sowie den
//! Aktiv-Zaehler. Sie verarbeitet zwei Eingaenge:
//!
//! - [`BusEreignis`]se aus den Abonnements der Bus-Schicht
//! - [`Rueckmeldung`]en von Hintergrund-Aufgaben (Manager verbinden,
//!   `GetModems`, Anruf verbinden, `GetProperties`)
//!
//! Jede Zustandsaenderung ist abgeschlossen, bevor die Schleife wieder
//! wartet. Hintergrund-Aufgaben halten nur einen schwachen Sender auf die
//! Schleife; ist der Monitor beendet, verfallen ihre Ergebnisse.
//!
//! Ablauf:
//! 1. Manager verbinden (Hintergrund) -> `ModemAdded`/`ModemRemoved` abonniert
//! 2. `GetModems` (Hintergrund) -> jedes Modem direkt verbinden
//! 3. Modem mit `org.ofono.VoiceCallManager` -> Anrufverwaltung verbinden
//! 4. `CallAdded` -> Anruf verbinden (Hintergrund) -> `GetProperties` (Hintergrund)
//! 5. Zustandswechsel -> Aktiv-Zaehler -> ggf. [`StatusGeaendert`]

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use callwatch_core::ofono::EIGENSCHAFT_STATE;
use callwatch_core::{
    Abonnement, BusEreignis, Eigenschaften, EreignisSender, ObjektPfad, OfonoBus, Result,
    StatusGeaendert,
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::anrufe::Anrufliste;
use crate::modems::ModemListe;
use crate::zaehler::{AktivZaehler, StatusMelder};

// ---------------------------------------------------------------------------
// CallMonitor
// ---------------------------------------------------------------------------

/// Oeffentliches Handle des Anruf-Monitors
///
/// Drop beendet die Schleife ebenfalls; [`CallMonitor::beenden`] wartet
/// zusaetzlich, bis alle Eintraege abgebaut sind.
pub struct CallMonitor {
    status_tx: broadcast::Sender<StatusGeaendert>,
    anzahl_rx: watch::Receiver<u32>,
    stopp_tx: Option<oneshot::Sender<()>>,
    aufgabe: Option<JoinHandle<()>>,
}

impl CallMonitor {
    /// Startet die Ereignisschleife und beginnt mit der Suche nach Modems
    ///
    /// Kehrt sofort zurueck. Muss innerhalb einer Tokio-Runtime aufgerufen
    /// werden.
    pub fn starten<B: OfonoBus>(bus: Arc<B>) -> Self {
        let melder = StatusMelder::neu();
        let status_tx = melder.status_sender();
        let anzahl_rx = melder.anzahl_beobachten();
        let (stopp_tx, stopp_rx) = oneshot::channel();

        let schleife = Monitorschleife::neu(bus, melder);
        schleife.entdeckung_starten();
        let aufgabe = tokio::spawn(schleife.laufen(stopp_rx));

        tracing::info!("Anruf-Monitor gestartet");
        Self {
            status_tx,
            anzahl_rx,
            stopp_tx: Some(stopp_tx),
            aufgabe: Some(aufgabe),
        }
    }

    /// Abonniert `status-changed`-Ereignisse
    pub fn abonnieren(&self) -> broadcast::Receiver<StatusGeaendert> {
        self.status_tx.subscribe()
    }

    /// Ist gerade mindestens ein Anruf aktiv?
    pub fn anruf_aktiv(&self) -> bool {
        *self.anzahl_rx.borrow() > 0
    }

    /// Anzahl der aktiven oder gehaltenen Anrufe
    pub fn aktive_anrufe(&self) -> u32 {
        *self.anzahl_rx.borrow()
    }

    /// Beobachtet die Anzahl aktiver Anrufe (Pegel statt Flanke)
    pub fn anzahl_beobachten(&self) -> watch::Receiver<u32> {
        self.anzahl_rx.clone()
    }

    /// Beendet die Schleife und wartet auf den Abbau
    ///
    /// Mehrfacher Aufruf ist erlaubt.
    pub async fn beenden(&mut self) {
        if let Some(stopp) = self.stopp_tx.take() {
            let _ = stopp.send(());
        }
        if let Some(aufgabe) = self.aufgabe.take() {
            if let Err(e) = aufgabe.await {
                tracing::warn!(fehler = %e, "Monitor-Schleife nicht sauber beendet");
            }
        }
    }

    /// Laeuft die Schleife noch?
    pub fn laeuft(&self) -> bool {
        self.aufgabe.as_ref().is_some_and(|a| !a.is_finished())
    }
}

impl Drop for CallMonitor {
    fn drop(&mut self) {
        if let Some(stopp) = self.stopp_tx.take() {
            let _ = stopp.send(());
        }
    }
}

// ---------------------------------------------------------------------------
// Monitorschleife
// ---------------------------------------------------------------------------

/// Ergebnisse der Hintergrund-Aufgaben
pub(crate) enum Rueckmeldung {
    ManagerVerbunden(Result<Abonnement>),
    ModemsAbgefragt(Result<Vec<(ObjektPfad, Eigenschaften)>>),
    AnrufVerbunden {
        pfad: ObjektPfad,
        verbindung: u64,
        ergebnis: Result<Abonnement>,
    },
    AnrufEigenschaften {
        pfad: ObjektPfad,
        generation: u64,
        ergebnis: Result<Eigenschaften>,
    },
}

/// Zustand und Ereignisverarbeitung des Monitors
pub(crate) struct Monitorschleife<B: OfonoBus> {
    bus: Arc<B>,
    /// Fehlt bis die Verbindung zum Manager steht
    manager: Option<Abonnement>,
    pub(crate) modems: ModemListe,
    pub(crate) anrufe: Anrufliste,
    pub(crate) zaehler: AktivZaehler,
    bus_tx: EreignisSender,
    bus_rx: mpsc::UnboundedReceiver<BusEreignis>,
    rueck_tx: mpsc::UnboundedSender<Rueckmeldung>,
    rueck_rx: mpsc::UnboundedReceiver<Rueckmeldung>,
    /// Laufende Anruf-Verbindungen; nur die zuletzt gestartete pro Pfad gilt
    ausstehend: HashMap<ObjektPfad, u64>,
    naechste_verbindung: u64,
    beendet: bool,
}

impl<B: OfonoBus> Monitorschleife<B> {
    pub(crate) fn neu(bus: Arc<B>, melder: StatusMelder) -> Self {
        let (bus_tx, bus_rx) = mpsc::unbounded_channel();
        let (rueck_tx, rueck_rx) = mpsc::unbounded_channel();
        Self {
            bus,
            manager: None,
            modems: ModemListe::neu(),
            anrufe: Anrufliste::neu(),
            zaehler: AktivZaehler::neu(melder),
            bus_tx,
            bus_rx,
            rueck_tx,
            rueck_rx,
            ausstehend: HashMap::new(),
            naechste_verbindung: 0,
            beendet: false,
        }
    }

    /// Startet die Verbindung zum Manager im Hintergrund
    pub(crate) fn entdeckung_starten(&self) {
        let bus = self.bus.clone();
        let sink = self.bus_tx.clone();
        self.im_hintergrund(async move {
            Rueckmeldung::ManagerVerbunden(bus.manager_verbinden(sink).await)
        });
    }

    pub(crate) async fn laufen(mut self, mut stopp: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut stopp => break,
                Some(ereignis) = self.bus_rx.recv() => self.bus_ereignis(ereignis).await,
                Some(meldung) = self.rueck_rx.recv() => self.rueckmeldung(meldung).await,
            }
        }
        self.beenden();
    }

    /// Fuehrt `arbeit` als eigene Task aus und meldet das Ergebnis zurueck
    ///
    /// Die Task haelt nur einen schwachen Sender: ist die Schleife beendet,
    /// wird das Ergebnis samt evtl. enthaltenem Abonnement verworfen.
    fn im_hintergrund<F>(&self, arbeit: F)
    where
        F: Future<Output = Rueckmeldung> + Send + 'static,
    {
        let rueck = self.rueck_tx.downgrade();
        tokio::spawn(async move {
            let meldung = arbeit.await;
            match rueck.upgrade() {
                Some(tx) => {
                    let _ = tx.send(meldung);
                }
                None => tracing::debug!("Monitor beendet, Rueckmeldung verworfen"),
            }
        });
    }

    pub(crate) async fn bus_ereignis(&mut self, ereignis: BusEreignis) {
        if self.beendet {
            return;
        }

        match ereignis {
            BusEreignis::ModemHinzugefuegt {
                pfad,
                eigenschaften,
            } => {
                self.modems
                    .hinzufuegen(&*self.bus, &self.bus_tx, pfad, &eigenschaften)
                    .await;
            }
            BusEreignis::ModemEntfernt { pfad } => self.modem_entfernen(&pfad),
            BusEreignis::ModemEigenschaftGeaendert { pfad, name, wert } => {
                self.modems
                    .eigenschaft_geaendert(&*self.bus, &self.bus_tx, &pfad, &name, &wert)
                    .await;
            }
            BusEreignis::AnrufHinzugefuegt { pfad, .. } => self.anruf_hinzufuegen(pfad),
            BusEreignis::AnrufEntfernt { pfad } => {
                tracing::debug!(pfad = %pfad, "Anruf entfernt");
                self.ausstehend.remove(&pfad);
                self.anrufe.entfernen(&pfad, &mut self.zaehler);
            }
            BusEreignis::AnrufEigenschaftGeaendert { pfad, name, wert } => {
                if name == EIGENSCHAFT_STATE {
                    self.anrufe
                        .zustand_beobachten(&pfad, &wert, &mut self.zaehler);
                }
            }
        }
    }

    pub(crate) async fn rueckmeldung(&mut self, meldung: Rueckmeldung) {
        if self.beendet {
            return;
        }

        match meldung {
            Rueckmeldung::ManagerVerbunden(Ok(abo)) => {
                tracing::info!("oFono-Manager verbunden");
                self.manager = Some(abo);

                let bus = self.bus.clone();
                self.im_hintergrund(async move {
                    Rueckmeldung::ModemsAbgefragt(bus.modems_abfragen().await)
                });
            }
            Rueckmeldung::ManagerVerbunden(Err(e)) => {
                tracing::warn!(fehler = %e, "oFono-Manager konnte nicht verbunden werden");
            }
            Rueckmeldung::ModemsAbgefragt(Ok(modems)) => {
                tracing::debug!(anzahl = modems.len(), "Modems abgefragt");
                for (pfad, eigenschaften) in modems {
                    self.modems
                        .hinzufuegen(&*self.bus, &self.bus_tx, pfad, &eigenschaften)
                        .await;
                }
            }
            Rueckmeldung::ModemsAbgefragt(Err(e)) => {
                tracing::warn!(fehler = %e, "oFono-Modems konnten nicht abgefragt werden");
            }
            Rueckmeldung::AnrufVerbunden {
                pfad,
                verbindung,
                ergebnis,
            } => {
                self.anruf_verbunden(pfad, verbindung, ergebnis);
            }
            Rueckmeldung::AnrufEigenschaften {
                pfad,
                generation,
                ergebnis,
            } => match ergebnis {
                Ok(eigenschaften) => {
                    self.anrufe
                        .erstbeobachtung(&pfad, generation, &eigenschaften, &mut self.zaehler);
                }
                Err(e) => {
                    tracing::warn!(
                        pfad = %pfad,
                        fehler = %e,
                        "Anruf-Eigenschaften konnten nicht abgefragt werden"
                    );
                }
            },
        }
    }

    fn modem_entfernen(&mut self, pfad: &ObjektPfad) {
        self.ausstehend.retain(|anruf, _| !anruf.liegt_unter(pfad));
        let anrufe = self.anrufe.entfernen_unter(pfad, &mut self.zaehler);
        if !self.modems.entfernen(pfad) {
            tracing::debug!(pfad = %pfad, "Entfernen fuer unbekanntes Modem");
        }
        tracing::debug!(pfad = %pfad, anrufe, "Modem samt Anrufen entfernt");
    }

    fn anruf_hinzufuegen(&mut self, pfad: ObjektPfad) {
        self.naechste_verbindung += 1;
        let verbindung = self.naechste_verbindung;
        self.ausstehend.insert(pfad.clone(), verbindung);
        tracing::debug!(pfad = %pfad, verbindung, "Anruf hinzugefuegt");

        let bus = self.bus.clone();
        let sink = self.bus_tx.clone();
        self.im_hintergrund(async move {
            let ergebnis = bus.anruf_verbinden(&pfad, sink).await;
            Rueckmeldung::AnrufVerbunden {
                pfad,
                verbindung,
                ergebnis,
            }
        });
    }

    fn anruf_verbunden(
        &mut self,
        pfad: ObjektPfad,
        verbindung: u64,
        ergebnis: Result<Abonnement>,
    ) {
        if self.ausstehend.get(&pfad) != Some(&verbindung) {
            tracing::debug!(
                pfad = %pfad,
                verbindung,
                "Anruf inzwischen entfernt oder neu gemeldet, Verbindung verworfen"
            );
            return;
        }
        self.ausstehend.remove(&pfad);

        let abo = match ergebnis {
            Ok(abo) => abo,
            Err(e) => {
                tracing::warn!(pfad = %pfad, fehler = %e, "Anruf-Proxy konnte nicht erstellt werden");
                return;
            }
        };

        if !self.modems.besitzt_anruf(&pfad) {
            tracing::debug!(pfad = %pfad, "Modem des Anrufs nicht mehr vorhanden, verworfen");
            return;
        }

        let generation = self.anrufe.einfuegen(pfad.clone(), abo, &mut self.zaehler);

        // PropertyChanged kann vor dieser Antwort eintreffen; dann gewinnt es
        let bus = self.bus.clone();
        self.im_hintergrund(async move {
            let ergebnis = bus.anruf_eigenschaften(&pfad).await;
            Rueckmeldung::AnrufEigenschaften {
                pfad,
                generation,
                ergebnis,
            }
        });
    }

    /// Baut Anrufe, Modems und das Manager-Abonnement ab (in dieser Reihenfolge)
    pub(crate) fn beenden(&mut self) {
        if self.beendet {
            return;
        }
        self.beendet = true;

        self.ausstehend.clear();
        self.anrufe.alle_entfernen(&mut self.zaehler);
        self.modems.alle_entfernen();
        self.manager = None;
        tracing::info!("Anruf-Monitor beendet");
    }

    #[cfg(test)]
    pub(crate) fn ausstehende_anrufe(&self) -> usize {
        self.ausstehend.len()
    }

    #[cfg(test)]
    pub(crate) fn ereignis_sender(&self) -> EreignisSender {
        self.bus_tx.clone()
    }

    #[cfg(test)]
    pub(crate) fn manager_verbunden(&self) -> bool {
        self.manager.is_some()
    }

    /// Verarbeitet alles, was gerade in den Eingaengen liegt
    #[cfg(test)]
    pub(crate) async fn ausstehende_verarbeiten(&mut self) -> bool {
        let mut verarbeitet = false;
        while let Ok(ereignis) = self.bus_rx.try_recv() {
            self.bus_ereignis(ereignis).await;
            verarbeitet = true;
        }
        while let Ok(meldung) = self.rueck_rx.try_recv() {
            self.rueckmeldung(meldung).await;
            verarbeitet = true;
        }
        verarbeitet
    }
}
