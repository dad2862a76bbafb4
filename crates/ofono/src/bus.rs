//! zbus-Implementierung von [`OfonoBus`]
//!
//! Fuer jedes verbundene Objekt wird ein Proxy gebaut, dessen Signal-Streams
//! in eigenen Tasks laufen und als [`BusEreignis`] an den Monitor gehen. Proxy
//! und Tasks gehoeren dem zurueckgegebenen [`Abonnement`].

use async_trait::async_trait;
use callwatch_core::{
    Abonnement, BusEreignis, CallwatchError, Eigenschaften, EreignisSender, ObjektPfad,
    OfonoBus, Result,
};
use futures_util::{Stream, StreamExt};
use tokio::task::AbortHandle;
use zbus::names::WellKnownName;
use zbus::Connection;

use crate::proxies::manager::{ManagerProxy, ModemAdded, ModemRemoved};
use crate::proxies::modem::{self, ModemProxy};
use crate::proxies::voice_call::{self, VoiceCallProxy};
use crate::proxies::voice_call_manager::{CallAdded, CallRemoved, VoiceCallManagerProxy};
use crate::wert::{eigenschaften_umwandeln, wert_umwandeln};

/// Welcher Bus verwendet wird
///
/// oFono laeuft auf dem Systembus; der Sessionbus ist fuer Test-Dienste
/// (z.B. ein oFono-Mock) gedacht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusTyp {
    #[default]
    System,
    Session,
}

/// Bus-Schicht ueber eine zbus-Verbindung
#[derive(Clone)]
pub struct ZbusOfono {
    verbindung: Connection,
    dienst: WellKnownName<'static>,
}

impl ZbusOfono {
    /// Oeffnet eine Verbindung zum gewuenschten Bus
    pub async fn verbinden(typ: BusTyp, dienst: &str) -> Result<Self> {
        let verbindung = match typ {
            BusTyp::System => Connection::system().await,
            BusTyp::Session => Connection::session().await,
        }
        .map_err(|e| CallwatchError::verbindung(format!("{typ:?}-Bus: {e}")))?;

        tracing::info!(bus = ?typ, dienst, "D-Bus-Verbindung hergestellt");
        Self::mit_verbindung(verbindung, dienst)
    }

    /// Verwendet eine bestehende Verbindung
    pub fn mit_verbindung(verbindung: Connection, dienst: &str) -> Result<Self> {
        let dienst = WellKnownName::try_from(dienst)
            .map_err(|e| {
                CallwatchError::Konfiguration(format!("Ungueltiger Dienstname '{dienst}': {e}"))
            })?
            .into_owned();

        Ok(Self { verbindung, dienst })
    }

    pub fn dienst(&self) -> &str {
        self.dienst.as_str()
    }

    async fn modem_proxy(&self, pfad: &ObjektPfad) -> zbus::Result<ModemProxy<'static>> {
        ModemProxy::builder(&self.verbindung)
            .destination(self.dienst.clone())?
            .path(pfad.as_str().to_owned())?
            .build()
            .await
    }

    async fn anrufverwaltung_proxy(
        &self,
        pfad: &ObjektPfad,
    ) -> zbus::Result<VoiceCallManagerProxy<'static>> {
        VoiceCallManagerProxy::builder(&self.verbindung)
            .destination(self.dienst.clone())?
            .path(pfad.as_str().to_owned())?
            .build()
            .await
    }

    async fn anruf_proxy(&self, pfad: &ObjektPfad) -> zbus::Result<VoiceCallProxy<'static>> {
        VoiceCallProxy::builder(&self.verbindung)
            .destination(self.dienst.clone())?
            .path(pfad.as_str().to_owned())?
            .build()
            .await
    }

    async fn manager_proxy(&self) -> zbus::Result<ManagerProxy<'static>> {
        ManagerProxy::builder(&self.verbindung)
            .destination(self.dienst.clone())?
            .build()
            .await
    }
}

#[async_trait]
impl OfonoBus for ZbusOfono {
    async fn manager_verbinden(&self, sink: EreignisSender) -> Result<Abonnement> {
        let manager = self.manager_proxy().await.map_err(bus_fehler)?;
        let hinzugefuegt = manager.receive_modem_added().await.map_err(bus_fehler)?;
        let entfernt = manager.receive_modem_removed().await.map_err(bus_fehler)?;

        let a = weiterleiten(hinzugefuegt, sink.clone(), |signal: ModemAdded| {
            let args = signal_args(signal.args())?;
            Some(BusEreignis::ModemHinzugefuegt {
                pfad: ObjektPfad::neu(args.path().as_str()),
                eigenschaften: eigenschaften_umwandeln(args.properties()),
            })
        });
        let b = weiterleiten(entfernt, sink, |signal: ModemRemoved| {
            let args = signal_args(signal.args())?;
            Some(BusEreignis::ModemEntfernt {
                pfad: ObjektPfad::neu(args.path().as_str()),
            })
        });

        tracing::debug!(dienst = %self.dienst, "Manager verbunden");
        Ok(Abonnement::neu(ObjektPfad::neu(callwatch_core::ofono::MANAGER_PFAD))
            .mit_aufgabe(a)
            .mit_aufgabe(b)
            .mit_halter(manager))
    }

    async fn modems_abfragen(&self) -> Result<Vec<(ObjektPfad, Eigenschaften)>> {
        let manager = self.manager_proxy().await.map_err(bus_fehler)?;
        let modems = manager.get_modems().await.map_err(bus_fehler)?;

        Ok(modems
            .iter()
            .map(|(pfad, eigenschaften)| {
                (
                    ObjektPfad::neu(pfad.as_str()),
                    eigenschaften_umwandeln(eigenschaften),
                )
            })
            .collect())
    }

    async fn modem_verbinden(
        &self,
        pfad: &ObjektPfad,
        sink: EreignisSender,
    ) -> Result<Abonnement> {
        let modem = self.modem_proxy(pfad).await.map_err(bus_fehler)?;
        let geaendert = modem.receive_property_changed().await.map_err(bus_fehler)?;

        let modem_pfad = pfad.clone();
        let a = weiterleiten(geaendert, sink, move |signal: modem::PropertyChanged| {
            let args = signal_args(signal.args())?;
            Some(BusEreignis::ModemEigenschaftGeaendert {
                pfad: modem_pfad.clone(),
                name: args.name().clone(),
                wert: wert_umwandeln(args.value()),
            })
        });

        Ok(Abonnement::neu(pfad.clone()).mit_aufgabe(a).mit_halter(modem))
    }

    async fn anrufverwaltung_verbinden(
        &self,
        pfad: &ObjektPfad,
        sink: EreignisSender,
    ) -> Result<Abonnement> {
        let vcm = self.anrufverwaltung_proxy(pfad).await.map_err(bus_fehler)?;
        let hinzugefuegt = vcm.receive_call_added().await.map_err(bus_fehler)?;
        let entfernt = vcm.receive_call_removed().await.map_err(bus_fehler)?;

        let a = weiterleiten(hinzugefuegt, sink.clone(), |signal: CallAdded| {
            let args = signal_args(signal.args())?;
            Some(BusEreignis::AnrufHinzugefuegt {
                pfad: ObjektPfad::neu(args.path().as_str()),
                eigenschaften: eigenschaften_umwandeln(args.properties()),
            })
        });
        let b = weiterleiten(entfernt, sink, |signal: CallRemoved| {
            let args = signal_args(signal.args())?;
            Some(BusEreignis::AnrufEntfernt {
                pfad: ObjektPfad::neu(args.path().as_str()),
            })
        });

        Ok(Abonnement::neu(pfad.clone())
            .mit_aufgabe(a)
            .mit_aufgabe(b)
            .mit_halter(vcm))
    }

    async fn anruf_verbinden(
        &self,
        pfad: &ObjektPfad,
        sink: EreignisSender,
    ) -> Result<Abonnement> {
        let anruf = self.anruf_proxy(pfad).await.map_err(bus_fehler)?;
        let geaendert = anruf.receive_property_changed().await.map_err(bus_fehler)?;

        let anruf_pfad = pfad.clone();
        let a = weiterleiten(geaendert, sink, move |signal: voice_call::PropertyChanged| {
            let args = signal_args(signal.args())?;
            Some(BusEreignis::AnrufEigenschaftGeaendert {
                pfad: anruf_pfad.clone(),
                name: args.name().clone(),
                wert: wert_umwandeln(args.value()),
            })
        });

        Ok(Abonnement::neu(pfad.clone()).mit_aufgabe(a).mit_halter(anruf))
    }

    async fn anruf_eigenschaften(&self, pfad: &ObjektPfad) -> Result<Eigenschaften> {
        let anruf = self.anruf_proxy(pfad).await.map_err(bus_fehler)?;
        let roh = anruf.get_properties().await.map_err(bus_fehler)?;
        Ok(eigenschaften_umwandeln(&roh))
    }
}

/// Leitet einen Signal-Stream als [`BusEreignis`]se an den Monitor weiter
///
/// Endet, wenn der Stream endet oder der Monitor nicht mehr empfaengt.
fn weiterleiten<S, F>(signale: S, sink: EreignisSender, umwandeln: F) -> AbortHandle
where
    S: Stream + Send + 'static,
    F: Fn(S::Item) -> Option<BusEreignis> + Send + 'static,
{
    tokio::spawn(async move {
        let mut signale = Box::pin(signale);
        while let Some(signal) = signale.next().await {
            let Some(ereignis) = umwandeln(signal) else {
                continue;
            };
            if sink.send(ereignis).is_err() {
                break;
            }
        }
    })
    .abort_handle()
}

/// Signal-Argumente auspacken; kaputte Signale werden geloggt und verworfen
fn signal_args<T>(args: zbus::Result<T>) -> Option<T> {
    match args {
        Ok(args) => Some(args),
        Err(e) => {
            tracing::warn!(fehler = %e, "Signal mit ungueltigen Argumenten verworfen");
            None
        }
    }
}

fn bus_fehler(e: zbus::Error) -> CallwatchError {
    match e {
        zbus::Error::MethodError(name, text, _) => {
            CallwatchError::bus(format!("{name}: {}", text.unwrap_or_default()))
        }
        andere => CallwatchError::bus(andere.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_bus_ist_system() {
        assert_eq!(BusTyp::default(), BusTyp::System);
    }

    #[test]
    fn fremder_fehler_wird_bus_fehler() {
        let e = bus_fehler(zbus::Error::Unsupported);
        assert!(matches!(e, CallwatchError::Bus(_)));
        assert!(e.ist_wiederholbar());
    }

    #[tokio::test]
    async fn weiterleitung_endet_mit_stream() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let signale = futures_util::stream::iter(vec!["/m1", "", "/m2"]);

        let aufgabe = weiterleiten(signale, tx, |pfad: &str| {
            (!pfad.is_empty()).then(|| BusEreignis::ModemEntfernt {
                pfad: ObjektPfad::neu(pfad),
            })
        });

        let erstes = rx.recv().await.expect("erstes Ereignis");
        let zweites = rx.recv().await.expect("zweites Ereignis");
        assert_eq!(erstes.pfad().as_str(), "/m1");
        assert_eq!(zweites.pfad().as_str(), "/m2");
        // Stream zu Ende -> Task beendet, Sender wird freigegeben
        assert!(rx.recv().await.is_none());
        assert!(aufgabe.is_finished());
    }
}
