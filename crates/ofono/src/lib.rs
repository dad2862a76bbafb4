//! callwatch-ofono – D-Bus-Anbindung an den oFono-Telefoniedienst
//!
//! ## Module
//! - [`proxies`] – zbus-Proxies fuer Manager, Modem, VoiceCallManager, VoiceCall
//! - [`wert`] – Uebersetzung von D-Bus-Varianten in [`callwatch_core::Wert`]
//! - [`bus`] – [`ZbusOfono`], die Implementierung von [`callwatch_core::OfonoBus`]

pub mod bus;
pub mod proxies;
pub mod wert;

pub use bus::{BusTyp, ZbusOfono};
