//! Namen und Konstanten des oFono-Dienstes
//!
//! oFono ist der Telefonie-Dienst auf dem Systembus. Die Namen hier sind
//! Teil seiner stabilen D-Bus-API.

/// Wohlbekannter Busname des Dienstes
pub const DIENST: &str = "org.ofono";

/// Objektpfad des Managers
pub const MANAGER_PFAD: &str = "/";

/// Schnittstelle, deren Vorhandensein ein sprachfaehiges Modem kennzeichnet
pub const SCHNITTSTELLE_VOICECALL_MANAGER: &str = "org.ofono.VoiceCallManager";

/// Modem-Eigenschaft mit der Liste der unterstuetzten Schnittstellen
pub const EIGENSCHAFT_INTERFACES: &str = "Interfaces";

/// Anruf-Eigenschaft mit dem Zustand als Text
pub const EIGENSCHAFT_STATE: &str = "State";
