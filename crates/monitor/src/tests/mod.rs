//! Szenario-Tests fuer die Ereignisschleife

mod fake_bus;
