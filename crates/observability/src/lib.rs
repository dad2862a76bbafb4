//! # callwatch-observability
//!
//! Structured Logging (Text oder JSON) via tracing-subscriber.

pub mod logging;

pub use logging::{log_format_gueltig, log_level_gueltig, logging_initialisieren, LogFormat};
