//! # hushcodec-codec
//!
//! Die eigentliche Codec-Pipeline: verschluesselt ausgehende
//! Request-Bodies transparent in einen Envelope und entschluesselt
//! eingehende Response-Bodies ueber einen pro-Response abgeleiteten
//! Exchange-Key.
//!
//! Fehlerpolitik: kein Fehler dieser Schicht erreicht die Aufrufstelle.
//! Jeder Fehlerfall degradiert zu "Daten unveraendert durchreichen";
//! intern werden Skips und Fehler strukturiert ueber `tracing`
//! sichtbar gemacht.
//!
//! ## Module
//! - `config` - Konfigurations-Schnittstelle und TOML-Implementierung
//! - `encoder` - Request-Encoder
//! - `decoder` - Response-Decoder
//! - `pipeline` - Interceptor-Hooks fuer den HTTP-Client
//! - `logging` - tracing-subscriber Setup

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod logging;
pub mod pipeline;

// Bequeme Re-Exports
pub use config::{CodecConfig, CodecEinstellungen, LoggingEinstellungen};
pub use decoder::{DecodeSkip, ResponseDecoder};
pub use encoder::{EncodeSkip, RequestEncoder};
pub use logging::logging_initialisieren;
pub use pipeline::{CodecPipeline, RequestTransform, ResponseTransform};
