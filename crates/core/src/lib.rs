//! # hushcodec-core
//!
//! Gemeinsame Typen fuer die Hushcodec Request/Response-Pipeline.
//!
//! ## Module
//! - `types` - Request/Response-Modell, Body-Klassifikation, Header-Konstanten
//! - `envelope` - Envelope-Wire-Format ("02"-Tag + Rahmung)
//! - `error` - Fehlertypen

pub mod envelope;
pub mod error;
pub mod types;

// Bequeme Re-Exports
pub use envelope::{open_envelope, seal_envelope, ENVELOPE_TAG, RAHMEN_KOPF, RAHMEN_ENDE};
pub use error::{CodecError, CodecResult};
pub use types::{
    BodyShape, FormField, FormValue, IncomingResponse, OutgoingRequest, RequestBody,
    HEADER_ORIGIN_KEY, HEADER_TIMESTAMP,
};
