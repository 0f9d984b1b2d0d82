//! Fehlertypen fuer die Crypto-Engine

use thiserror::Error;

/// Fehler in der Crypto-Engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    #[error("Entschluesselung fehlgeschlagen: {0}")]
    Entschluesselung(String),

    #[error("Ungueltiger Schluessel: {0}")]
    UngueltigerSchluessel(String),

    #[error("WASM-Modul konnte nicht geladen werden: {0}")]
    WasmModul(String),

    #[error("WASM-Aufruf fehlgeschlagen: {0}")]
    WasmAufruf(String),

    #[error("WASM-Speicherzugriff fehlgeschlagen: {0}")]
    WasmSpeicher(String),

    #[error("Base64-Dekodierung fehlgeschlagen: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Ergebnis ist kein gueltiges UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
