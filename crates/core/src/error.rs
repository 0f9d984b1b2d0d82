//! Fehlertypen fuer die Codec-Pipeline
//!
//! Zentraler Fehler-Enum. Kein Fehler verlaesst die Pipeline nach
//! aussen; die Interceptor-Schicht degradiert jeden Fehlerfall zu
//! "Daten unveraendert durchreichen". Die Typen hier existieren damit
//! Skips und Engine-Fehler intern strukturiert geloggt werden koennen.

use thiserror::Error;

/// Result-Alias fuer die Codec-Pipeline
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Alle moeglichen Fehler in der Codec-Pipeline
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Ungueltiger Envelope: {0}")]
    UngueltigerEnvelope(String),

    #[error("Fehlendes Schluesselmaterial: {0}")]
    FehlendesSchluesselmaterial(String),

    #[error("Serialisierung fehlgeschlagen: {0}")]
    Serialisierung(#[from] serde_json::Error),

    #[error("Engine-Fehler: {0}")]
    Engine(String),

    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CodecError {
    /// Erstellt einen Engine-Fehler aus einer beliebigen Nachricht
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }
}
