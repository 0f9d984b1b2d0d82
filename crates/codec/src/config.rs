//! Codec-Konfiguration
//!
//! Die Pipeline liest zwei Laufzeit-Einstellungen: ob
//! Request-Verschluesselung aktiv ist und welcher geteilte Schluessel
//! dafuer gilt. Dazu kommt die Ausschlussliste fuer Pfade die im
//! Klartext bleiben muessen (Konfigurations-Endpunkte, Debugging).
//!
//! `CodecConfig` abstrahiert den Konfigurations-Provider; die
//! mitgelieferte Implementierung laedt eine TOML-Datei und faellt auf
//! Standardwerte zurueck wenn die Datei fehlt.

use serde::{Deserialize, Serialize};

use crate::logging::{log_format_gueltig, log_level_gueltig};

/// Konfigurations-Provider der Pipeline (read-only aus deren Sicht)
pub trait CodecConfig: Send + Sync {
    /// True wenn Request-Verschluesselung aktiviert ist
    fn request_codec_aktiv(&self) -> bool;

    /// Geteilter Schluessel fuer Request-Bodies.
    /// None (oder leer) bedeutet: Verschluesselung wird uebersprungen.
    fn request_schluessel(&self) -> Option<String>;

    /// Pfad-Praefixe die nie verschluesselt werden
    fn ausschluss_pfade(&self) -> Vec<String>;
}

/// Vollstaendige Codec-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CodecEinstellungen {
    /// Codec-Einstellungen
    pub codec: CodecWerte,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Die eigentlichen Codec-Werte
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecWerte {
    /// Aktiviert die Request-Verschluesselung (opt-in pro Deployment)
    pub aktiv: bool,
    /// Geteilter Schluessel fuer Request-Bodies
    pub request_schluessel: Option<String>,
    /// Pfad-Praefixe die im Klartext bleiben
    pub ausschluss_pfade: Vec<String>,
}

impl Default for CodecWerte {
    fn default() -> Self {
        Self {
            aktiv: false,
            request_schluessel: None,
            // Konfigurations-Endpunkt des Servers, bleibt aus
            // Betriebs-/Debugging-Gruenden immer Klartext
            ausschluss_pfade: vec!["/v2/setting".into()],
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl CodecEinstellungen {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config.pruefen()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft die geladenen Werte auf Plausibilitaet.
    /// Fehlkonfiguration soll beim Start auffallen, nicht erst wenn
    /// das Logging stumm bleibt.
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format '{}'", self.logging.format);
        }
        Ok(())
    }
}

impl CodecConfig for CodecEinstellungen {
    fn request_codec_aktiv(&self) -> bool {
        self.codec.aktiv
    }

    fn request_schluessel(&self) -> Option<String> {
        self.codec
            .request_schluessel
            .clone()
            .filter(|s| !s.is_empty())
    }

    fn ausschluss_pfade(&self) -> Vec<String> {
        self.codec.ausschluss_pfade.clone()
    }
}
