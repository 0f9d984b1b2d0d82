//! Request-Encoder
//!
//! Ersetzt den Body eines ausgehenden Requests durch einen
//! verschluesselten Envelope und stempelt den Korrelations-Header.
//! Jeder Grund, nicht zu verschluesseln, fuehrt zum unveraenderten
//! Original-Request; der Aufruf wird nie blockiert.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use hushcodec_core::envelope::seal_envelope;
use hushcodec_core::types::{OutgoingRequest, RequestBody, HEADER_TIMESTAMP};
use hushcodec_engine::CryptoEngine;

use crate::config::CodecConfig;

/// Grund warum ein Request nicht verschluesselt wurde.
/// Nur intern sichtbar (tracing); nach aussen ist Encoding infallibel.
#[derive(Debug, Error)]
pub enum EncodeSkip {
    #[error("URL ist vom Codec ausgeschlossen")]
    AusgeschlosseneUrl,

    #[error("Kein Body vorhanden")]
    LeererBody,

    #[error("Request-Verschluesselung deaktiviert")]
    Deaktiviert,

    #[error("Kein Request-Schluessel konfiguriert")]
    FehlenderSchluessel,

    #[error("Body enthaelt Binaerfelder")]
    BinaerPayload,

    #[error("Encoder-Fehler: {0}")]
    Fehler(String),
}

impl EncodeSkip {
    /// Echte Fehler werden als warn geloggt, erwartete Skips als debug
    fn ist_fehler(&self) -> bool {
        matches!(self, Self::Fehler(_))
    }
}

/// Verschluesselt ausgehende Request-Bodies
pub struct RequestEncoder {
    engine: Arc<dyn CryptoEngine>,
    config: Arc<dyn CodecConfig>,
}

impl RequestEncoder {
    pub fn new(engine: Arc<dyn CryptoEngine>, config: Arc<dyn CodecConfig>) -> Self {
        Self { engine, config }
    }

    /// Oeffentlicher Einstieg: gibt entweder den verschluesselten oder
    /// den unveraenderten Original-Request zurueck, niemals einen Fehler.
    pub async fn encode(&self, request: OutgoingRequest) -> OutgoingRequest {
        match self.try_encode(&request).await {
            Ok(verschluesselt) => verschluesselt,
            Err(grund) if grund.ist_fehler() => {
                tracing::warn!(url = %request.url, grund = %grund, "Request-Encoding fehlgeschlagen, sende Klartext");
                request
            }
            Err(grund) => {
                tracing::debug!(url = %request.url, grund = %grund, "Request-Encoding uebersprungen");
                request
            }
        }
    }

    /// Interner Einstieg mit strukturiertem Skip-Grund.
    ///
    /// Arbeitet auf einer Referenz und baut erst am Ende einen neuen
    /// Request: der Original-Request bleibt in jedem Fehlerpfad
    /// unangetastet, halb mutierte Objekte sind nicht beobachtbar.
    pub async fn try_encode(
        &self,
        request: &OutgoingRequest,
    ) -> Result<OutgoingRequest, EncodeSkip> {
        let ausschluss = self.config.ausschluss_pfade();
        if ausschluss.iter().any(|p| request.url.starts_with(p.as_str())) {
            return Err(EncodeSkip::AusgeschlosseneUrl);
        }

        let body = request.body.as_ref().ok_or(EncodeSkip::LeererBody)?;

        if !self.config.request_codec_aktiv() {
            return Err(EncodeSkip::Deaktiviert);
        }
        let schluessel = self
            .config
            .request_schluessel()
            .ok_or(EncodeSkip::FehlenderSchluessel)?;

        if body.hat_binaerfeld() {
            return Err(EncodeSkip::BinaerPayload);
        }

        let json_wert = body.als_json().ok_or(EncodeSkip::BinaerPayload)?;
        let klartext = serde_json::to_string(&json_wert)
            .map_err(|e| EncodeSkip::Fehler(e.to_string()))?;

        let ciphertext = self
            .engine
            .encrypt(&klartext, &schluessel)
            .await
            .map_err(|e| EncodeSkip::Fehler(e.to_string()))?;
        let envelope = seal_envelope(&ciphertext);

        // Array-Form des Aufrufers erhalten
        let neuer_body = if body.ist_array() {
            json!([{ "data": envelope }])
        } else {
            json!({ "data": envelope })
        };

        let mut neu = request.clone();
        neu.body = Some(RequestBody::Json(neuer_body));
        neu.set_header(
            HEADER_TIMESTAMP,
            chrono::Utc::now().timestamp_millis().to_string(),
        );
        Ok(neu)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
