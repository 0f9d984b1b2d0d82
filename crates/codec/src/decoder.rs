//! Response-Decoder
//!
//! Prueft eingehende Responses auf das Envelope-Format und ersetzt den
//! Body durch den entschluesselten Original-Payload. Der Exchange-Key
//! wird pro Response aus dem Origin-Token und dem Zeitstempel der
//! Response-Header abgeleitet.
//!
//! Derselbe Endpunkt darf je nach Server-Konfiguration Klartext oder
//! Ciphertext liefern; deshalb wird der Body erst klassifiziert und
//! auf das Envelope-Tag geprueft, bevor irgendetwas angefasst wird.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use hushcodec_core::envelope::{hat_tag, open_envelope};
use hushcodec_core::types::{BodyShape, IncomingResponse, HEADER_ORIGIN_KEY, HEADER_TIMESTAMP};
use hushcodec_engine::CryptoEngine;

/// Grund warum eine Response nicht entschluesselt wurde
#[derive(Debug, Error)]
pub enum DecodeSkip {
    #[error("Status ist nicht 200")]
    StatusNichtOk,

    #[error("Body ist kein Ciphertext-Kandidat")]
    KeinKandidat,

    #[error("Kein Envelope-Tag, Body ist Klartext")]
    KeinTag,

    #[error("Origin-Token oder Zeitstempel fehlt")]
    FehlendesSchluesselmaterial,

    #[error("Decoder-Fehler: {0}")]
    Fehler(String),
}

impl DecodeSkip {
    fn ist_fehler(&self) -> bool {
        matches!(self, Self::Fehler(_) | Self::FehlendesSchluesselmaterial)
    }
}

/// Entschluesselt eingehende Response-Bodies
pub struct ResponseDecoder {
    engine: Arc<dyn CryptoEngine>,
}

impl ResponseDecoder {
    pub fn new(engine: Arc<dyn CryptoEngine>) -> Self {
        Self { engine }
    }

    /// Oeffentlicher Einstieg: gibt entweder die entschluesselte oder
    /// die unveraenderte Original-Response zurueck, niemals einen Fehler.
    ///
    /// Im Fehlerfall behaelt der Body den Original-Ciphertext; der
    /// Aufrufer muss mit unbrauchbaren Daten rechnen koennen.
    pub async fn decode(&self, response: IncomingResponse) -> IncomingResponse {
        match self.try_decode(&response).await {
            Ok(entschluesselt) => entschluesselt,
            Err(grund) if grund.ist_fehler() => {
                tracing::warn!(status = response.status, grund = %grund, "Response-Decoding fehlgeschlagen, Body bleibt Ciphertext");
                response
            }
            Err(grund) => {
                tracing::debug!(status = response.status, grund = %grund, "Response-Decoding uebersprungen");
                response
            }
        }
    }

    /// Interner Einstieg mit strukturiertem Skip-Grund
    pub async fn try_decode(
        &self,
        response: &IncomingResponse,
    ) -> Result<IncomingResponse, DecodeSkip> {
        if response.status != 200 {
            return Err(DecodeSkip::StatusNichtOk);
        }

        // Body genau einmal klassifizieren, danach nur noch verzweigen
        let shape = BodyShape::klassifizieren(&response.body);
        let kandidat = shape.kandidat().ok_or(DecodeSkip::KeinKandidat)?;

        if !hat_tag(kandidat) {
            return Err(DecodeSkip::KeinTag);
        }

        let origin = response
            .header(HEADER_ORIGIN_KEY)
            .ok_or(DecodeSkip::FehlendesSchluesselmaterial)?;
        let zeitstempel = response
            .header(HEADER_TIMESTAMP)
            .ok_or(DecodeSkip::FehlendesSchluesselmaterial)?;

        let exchange_key = self
            .engine
            .derive_exchange_key(origin, zeitstempel)
            .await
            .map_err(|e| DecodeSkip::Fehler(e.to_string()))?;

        let ciphertext =
            open_envelope(kandidat).map_err(|e| DecodeSkip::Fehler(e.to_string()))?;
        let klartext = self
            .engine
            .decrypt(ciphertext, &exchange_key)
            .await
            .map_err(|e| DecodeSkip::Fehler(e.to_string()))?;
        let wert: Value =
            serde_json::from_str(&klartext).map_err(|e| DecodeSkip::Fehler(e.to_string()))?;

        let mut neu = response.clone();
        neu.body = wert;
        Ok(neu)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hushcodec_core::envelope::seal_envelope;
    use hushcodec_engine::{EngineError, EngineResult};
    use serde_json::json;

    /// Engine-Attrappe: "entschluesselt" indem sie ":enc" abschneidet;
    /// Exchange-Key-Ableitung gibt das Origin-Token selbst zurueck.
    struct FesteEngine;

    #[async_trait]
    impl CryptoEngine for FesteEngine {
        async fn encrypt(&self, plaintext: &str, _key: &str) -> EngineResult<String> {
            Ok(format!("{plaintext}:enc"))
        }
        async fn decrypt(&self, ciphertext: &str, _key: &str) -> EngineResult<String> {
            match ciphertext.strip_suffix(":enc") {
                Some(klartext) => Ok(klartext.to_string()),
                None => Err(EngineError::Entschluesselung("kein :enc-Suffix".into())),
            }
        }
        async fn derive_exchange_key(&self, origin: &str, _timestamp: &str) -> EngineResult<String> {
            Ok(origin.to_string())
        }
        async fn hash(&self, data: &str) -> EngineResult<String> {
            Ok(data.to_string())
        }
    }

    fn decoder() -> ResponseDecoder {
        ResponseDecoder::new(Arc::new(FesteEngine))
    }

    /// Baut eine Response mit verschluesseltem `{"data": ...}`-Body
    fn verschluesselte_response(payload: &Value) -> IncomingResponse {
        let envelope = seal_envelope(&format!("{payload}:enc"));
        let mut response = IncomingResponse::new(200, json!({ "data": envelope }));
        response.set_header(HEADER_ORIGIN_KEY, "origin-token");
        response.set_header(HEADER_TIMESTAMP, "1732104000000");
        response
    }

    #[tokio::test]
    async fn szenario_b_wrapped_ciphertext_wird_entschluesselt() {
        let payload = json!({"name": "x", "rolle": "admin"});
        let response = verschluesselte_response(&payload);

        let ergebnis = decoder().decode(response).await;
        assert_eq!(ergebnis.body, payload);
    }

    #[tokio::test]
    async fn bare_string_body_wird_entschluesselt() {
        let payload = json!([1, 2, 3]);
        let envelope = seal_envelope(&format!("{payload}:enc"));
        let mut response = IncomingResponse::new(200, json!(envelope));
        response.set_header(HEADER_ORIGIN_KEY, "origin-token");
        response.set_header(HEADER_TIMESTAMP, "1732104000000");

        let ergebnis = decoder().decode(response).await;
        assert_eq!(ergebnis.body, payload);
    }

    #[tokio::test]
    async fn szenario_c_klartext_bleibt_unveraendert() {
        let mut response =
            IncomingResponse::new(200, json!({ "data": "plain text not encrypted" }));
        response.set_header(HEADER_ORIGIN_KEY, "origin-token");
        response.set_header(HEADER_TIMESTAMP, "1732104000000");
        let original = response.clone();

        assert_eq!(decoder().decode(response).await, original);
    }

    #[tokio::test]
    async fn szenario_e_fehlendes_origin_laesst_ciphertext_stehen() {
        let envelope = seal_envelope("irgendwas:enc");
        let mut response = IncomingResponse::new(200, json!({ "data": envelope }));
        response.set_header(HEADER_TIMESTAMP, "1732104000000");
        let original = response.clone();

        assert_eq!(decoder().decode(response).await, original);
    }

    #[tokio::test]
    async fn fehlerstatus_bleibt_unveraendert() {
        let envelope = seal_envelope("irgendwas:enc");
        let mut response = IncomingResponse::new(500, json!({ "data": envelope }));
        response.set_header(HEADER_ORIGIN_KEY, "origin-token");
        response.set_header(HEADER_TIMESTAMP, "1732104000000");
        let original = response.clone();

        assert_eq!(decoder().decode(response).await, original);
    }

    #[tokio::test]
    async fn nicht_kandidaten_body_bleibt_unveraendert() {
        let mut response = IncomingResponse::new(200, json!({ "code": "00000", "data": 42 }));
        response.set_header(HEADER_ORIGIN_KEY, "origin-token");
        response.set_header(HEADER_TIMESTAMP, "1732104000000");
        let original = response.clone();

        assert_eq!(decoder().decode(response).await, original);
    }

    #[tokio::test]
    async fn entschluesselungsfehler_laesst_ciphertext_stehen() {
        // Envelope-Tag vorhanden, aber der Inhalt ist kein gueltiger
        // Ciphertext der Attrappe
        let envelope = seal_envelope("kein-gueltiger-ciphertext");
        let mut response = IncomingResponse::new(200, json!({ "data": envelope }));
        response.set_header(HEADER_ORIGIN_KEY, "origin-token");
        response.set_header(HEADER_TIMESTAMP, "1732104000000");
        let original = response.clone();

        assert_eq!(decoder().decode(response).await, original);
    }

    #[tokio::test]
    async fn mehrbyte_body_mit_tag_bleibt_unveraendert() {
        // Server-geliefertes UTF-8 mit "02"-Praefix, dessen Rahmen-
        // Schnitte mitten in Mehrbyte-Zeichen liegen: kein Panic,
        // die Response wird unveraendert durchgereicht
        let mut response = IncomingResponse::new(200, json!({ "data": "02aaaa€€€€" }));
        response.set_header(HEADER_ORIGIN_KEY, "origin-token");
        response.set_header(HEADER_TIMESTAMP, "1732104000000");
        let original = response.clone();

        assert_eq!(decoder().decode(response).await, original);
    }

    #[tokio::test]
    async fn doppeltes_dekodieren_ist_idempotent() {
        let payload = json!({"name": "x"});
        let response = verschluesselte_response(&payload);

        let einmal = decoder().decode(response).await;
        let zweimal = decoder().decode(einmal.clone()).await;
        // Zweiter Durchlauf ist ein No-op: Klartext traegt kein Tag mehr
        assert_eq!(einmal, zweimal);
        assert_eq!(zweimal.body, payload);
    }
}
