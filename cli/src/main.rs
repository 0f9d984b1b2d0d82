//! Hushcodec Demo-CLI
//!
//! Laedt die Konfiguration, initialisiert das Logging und spielt einen
//! kompletten Roundtrip durch: Request verschluesseln, die Server-Seite
//! simulieren, Response entschluesseln. Zeigt damit das Envelope-Format
//! und die Exchange-Key-Ableitung auf der Konsole.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use hushcodec_codec::{
    logging_initialisieren, CodecEinstellungen, CodecPipeline, RequestTransform,
    ResponseTransform,
};
use hushcodec_core::envelope::{open_envelope, seal_envelope};
use hushcodec_core::types::{
    IncomingResponse, OutgoingRequest, RequestBody, HEADER_ORIGIN_KEY, HEADER_TIMESTAMP,
};
use hushcodec_engine::{generate_nonce, CryptoEngine, NativeEngine};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("HUSHCODEC_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let mut config = CodecEinstellungen::laden(&config_pfad)?;

    // Logging initialisieren
    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Hushcodec Demo wird initialisiert"
    );

    // Fuer die Demo immer aktiv, mit Schluessel aus der Konfiguration
    // oder einem frisch gewuerfelten
    config.codec.aktiv = true;
    let request_schluessel = config
        .codec
        .request_schluessel
        .get_or_insert_with(generate_nonce)
        .clone();

    let engine = NativeEngine::default();
    let pipeline = CodecPipeline::new(Arc::new(engine.clone()), Arc::new(config));

    // 1. Ausgehenden Request verschluesseln
    let payload = json!({"name": "demo", "rollen": ["admin"]});
    let request = OutgoingRequest::new("/v2/user/save").mit_json(payload.clone());
    tracing::info!(url = %request.url, body = %payload, "Klartext-Request");

    let verschluesselt = pipeline.transform_request(request).await;
    let envelope = envelope_aus_request(&verschluesselt)?;
    tracing::info!(envelope = %envelope, "Verschluesselter Request-Body");

    // 2. Server-Seite simulieren
    let response = simulierter_server(&engine, &verschluesselt, &request_schluessel).await?;
    tracing::info!(body = %response.body, "Verschluesselte Response vom Server");

    // 3. Eingehende Response entschluesseln
    let entschluesselt = pipeline.transform_response(response).await;
    tracing::info!(body = %entschluesselt.body, "Entschluesselte Response");

    if entschluesselt.body["empfangen"] != payload {
        return Err(anyhow!("Roundtrip hat den Payload nicht erhalten"));
    }
    tracing::info!("Roundtrip erfolgreich");
    Ok(())
}

/// Zieht den Envelope-String aus dem verschluesselten Request-Body
fn envelope_aus_request(request: &OutgoingRequest) -> Result<String> {
    match &request.body {
        Some(RequestBody::Json(Value::Object(objekt))) => objekt
            .get("data")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| anyhow!("Request-Body hat kein data-Feld")),
        _ => Err(anyhow!("Request-Body wurde nicht verschluesselt")),
    }
}

/// Spielt die Server-Seite nach: Request entschluesseln, Antwort mit
/// einem per-Response-Schluessel verschluesseln und das Origin-Token
/// (den mit dem Zeitstempel verschluesselten Antwort-Schluessel) in die
/// Header legen.
async fn simulierter_server(
    engine: &NativeEngine,
    request: &OutgoingRequest,
    request_schluessel: &str,
) -> Result<IncomingResponse> {
    let envelope = envelope_aus_request(request)?;
    let ciphertext = open_envelope(&envelope)?;
    let klartext = engine.decrypt(ciphertext, request_schluessel).await?;
    let empfangen: Value = serde_json::from_str(&klartext)?;
    tracing::info!(body = %empfangen, "Server hat den Request entschluesselt");

    let zeitstempel = request
        .headers
        .get(HEADER_TIMESTAMP)
        .cloned()
        .ok_or_else(|| anyhow!("Korrelations-Header fehlt"))?;
    let antwort_schluessel = generate_nonce();
    let origin = engine.encrypt(&antwort_schluessel, &zeitstempel).await?;

    let antwort_payload = json!({ "code": "00000", "empfangen": empfangen });
    let antwort_ciphertext = engine
        .encrypt(&antwort_payload.to_string(), &antwort_schluessel)
        .await?;

    let mut response =
        IncomingResponse::new(200, json!({ "data": seal_envelope(&antwort_ciphertext) }));
    response.set_header(HEADER_ORIGIN_KEY, origin);
    response.set_header(HEADER_TIMESTAMP, zeitstempel);
    Ok(response)
}
