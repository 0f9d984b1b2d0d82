//! Integrationstest: kompletter Encode -> Server -> Decode Roundtrip
//! mit der nativen Engine und dem echten Envelope-Format.

use std::sync::Arc;

use serde_json::{json, Value};

use hushcodec_codec::{CodecEinstellungen, CodecPipeline, RequestTransform, ResponseTransform};
use hushcodec_core::envelope::{hat_tag, open_envelope, seal_envelope};
use hushcodec_core::types::{
    IncomingResponse, OutgoingRequest, RequestBody, HEADER_ORIGIN_KEY, HEADER_TIMESTAMP,
};
use hushcodec_engine::{CryptoEngine, EngineAlgorithm, NativeEngine};

fn pipeline_mit(engine: NativeEngine, schluessel: &str) -> CodecPipeline {
    let mut einstellungen = CodecEinstellungen::default();
    einstellungen.codec.aktiv = true;
    einstellungen.codec.request_schluessel = Some(schluessel.into());
    CodecPipeline::new(Arc::new(engine), Arc::new(einstellungen))
}

/// Spielt die Server-Seite nach: entschluesselt den Request-Body mit
/// dem geteilten Schluessel, verschluesselt die Antwort mit einem
/// per-Response-Schluessel und legt das Origin-Token (der mit dem
/// Zeitstempel verschluesselte Antwort-Schluessel) in die Header.
async fn simulierter_server(
    engine: &NativeEngine,
    request: &OutgoingRequest,
    request_schluessel: &str,
    antwort_schluessel: &str,
) -> IncomingResponse {
    let envelope = match &request.body {
        Some(RequestBody::Json(Value::Object(objekt))) => {
            objekt.get("data").and_then(Value::as_str).unwrap().to_string()
        }
        anderes => panic!("unerwarteter Request-Body: {anderes:?}"),
    };
    let ciphertext = open_envelope(&envelope).unwrap();
    let klartext = engine.decrypt(ciphertext, request_schluessel).await.unwrap();
    let empfangen: Value = serde_json::from_str(&klartext).unwrap();

    let zeitstempel = request.headers.get(HEADER_TIMESTAMP).unwrap().clone();
    let origin = engine
        .encrypt(antwort_schluessel, &zeitstempel)
        .await
        .unwrap();

    let antwort_payload = json!({ "code": "00000", "empfangen": empfangen });
    let antwort_ciphertext = engine
        .encrypt(&antwort_payload.to_string(), antwort_schluessel)
        .await
        .unwrap();

    let mut response =
        IncomingResponse::new(200, json!({ "data": seal_envelope(&antwort_ciphertext) }));
    response.set_header(HEADER_ORIGIN_KEY, origin);
    response.set_header(HEADER_TIMESTAMP, zeitstempel);
    response
}

#[tokio::test]
async fn kompletter_roundtrip_aes256gcm() {
    let engine = NativeEngine::new(EngineAlgorithm::Aes256Gcm);
    let pipeline = pipeline_mit(engine.clone(), "geteilter-request-key");

    let payload = json!({"name": "x", "rollen": ["admin", "user"]});
    let request = OutgoingRequest::new("/v2/user/save").mit_json(payload.clone());

    // Encode: Body ist jetzt ein Envelope, Korrelations-Header gestempelt
    let verschluesselt = pipeline.transform_request(request).await;
    match &verschluesselt.body {
        Some(RequestBody::Json(Value::Object(objekt))) => {
            assert!(hat_tag(objekt.get("data").and_then(Value::as_str).unwrap()));
        }
        anderes => panic!("Body wurde nicht verschluesselt: {anderes:?}"),
    }
    assert!(verschluesselt.headers.contains_key(HEADER_TIMESTAMP));

    // Server-Seite + Decode
    let response = simulierter_server(
        &engine,
        &verschluesselt,
        "geteilter-request-key",
        "antwort-schluessel-789",
    )
    .await;
    let entschluesselt = pipeline.transform_response(response).await;

    assert_eq!(entschluesselt.body["code"], "00000");
    assert_eq!(entschluesselt.body["empfangen"], payload);
}

#[tokio::test]
async fn kompletter_roundtrip_chacha20() {
    let engine = NativeEngine::new(EngineAlgorithm::ChaCha20Poly1305);
    let pipeline = pipeline_mit(engine.clone(), "k1");

    let payload = json!([{"id": 1}, {"id": 2}]);
    let request = OutgoingRequest::new("/v2/user/batch").mit_json(payload.clone());

    let verschluesselt = pipeline.transform_request(request).await;
    // Array-Form bleibt erhalten
    let envelope = match &verschluesselt.body {
        Some(RequestBody::Json(Value::Array(eintraege))) => {
            assert_eq!(eintraege.len(), 1);
            eintraege[0].get("data").and_then(Value::as_str).unwrap().to_string()
        }
        anderes => panic!("Array-Form nicht erhalten: {anderes:?}"),
    };
    assert!(hat_tag(&envelope));

    // Server-Seite haendisch (Array-Variante)
    let ciphertext = open_envelope(&envelope).unwrap();
    let klartext = engine.decrypt(ciphertext, "k1").await.unwrap();
    assert_eq!(serde_json::from_str::<Value>(&klartext).unwrap(), payload);
}

#[tokio::test]
async fn klartext_response_wird_durchgereicht() {
    let engine = NativeEngine::default();
    let pipeline = pipeline_mit(engine, "k1");

    let mut response =
        IncomingResponse::new(200, json!({ "data": "plain text not encrypted" }));
    response.set_header(HEADER_ORIGIN_KEY, "origin");
    response.set_header(HEADER_TIMESTAMP, "123");
    let original = response.clone();

    assert_eq!(pipeline.transform_response(response).await, original);
}

#[tokio::test]
async fn doppeltes_dekodieren_ist_idempotent() {
    let engine = NativeEngine::default();
    let pipeline = pipeline_mit(engine.clone(), "k1");

    let request = OutgoingRequest::new("/v2/user/save").mit_json(json!({"name": "x"}));
    let verschluesselt = pipeline.transform_request(request).await;
    let response = simulierter_server(&engine, &verschluesselt, "k1", "antwort-key").await;

    let einmal = pipeline.transform_response(response).await;
    let zweimal = pipeline.transform_response(einmal.clone()).await;
    assert_eq!(einmal, zweimal);
}

#[tokio::test]
async fn fehlendes_origin_laesst_ciphertext_stehen() {
    let engine = NativeEngine::default();
    let pipeline = pipeline_mit(engine.clone(), "k1");

    let request = OutgoingRequest::new("/v2/user/save").mit_json(json!({"name": "x"}));
    let verschluesselt = pipeline.transform_request(request).await;
    let mut response = simulierter_server(&engine, &verschluesselt, "k1", "antwort-key").await;
    response.headers.remove(HEADER_ORIGIN_KEY);
    let original = response.clone();

    // Kein Schluesselmaterial: Body bleibt der verschluesselte String
    assert_eq!(pipeline.transform_response(response).await, original);
}
