//! Pipeline-Koordinator
//!
//! Buendelt Encoder und Decoder hinter den beiden Interceptor-Hooks
//! `(request) -> request` und `(response) -> response`, die ein
//! HTTP-Client registriert. Beide Hooks sind async und geben im
//! Fehlerfall das unveraenderte Objekt zurueck; ein Codec-Fehler darf
//! den HTTP-Aufruf niemals scheitern lassen.
//!
//! Nebenlaeufigkeit: pro HTTP-Aufruf wird jeder Hook genau einmal
//! aufgerufen und arbeitet auf seinem eigenen Request/Response-Objekt.
//! Gleichzeitige Aufrufe fuer verschiedene HTTP-Calls duerfen frei
//! interleaven; geteilt ist nur die (read-only) Konfiguration und die
//! Engine.

use std::sync::Arc;

use async_trait::async_trait;

use hushcodec_core::types::{IncomingResponse, OutgoingRequest};
use hushcodec_engine::CryptoEngine;

use crate::config::CodecConfig;
use crate::decoder::ResponseDecoder;
use crate::encoder::RequestEncoder;

/// Request-Hook des HTTP-Clients
#[async_trait]
pub trait RequestTransform: Send + Sync {
    async fn transform_request(&self, request: OutgoingRequest) -> OutgoingRequest;
}

/// Response-Hook des HTTP-Clients
#[async_trait]
pub trait ResponseTransform: Send + Sync {
    async fn transform_response(&self, response: IncomingResponse) -> IncomingResponse;
}

/// Die komplette Codec-Pipeline: Encoder + Decoder
pub struct CodecPipeline {
    encoder: RequestEncoder,
    decoder: ResponseDecoder,
}

impl CodecPipeline {
    pub fn new(engine: Arc<dyn CryptoEngine>, config: Arc<dyn CodecConfig>) -> Self {
        Self {
            encoder: RequestEncoder::new(Arc::clone(&engine), config),
            decoder: ResponseDecoder::new(engine),
        }
    }

    pub fn encoder(&self) -> &RequestEncoder {
        &self.encoder
    }

    pub fn decoder(&self) -> &ResponseDecoder {
        &self.decoder
    }
}

#[async_trait]
impl RequestTransform for CodecPipeline {
    async fn transform_request(&self, request: OutgoingRequest) -> OutgoingRequest {
        self.encoder.encode(request).await
    }
}

#[async_trait]
impl ResponseTransform for CodecPipeline {
    async fn transform_response(&self, response: IncomingResponse) -> IncomingResponse {
        self.decoder.decode(response).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
