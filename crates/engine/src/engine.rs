//! `CryptoEngine`-Trait: die Schnittstelle der Pipeline zur Kryptografie
//!
//! Alle vier Operationen sind async, auch wenn ein Backend synchron
//! arbeitet. Die Pipeline awaitet sie einheitlich und bleibt dadurch
//! backend-agnostisch (WASM-Modul mit einmaliger Initialisierung vs.
//! native Krypto-Bibliothek).

use async_trait::async_trait;
use rand::Rng;

use crate::error::EngineResult;

/// Symmetrische Verschluesselung ueber String-Puffer plus Ableitung
/// des per-Response Exchange-Keys.
#[async_trait]
pub trait CryptoEngine: Send + Sync {
    /// Verschluesselt einen Klartext mit dem gegebenen Schluessel
    async fn encrypt(&self, plaintext: &str, key: &str) -> EngineResult<String>;

    /// Entschluesselt einen Ciphertext mit dem gegebenen Schluessel
    async fn decrypt(&self, ciphertext: &str, key: &str) -> EngineResult<String>;

    /// Leitet den Exchange-Key aus Origin-Token und Zeitstempel ab.
    ///
    /// Das Origin-Token ist der mit dem Zeitstempel verschluesselte
    /// Response-Schluessel; die Ableitung ist deshalb eine
    /// Entschluesselung. Deterministisch: gleiches Origin + gleicher
    /// Zeitstempel ergeben denselben Schluessel.
    async fn derive_exchange_key(&self, origin: &str, timestamp: &str) -> EngineResult<String> {
        self.decrypt(origin, timestamp).await
    }

    /// Hex-Digest ueber beliebige Daten
    async fn hash(&self, data: &str) -> EngineResult<String>;
}

/// Generiert ein zufaelliges alphanumerisches Nonce-Token (22 Zeichen)
/// fuer den `x-nonce`-Request-Header des Clients.
pub fn generate_nonce() -> String {
    const ZEICHEN: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..22)
        .map(|_| ZEICHEN[rng.gen_range(0..ZEICHEN.len())] as char)
        .collect()
}
