//! Natives Engine-Backend
//!
//! Symmetrische Verschluesselung mit AES-256-GCM oder
//! ChaCha20-Poly1305.
//!
//! ## Wire-Kodierung
//! ```text
//! base64( [nonce(12)] [ciphertext + auth_tag(16)] )
//! ```
//!
//! Der Schluessel-String wird per SHA-256 auf 32 Bytes gebracht,
//! dadurch sind beliebige Schluessel-Strings (auch kurze geteilte
//! Request-Keys) verwendbar.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce as AesNonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{ChaCha20Poly1305, Key as ChaChaKey, Nonce as ChaChaNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use async_trait::async_trait;

use crate::engine::CryptoEngine;
use crate::error::{EngineError, EngineResult};

const NONCE_LAENGE: usize = 12;

/// Algorithmus des nativen Backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineAlgorithm {
    #[default]
    Aes256Gcm,
    ChaCha20Poly1305,
}

/// Natives Engine-Backend (synchron unter der Haube, async am Trait)
#[derive(Debug, Clone, Default)]
pub struct NativeEngine {
    algorithm: EngineAlgorithm,
}

impl NativeEngine {
    pub fn new(algorithm: EngineAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Bringt einen Schluessel-String auf 32 Bytes
    fn schluessel_digest(key: &str) -> [u8; 32] {
        Sha256::digest(key.as_bytes()).into()
    }

    fn encrypt_bytes(&self, plaintext: &[u8], key: &str) -> EngineResult<Vec<u8>> {
        let key_bytes = Self::schluessel_digest(key);

        let mut nonce_bytes = [0u8; NONCE_LAENGE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = match self.algorithm {
            EngineAlgorithm::Aes256Gcm => {
                let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
                cipher
                    .encrypt(AesNonce::from_slice(&nonce_bytes), plaintext)
                    .map_err(|e| EngineError::Verschluesselung(e.to_string()))?
            }
            EngineAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new(ChaChaKey::from_slice(&key_bytes));
                cipher
                    .encrypt(ChaChaNonce::from_slice(&nonce_bytes), plaintext)
                    .map_err(|e| EngineError::Verschluesselung(e.to_string()))?
            }
        };

        // Nonce voranstellen, damit decrypt ohne externen Zustand auskommt
        let mut out = Vec::with_capacity(NONCE_LAENGE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt_bytes(&self, daten: &[u8], key: &str) -> EngineResult<Vec<u8>> {
        if daten.len() < NONCE_LAENGE {
            return Err(EngineError::Entschluesselung(format!(
                "Ciphertext zu kurz: {} Bytes",
                daten.len()
            )));
        }
        let key_bytes = Self::schluessel_digest(key);
        let (nonce_bytes, ciphertext) = daten.split_at(NONCE_LAENGE);

        match self.algorithm {
            EngineAlgorithm::Aes256Gcm => {
                let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
                cipher
                    .decrypt(AesNonce::from_slice(nonce_bytes), ciphertext)
                    .map_err(|e| EngineError::Entschluesselung(e.to_string()))
            }
            EngineAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new(ChaChaKey::from_slice(&key_bytes));
                cipher
                    .decrypt(ChaChaNonce::from_slice(nonce_bytes), ciphertext)
                    .map_err(|e| EngineError::Entschluesselung(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl CryptoEngine for NativeEngine {
    async fn encrypt(&self, plaintext: &str, key: &str) -> EngineResult<String> {
        let bytes = self.encrypt_bytes(plaintext.as_bytes(), key)?;
        Ok(STANDARD.encode(bytes))
    }

    async fn decrypt(&self, ciphertext: &str, key: &str) -> EngineResult<String> {
        let bytes = STANDARD.decode(ciphertext)?;
        let plaintext = self.decrypt_bytes(&bytes, key)?;
        Ok(String::from_utf8(plaintext)?)
    }

    async fn hash(&self, data: &str) -> EngineResult<String> {
        let digest = Sha256::digest(data.as_bytes());
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
