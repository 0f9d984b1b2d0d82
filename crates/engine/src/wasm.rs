//! WASM-Engine-Backend (wasmtime)
//!
//! Laedt ein WASM-Modul und ruft dessen Krypto-Exporte ueber den
//! linearen Speicher auf. Erwartetes ABI des Moduls:
//!
//! - `memory` - exportierter linearer Speicher
//! - `alloc(size) -> ptr` / `dealloc(ptr, size)` - Heap-Verwaltung
//! - `aes_encrypt(daten_ptr, daten_len, key_ptr, key_len) -> ptr`
//! - `aes_decrypt(daten_ptr, daten_len, key_ptr, key_len) -> ptr`
//! - `hash_digest(daten_ptr, daten_len) -> ptr`
//!
//! Rueckgabe-Puffer: `[laenge (4 Bytes LE)] [UTF-8 Bytes]`.
//!
//! Der Adapter besitzt das komplette Marshalling: jede `alloc` wird
//! mit einem `dealloc` derselben Groesse gepaart, auch im Fehlerfall
//! und fuer den Ergebnispuffer. Der Store ist hinter einem Mutex
//! serialisiert; die Aufrufe selbst sind kurz und synchron.

use async_trait::async_trait;
use parking_lot::Mutex;
use wasmtime::{Engine, Instance, Memory, Module, Store, TypedFunc};

use crate::engine::CryptoEngine;
use crate::error::{EngineError, EngineResult};

/// Haendische Signaturen der Modul-Exporte
struct WasmExporte {
    alloc: TypedFunc<i32, i32>,
    dealloc: TypedFunc<(i32, i32), ()>,
    encrypt: TypedFunc<(i32, i32, i32, i32), i32>,
    decrypt: TypedFunc<(i32, i32, i32, i32), i32>,
    hash: TypedFunc<(i32, i32), i32>,
}

struct WasmInner {
    store: Store<()>,
    memory: Memory,
    exporte: WasmExporte,
}

/// Engine-Backend das ein WASM-Modul hostet
pub struct WasmEngine {
    inner: Mutex<WasmInner>,
}

impl WasmEngine {
    /// Laedt ein Modul aus Bytes (wasm-Binaerformat oder wat-Text)
    pub fn from_module_bytes(bytes: &[u8]) -> EngineResult<Self> {
        let engine = Engine::default();
        let module =
            Module::new(&engine, bytes).map_err(|e| EngineError::WasmModul(e.to_string()))?;
        let mut store = Store::new(&engine, ());
        let instance = Instance::new(&mut store, &module, &[])
            .map_err(|e| EngineError::WasmModul(e.to_string()))?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| EngineError::WasmModul("Modul exportiert kein 'memory'".into()))?;

        let exporte = WasmExporte {
            alloc: instance
                .get_typed_func::<i32, i32>(&mut store, "alloc")
                .map_err(|e| EngineError::WasmModul(e.to_string()))?,
            dealloc: instance
                .get_typed_func::<(i32, i32), ()>(&mut store, "dealloc")
                .map_err(|e| EngineError::WasmModul(e.to_string()))?,
            encrypt: instance
                .get_typed_func::<(i32, i32, i32, i32), i32>(&mut store, "aes_encrypt")
                .map_err(|e| EngineError::WasmModul(e.to_string()))?,
            decrypt: instance
                .get_typed_func::<(i32, i32, i32, i32), i32>(&mut store, "aes_decrypt")
                .map_err(|e| EngineError::WasmModul(e.to_string()))?,
            hash: instance
                .get_typed_func::<(i32, i32), i32>(&mut store, "hash_digest")
                .map_err(|e| EngineError::WasmModul(e.to_string()))?,
        };

        tracing::debug!("WASM-Engine initialisiert");

        Ok(Self {
            inner: Mutex::new(WasmInner {
                store,
                memory,
                exporte,
            }),
        })
    }

    /// Laedt ein Modul aus einer Datei
    pub fn from_file(pfad: &str) -> EngineResult<Self> {
        let bytes = std::fs::read(pfad)?;
        Self::from_module_bytes(&bytes)
    }

    /// Schreibt Bytes in den Modul-Speicher (alloc + write)
    fn puffer_schreiben(inner: &mut WasmInner, daten: &[u8]) -> EngineResult<(i32, i32)> {
        let laenge = daten.len() as i32;
        let ptr = inner
            .exporte
            .alloc
            .call(&mut inner.store, laenge)
            .map_err(|e| EngineError::WasmAufruf(e.to_string()))?;
        if ptr == 0 && laenge > 0 {
            return Err(EngineError::WasmSpeicher("alloc lieferte Null-Zeiger".into()));
        }
        inner
            .memory
            .write(&mut inner.store, ptr as usize, daten)
            .map_err(|e| EngineError::WasmSpeicher(e.to_string()))?;
        Ok((ptr, laenge))
    }

    /// Gibt einen zuvor allozierten Puffer frei
    fn puffer_freigeben(inner: &mut WasmInner, ptr: i32, laenge: i32) {
        // Fehler beim dealloc sind nicht mehr behandelbar, nur loggen
        if let Err(e) = inner.exporte.dealloc.call(&mut inner.store, (ptr, laenge)) {
            tracing::warn!(fehler = %e, "WASM dealloc fehlgeschlagen");
        }
    }

    /// Liest einen laengen-praefixierten Ergebnispuffer und gibt ihn frei
    fn ergebnis_lesen(inner: &mut WasmInner, ptr: i32) -> EngineResult<String> {
        if ptr == 0 {
            return Err(EngineError::WasmAufruf("Ergebnis ist Null-Zeiger".into()));
        }

        let mut laengen_bytes = [0u8; 4];
        inner
            .memory
            .read(&inner.store, ptr as usize, &mut laengen_bytes)
            .map_err(|e| EngineError::WasmSpeicher(e.to_string()))?;
        let laenge = u32::from_le_bytes(laengen_bytes) as usize;

        let mut puffer = vec![0u8; laenge];
        let gelesen = inner
            .memory
            .read(&inner.store, ptr as usize + 4, &mut puffer)
            .map_err(|e| EngineError::WasmSpeicher(e.to_string()));
        // Ergebnispuffer immer freigeben, auch wenn das Lesen scheitert
        Self::puffer_freigeben(inner, ptr, 4 + laenge as i32);
        gelesen?;

        Ok(String::from_utf8(puffer)?)
    }

    /// Ruft einen Export mit zwei String-Argumenten auf
    fn zwei_string_aufruf(
        &self,
        verschluesseln: bool,
        daten: &str,
        schluessel: &str,
    ) -> EngineResult<String> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        let (daten_ptr, daten_len) = Self::puffer_schreiben(inner, daten.as_bytes())?;
        let schluessel_geschrieben = Self::puffer_schreiben(inner, schluessel.as_bytes());
        let (key_ptr, key_len) = match schluessel_geschrieben {
            Ok(paar) => paar,
            Err(e) => {
                Self::puffer_freigeben(inner, daten_ptr, daten_len);
                return Err(e);
            }
        };

        let func = if verschluesseln {
            inner.exporte.encrypt
        } else {
            inner.exporte.decrypt
        };
        let ergebnis = func
            .call(&mut inner.store, (daten_ptr, daten_len, key_ptr, key_len))
            .map_err(|e| EngineError::WasmAufruf(e.to_string()));

        // Eingabepuffer unabhaengig vom Ergebnis freigeben
        Self::puffer_freigeben(inner, daten_ptr, daten_len);
        Self::puffer_freigeben(inner, key_ptr, key_len);

        Self::ergebnis_lesen(inner, ergebnis?)
    }
}

#[async_trait]
impl CryptoEngine for WasmEngine {
    async fn encrypt(&self, plaintext: &str, key: &str) -> EngineResult<String> {
        self.zwei_string_aufruf(true, plaintext, key)
    }

    async fn decrypt(&self, ciphertext: &str, key: &str) -> EngineResult<String> {
        self.zwei_string_aufruf(false, ciphertext, key)
    }

    async fn hash(&self, data: &str) -> EngineResult<String> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        let (ptr, laenge) = Self::puffer_schreiben(inner, data.as_bytes())?;
        let ergebnis = inner
            .exporte
            .hash
            .call(&mut inner.store, (ptr, laenge))
            .map_err(|e| EngineError::WasmAufruf(e.to_string()));
        Self::puffer_freigeben(inner, ptr, laenge);

        Self::ergebnis_lesen(inner, ergebnis?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
