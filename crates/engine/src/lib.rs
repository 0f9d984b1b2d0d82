//! # hushcodec-engine
//!
//! Crypto-Engine-Adapter fuer die Hushcodec-Pipeline.
//!
//! Die Pipeline behandelt alle Engine-Operationen als potenziell
//! asynchron, unabhaengig vom Backend. Zwei Backends:
//!
//! - `NativeEngine` - reine Rust-Implementierung (AES-256-GCM oder
//!   ChaCha20-Poly1305)
//! - `WasmEngine` - laedt ein WASM-Modul (wasmtime) und marshallt
//!   Strings durch dessen linearen Speicher
//!
//! ## Module
//! - `engine` - `CryptoEngine`-Trait und Nonce-Generierung
//! - `native` - natives Backend
//! - `wasm` - WASM-Backend
//! - `error` - Fehlertypen

pub mod engine;
pub mod error;
pub mod native;
pub mod wasm;

// Bequeme Re-Exports
pub use engine::{generate_nonce, CryptoEngine};
pub use error::{EngineError, EngineResult};
pub use native::{EngineAlgorithm, NativeEngine};
pub use wasm::WasmEngine;
