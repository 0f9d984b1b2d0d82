//! Gemeinsame Typen fuer die Codec-Pipeline
//!
//! Request und Response sind bewusst minimale Abbilder dessen, was ein
//! HTTP-Client an seinen Interceptor-Hooks uebergibt: URL, Header-Map
//! und Body. Beide Objekte leben nur fuer die Dauer eines einzelnen
//! Austauschs, nichts wird persistiert.

use serde_json::Value;
use std::collections::HashMap;

/// Header unter dem der Server das Origin-Token zurueckgibt.
/// Bilateraler Wire-Vertrag mit dem Server, nicht frei waehlbar.
pub const HEADER_ORIGIN_KEY: &str = "access-control-origin-key";

/// Header fuer den Korrelations-Zeitstempel: der Client stempelt ihn
/// beim Verschluesseln (Epoch-Millisekunden), der Server gibt ihn fuer
/// die Schluessel-Ableitung zurueck.
pub const HEADER_TIMESTAMP: &str = "access-control-timestamp-user";

/// Ausgehender HTTP-Request, wie ihn der Request-Interceptor sieht
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    /// Ziel-Pfad bzw. URL
    pub url: String,
    /// HTTP-Header (Name -> Wert)
    pub headers: HashMap<String, String>,
    /// Body, falls vorhanden
    pub body: Option<RequestBody>,
}

impl OutgoingRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Setzt einen JSON-Body
    pub fn mit_json(mut self, wert: Value) -> Self {
        self.body = Some(RequestBody::Json(wert));
        self
    }

    /// Setzt einen Formular-Body (moeglicherweise mit Binaerfeldern)
    pub fn mit_form(mut self, felder: Vec<FormField>) -> Self {
        self.body = Some(RequestBody::Form(felder));
        self
    }

    /// Setzt einen Header
    pub fn set_header(&mut self, name: impl Into<String>, wert: impl Into<String>) {
        self.headers.insert(name.into(), wert.into());
    }
}

/// Body eines ausgehenden Requests
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON-Payload: Objekt, Array oder Skalar
    Json(Value),
    /// Formular-Payload: Felder koennen Binaerdaten (Datei-Uploads) enthalten
    Form(Vec<FormField>),
}

impl RequestBody {
    /// True wenn mindestens ein Feld Binaerdaten traegt.
    /// Binaere Multipart-Payloads werden von dieser Schicht nie
    /// verschluesselt, sie umgehen die JSON-Serialisierung komplett.
    pub fn hat_binaerfeld(&self) -> bool {
        match self {
            Self::Json(_) => false,
            Self::Form(felder) => felder
                .iter()
                .any(|f| matches!(f.value, FormValue::Binaer { .. })),
        }
    }

    /// True wenn der Body ein JSON-Array ist (Array-Form wird beim
    /// Verschluesseln erhalten)
    pub fn ist_array(&self) -> bool {
        matches!(self, Self::Json(Value::Array(_)))
    }

    /// Gibt den Body als JSON-Wert zurueck, falls er (verlustfrei)
    /// serialisierbar ist. Formulare ohne Binaerfelder werden zu einem
    /// JSON-Objekt, Formulare mit Binaerfeldern zu `None`.
    pub fn als_json(&self) -> Option<Value> {
        match self {
            Self::Json(wert) => Some(wert.clone()),
            Self::Form(felder) => {
                let mut objekt = serde_json::Map::new();
                for feld in felder {
                    match &feld.value {
                        FormValue::Text(text) => {
                            objekt.insert(feld.name.clone(), Value::String(text.clone()));
                        }
                        FormValue::Binaer { .. } => return None,
                    }
                }
                Some(Value::Object(objekt))
            }
        }
    }
}

/// Ein einzelnes Formular-Feld
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, wert: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(wert.into()),
        }
    }

    pub fn datei(name: impl Into<String>, dateiname: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Binaer {
                dateiname: dateiname.into(),
                bytes,
            },
        }
    }
}

/// Wert eines Formular-Felds
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Binaer { dateiname: String, bytes: Vec<u8> },
}

/// Eingehende HTTP-Response, wie sie der Response-Interceptor sieht
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingResponse {
    /// HTTP-Statuscode
    pub status: u16,
    /// Response-Header (Namen kleingeschrieben)
    pub headers: HashMap<String, String>,
    /// Body als JSON-Wert (ein nackter Ciphertext-String ist
    /// `Value::String`)
    pub body: Value,
}

impl IncomingResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Liest einen Header (None wenn abwesend oder leer)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .map(String::as_str)
            .filter(|wert| !wert.is_empty())
    }

    pub fn set_header(&mut self, name: impl Into<String>, wert: impl Into<String>) {
        self.headers.insert(name.into(), wert.into());
    }
}

/// Form des Response-Bodys, einmalig klassifiziert bevor der Decoder
/// verzweigt. Ersetzt verstreute Shape-Checks durch eine Stelle.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    /// Body ist selbst ein String (Kandidat fuer Ciphertext)
    Bare(String),
    /// Body ist ein Objekt mit einem String-Feld `data`
    Wrapped(String),
    /// Alles andere: kein Kandidat fuer Entschluesselung
    Other,
}

impl BodyShape {
    /// Klassifiziert einen Response-Body
    pub fn klassifizieren(body: &Value) -> Self {
        match body {
            Value::String(s) => Self::Bare(s.clone()),
            Value::Object(objekt) => match objekt.get("data") {
                Some(Value::String(s)) => Self::Wrapped(s.clone()),
                _ => Self::Other,
            },
            _ => Self::Other,
        }
    }

    /// Gibt den Kandidaten-String zurueck, falls vorhanden
    pub fn kandidat(&self) -> Option<&str> {
        match self {
            Self::Bare(s) | Self::Wrapped(s) => Some(s),
            Self::Other => None,
        }
    }
}
