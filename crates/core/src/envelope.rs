//! Envelope-Wire-Format fuer verschluesselte Bodies
//!
//! ## Format
//! ```text
//! [tag "02" (2)] [fueller (6)] [ciphertext] [fueller (4)]
//! ```
//!
//! Das 2-Zeichen-Tag markiert die Schema-Version; Kopf (8 Zeichen
//! inklusive Tag) und Ende (4 Zeichen) rahmen den eigentlichen
//! Ciphertext. Die Rahmung ist ein bilateraler Wire-Vertrag mit dem
//! Server und wird byte-genau reproduziert. Die Fueller-Positionen
//! tragen zufaellige Hex-Zeichen; die Gegenseite liest sie nicht.

use rand::Rng;

use crate::error::{CodecError, CodecResult};

/// Versions-Tag: jeder String mit diesem Praefix ist Ciphertext,
/// niemals Nutzdaten.
pub const ENVELOPE_TAG: &str = "02";

/// Laenge des Kopfs in Zeichen (inklusive Tag)
pub const RAHMEN_KOPF: usize = 8;

/// Laenge des Endes in Zeichen
pub const RAHMEN_ENDE: usize = 4;

const HEX_ZEICHEN: &[u8] = b"0123456789abcdef";

/// True wenn der String das Envelope-Tag traegt.
/// Klartext-JSON faellt hier durch, dadurch ist Dekodierung idempotent.
pub fn hat_tag(wert: &str) -> bool {
    wert.starts_with(ENVELOPE_TAG)
}

/// Verpackt einen Ciphertext in die Envelope-Rahmung
pub fn seal_envelope(ciphertext: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut fueller = |anzahl: usize| -> String {
        (0..anzahl)
            .map(|_| HEX_ZEICHEN[rng.gen_range(0..HEX_ZEICHEN.len())] as char)
            .collect()
    };

    let kopf_fueller = fueller(RAHMEN_KOPF - ENVELOPE_TAG.len());
    let ende_fueller = fueller(RAHMEN_ENDE);
    format!("{ENVELOPE_TAG}{kopf_fueller}{ciphertext}{ende_fueller}")
}

/// Entfernt die Rahmung und gibt den inneren Ciphertext zurueck
pub fn open_envelope(wert: &str) -> CodecResult<&str> {
    if !hat_tag(wert) {
        return Err(CodecError::UngueltigerEnvelope(
            "Envelope-Tag fehlt".to_string(),
        ));
    }
    if wert.len() <= RAHMEN_KOPF + RAHMEN_ENDE {
        return Err(CodecError::UngueltigerEnvelope(format!(
            "Envelope zu kurz: {} Zeichen",
            wert.len()
        )));
    }
    // Indexbasiertes Slicen wuerde bei Mehrbyte-Zeichen an den
    // Schnittstellen panicken; der Body kommt vom Server und kann
    // beliebiges UTF-8 sein
    wert.get(RAHMEN_KOPF..wert.len() - RAHMEN_ENDE)
        .ok_or_else(|| {
            CodecError::UngueltigerEnvelope(
                "Rahmen liegt nicht auf Zeichengrenzen".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_und_open_roundtrip() {
        let versiegelt = seal_envelope("dGVzdC1jaXBoZXJ0ZXh0");
        assert!(hat_tag(&versiegelt));
        assert_eq!(versiegelt.len(), RAHMEN_KOPF + 20 + RAHMEN_ENDE);
        assert_eq!(open_envelope(&versiegelt).unwrap(), "dGVzdC1jaXBoZXJ0ZXh0");
    }

    #[test]
    fn klartext_hat_kein_tag() {
        assert!(!hat_tag("{\"name\":\"x\"}"));
        assert!(!hat_tag("plain text not encrypted"));
        assert!(!hat_tag(""));
    }

    #[test]
    fn tag_ohne_inhalt_schlaegt_fehl() {
        // Tag vorhanden, aber kuerzer als Kopf + Ende
        let result = open_envelope("02abcdef1234");
        assert!(matches!(result, Err(CodecError::UngueltigerEnvelope(_))));
    }

    #[test]
    fn fehlendes_tag_schlaegt_fehl() {
        let result = open_envelope("ffaabbccddeeff00112233");
        assert!(matches!(result, Err(CodecError::UngueltigerEnvelope(_))));
    }

    #[test]
    fn mehrbyte_zeichen_an_den_schnittstellen_schlagen_fehl() {
        // Tag vorhanden und lang genug (in Bytes), aber die Rahmen-
        // Schnitte liegen mitten in Mehrbyte-Zeichen: Fehler, kein Panic
        let result = open_envelope("02aaaa€€€€");
        assert!(matches!(result, Err(CodecError::UngueltigerEnvelope(_))));
    }

    #[test]
    fn mehrbyte_zeichen_im_inneren_sind_erlaubt() {
        let versiegelt = seal_envelope("grüße-€-ciphertext");
        assert_eq!(open_envelope(&versiegelt).unwrap(), "grüße-€-ciphertext");
    }

    #[test]
    fn leerer_ciphertext_versiegelbar() {
        // Grenzfall: seal("") ergibt genau Kopf + Ende und ist damit
        // beim Oeffnen zu kurz
        let versiegelt = seal_envelope("");
        assert_eq!(versiegelt.len(), RAHMEN_KOPF + RAHMEN_ENDE);
        assert!(open_envelope(&versiegelt).is_err());
    }
}
