//! Helpers for the legacy 8-bit character set used by the interchange format.
//!
//! Lines are exchanged in ISO-8859-1. `encoding_rs` maps that label to
//! windows-1252, a superset, which is used for both directions.

use std::borrow::Cow;

use encoding_rs::{Encoding, WINDOWS_1252};

/// The encoding of every line and field.
pub static ENCODING: &Encoding = WINDOWS_1252;

/// Encode text to legacy bytes, or `None` if some character has no mapping.
pub fn encode(s: &str) -> Option<Cow<'_, [u8]>> {
    let (bytes, _, had_errors) = ENCODING.encode(s);
    if had_errors { None } else { Some(bytes) }
}

/// Decode legacy bytes. Every byte value has a mapping.
pub fn decode(r: &[u8]) -> Cow<'_, str> {
    ENCODING.decode_without_bom_handling(r).0
}

/// Replace umlauts and common accented letters with ASCII spellings.
///
/// Characters without a replacement are passed through unchanged.
pub fn fold(s: &str) -> Cow<'_, str> {
    if s.is_ascii() {
        return Cow::Borrowed(s);
    }

    let mut folded = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match fold_char(c) {
            Some(r) => folded.push_str(r),
            None => folded.push(c),
        }
    }

    Cow::Owned(folded)
}

fn fold_char(c: char) -> Option<&'static str> {
    Some(match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Å' => "A",
        'ç' => "c",
        'Ç' => "C",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ñ' => "n",
        'Ñ' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => "O",
        'ù' | 'ú' | 'û' => "u",
        'Ù' | 'Ú' | 'Û' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        _ => return None,
    })
}

/// Whether a character may appear in field content under lax validation.
///
/// Printable ASCII is allowed, as is anything that folds to printable ASCII,
/// and the section sign.
pub fn is_printable(c: char) -> bool {
    match c {
        '§' => true,
        ' '..='~' => true,
        _ => fold_char(c).is_some(),
    }
}
