//! Content rules for each field type.
//!
//! Two entry points exist: [`verify`] checks a value handed to a setter, and
//! [`inspect`] checks content already stored in a field, where blank padding
//! introduced by the field's alignment is not held against it.

use thiserror::Error;

use crate::{charset, config::ValidationMode};

use super::{Align, FieldKind};

/// Content breaking the rules of a field type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A control or otherwise unprintable character.
    #[error("Character {0:?} is not allowed.")]
    NotPrintable(char),
    /// Non-digits where a number is required.
    #[error("'{0}' is not a number.")]
    NotNumeric(String),
    /// A negative number where only non-negative ones are allowed.
    #[error("'{0}' must not be negative.")]
    Negative(String),
    /// Text with blanks that strict validation would have to trim.
    #[error("'{0}' has leading or trailing blanks.")]
    Untrimmed(String),
    /// A blank inside, or instead of, a number.
    #[error("Number must be present and must not contain blanks.")]
    Blank,
    /// Not a date of the form `DDMMYYYY`.
    #[error("'{0}' is not a date of the form DDMMYYYY.")]
    InvalidDate(String),
    /// A character without a mapping in the line encoding.
    #[error("'{0}' cannot be represented in the line encoding.")]
    Unencodable(String),
}

/// Check a value about to be stored.
pub(crate) fn verify(kind: FieldKind, value: &str, mode: ValidationMode) -> Result<(), ValidationError> {
    match mode {
        ValidationMode::Off => Ok(()),
        ValidationMode::Lax => lax(kind, value),
        ValidationMode::Strict => {
            lax(kind, value)?;

            if kind.is_numeric() || kind == FieldKind::Date {
                if value.is_empty() || value.contains(' ') {
                    Err(ValidationError::Blank)?;
                }
            } else if value.trim() != value {
                Err(ValidationError::Untrimmed(value.to_owned()))?;
            }

            Ok(())
        }
    }
}

/// Check content already stored in a field.
pub(crate) fn inspect(
    kind: FieldKind,
    align: Align,
    stored: &str,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    match mode {
        ValidationMode::Off => Ok(()),
        ValidationMode::Lax => lax(kind, stored),
        ValidationMode::Strict => {
            lax(kind, stored)?;

            if kind.is_numeric() || kind == FieldKind::Date {
                if stored.contains(' ') {
                    Err(ValidationError::Blank)?;
                }
            } else {
                let core = match align {
                    Align::Left => stored.trim_end(),
                    Align::Right => stored.trim_start(),
                };

                if core.trim() != core {
                    Err(ValidationError::Untrimmed(stored.to_owned()))?;
                }
            }

            Ok(())
        }
    }
}

fn lax(kind: FieldKind, value: &str) -> Result<(), ValidationError> {
    if let Some(c) = value.chars().find(|c| !charset::is_printable(*c)) {
        Err(ValidationError::NotPrintable(c))?;
    }

    match kind {
        FieldKind::Numeric { .. } | FieldKind::Amount => number(value),
        FieldKind::Date => date(value),
        FieldKind::Text | FieldKind::Char => Ok(()),
    }
}

fn number(value: &str) -> Result<(), ValidationError> {
    let n = value.trim();

    if n.is_empty() || n.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(());
    }

    match n.strip_prefix('-') {
        Some(rest) if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) => {
            Err(ValidationError::Negative(value.to_owned()))
        }
        _ => Err(ValidationError::NotNumeric(value.to_owned())),
    }
}

fn date(value: &str) -> Result<(), ValidationError> {
    let d = value.trim();

    if d.is_empty() {
        return Ok(());
    }

    let invalid = || ValidationError::InvalidDate(value.to_owned());

    if d.len() != 8 || !d.bytes().all(|b| b.is_ascii_digit()) {
        Err(invalid())?;
    }

    // Day and month may be "00" when unknown.
    let day: u8 = d[0..2].parse().map_err(|_| invalid())?;
    let month: u8 = d[2..4].parse().map_err(|_| invalid())?;

    if day > 31 || month > 12 {
        Err(invalid())?;
    }

    Ok(())
}
