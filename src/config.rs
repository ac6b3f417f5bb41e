//! Options affecting how field content is accepted and validated.

use core::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// How strictly field content is checked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// No content checks at all.
    Off,
    /// Reject structurally impossible content: control characters,
    /// non-digits in numeric fields, negative numbers.
    #[default]
    Lax,
    /// Additionally reject untrimmed text and blanks in numeric fields.
    Strict,
}

/// An unrecognised validation mode name.
#[derive(Debug, Error)]
#[error("Unknown validation mode '{0}' (expected off, lax or strict).")]
pub struct UnknownMode(pub String);

impl FromStr for ValidationMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" => Ok(Self::Off),
            "lax" | "on" | "true" => Ok(Self::Lax),
            "strict" => Ok(Self::Strict),
            _ => Err(UnknownMode(s.to_owned())),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Lax => "lax",
            Self::Strict => "strict",
        })
    }
}

/// Options recognised by fields, records and the importer.
///
/// Deserializes from kebab-case keys, with every key optional:
///
/// ```text
/// truncate-on-overflow = true
/// validation-mode = "strict"
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Cut oversized content to the field width instead of failing.
    pub truncate_on_overflow: bool,
    /// Content checks applied by `Field::set` and by validation.
    pub validation_mode: ValidationMode,
    /// Trim numeric input, so blanks are replaced by leading zeros.
    pub fill_blanks_in_numeric_fields: bool,
}

impl Config {
    /// The default configuration with strict validation.
    pub const STRICT: Config = Config {
        truncate_on_overflow: false,
        validation_mode: ValidationMode::Strict,
        fill_blanks_in_numeric_fields: false,
    };

    /// The default configuration with validation switched off.
    pub const OFF: Config = Config {
        truncate_on_overflow: false,
        validation_mode: ValidationMode::Off,
        fill_blanks_in_numeric_fields: false,
    };

    pub fn with_truncation(self, truncate_on_overflow: bool) -> Self {
        Self {
            truncate_on_overflow,
            ..self
        }
    }

    pub fn with_validation_mode(self, validation_mode: ValidationMode) -> Self {
        Self {
            validation_mode,
            ..self
        }
    }

    pub fn with_blank_filling(self, fill_blanks_in_numeric_fields: bool) -> Self {
        Self {
            fill_blanks_in_numeric_fields,
            ..self
        }
    }
}
