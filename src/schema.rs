//! Templates described by an external schema.
//!
//! A [`Schema`] maps field paths to [`FieldEntry`]s and deserializes from any
//! serde format:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "fields": {
//!     "1/Satzart": { "address": 1, "length": 4, "type": "numeric" },
//!     "1/Name1": { "address": 44, "length": 30, "type": "text" },
//!     "2/Kennung": { "address": 43, "length": 2, "type": "text", "align": "right" }
//!   }
//! }
//! ```
//!
//! The part of a path before `/` is the line sequence number; paths without
//! one belong to line 1.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    field::{Align, Field, FieldError, FieldKind},
    key::TypeKey,
    line::LayoutError,
    registry::{Registry, Template},
};

/// An error turning a schema into a template.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A path whose line part is not a sequence number.
    #[error("Invalid field path '{0}'.")]
    Path(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// A default value the field does not accept.
    #[error(transparent)]
    Default(#[from] FieldError),
}

/// Field types as named by schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    #[serde(alias = "alphanumeric", alias = "AlphaNumFeld")]
    Text,
    #[serde(alias = "NumFeld")]
    Numeric,
    #[serde(alias = "Betrag")]
    Amount,
    #[serde(alias = "Zeichen")]
    Char,
    #[serde(alias = "Datum")]
    Date,
}

/// The layout of one field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldEntry {
    /// Identifier; taken from the path when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub address: u16,
    pub length: u16,
    #[serde(rename = "type")]
    pub kind: SpecKind,
    #[serde(default)]
    pub align: Option<String>,
    #[serde(default)]
    pub scale: Option<u8>,
    /// Initial content.
    #[serde(default)]
    pub default: Option<String>,
}

impl FieldEntry {
    /// Create the described field.
    pub fn to_field(&self, name: &str) -> Result<Field, SchemaError> {
        let kind = match self.kind {
            SpecKind::Text => FieldKind::Text,
            SpecKind::Numeric => FieldKind::Numeric {
                scale: self.scale.unwrap_or(0),
            },
            SpecKind::Amount => FieldKind::Amount,
            SpecKind::Char => FieldKind::Char,
            SpecKind::Date => FieldKind::Date,
        };

        let name = self.name.as_deref().unwrap_or(name);
        let mut field = Field::new(name, kind, self.address, self.length);

        if let Some(align) = &self.align {
            field = field.with_align(parse_align(align)?);
        }
        if let Some(default) = &self.default {
            field.set(default)?;
        }

        Ok(field)
    }
}

fn parse_align(s: &str) -> Result<Align, LayoutError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "left" | "links" | "l" => Ok(Align::Left),
        "right" | "rechts" | "r" => Ok(Align::Right),
        _ => Err(LayoutError::UnknownAlignment(s.to_owned())),
    }
}

/// A record layout supplied from outside.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub version: String,
    pub fields: BTreeMap<String, FieldEntry>,
}

impl Schema {
    /// Build the described template.
    pub fn template(&self) -> Result<Template, SchemaError> {
        let mut template = Template::new(self.version.as_str());

        for (path, entry) in &self.fields {
            let (seq, name) = match path.split_once('/') {
                Some((seq, name)) => (
                    seq.trim()
                        .parse::<u8>()
                        .ok()
                        .filter(|s| *s > 0)
                        .ok_or_else(|| SchemaError::Path(path.clone()))?,
                    name,
                ),
                None => (1, path.as_str()),
            };

            template.line_entry(seq).add(entry.to_field(name)?)?;
        }

        Ok(template)
    }

    /// Build the described template and register it under a key.
    pub fn register(&self, registry: &Registry, key: TypeKey) -> Result<(), SchemaError> {
        registry.register(key, self.template()?);
        Ok(())
    }
}
