//! Constraint violations collected by validation.

use core::fmt;

use thiserror::Error;

use crate::{field::ValidationError, key::TypeKey};

/// What a violation is about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    /// Field content breaks the rules of the field's type.
    #[error(transparent)]
    Content(#[from] ValidationError),
    /// A field starts before byte 1.
    #[error("Address {0} is below 1.")]
    AddressBelowOne(u16),
    /// A field ends after the line bound.
    #[error("End address {0} exceeds the line bound.")]
    EndAddressExceeded(u16),
    /// A line carries a different record kind than the first line.
    #[error("Line has kind {found:04}, record has kind {expected:04}.")]
    MixedKinds { expected: u16, found: u16 },
    /// Line sequence numbers are not contiguous.
    #[error("Expected line {expected}, found line {found}.")]
    SequenceGap { expected: u8, found: u8 },
    /// A trailer count disagrees with the content it counts.
    #[error("Declared count {declared}, actual count {actual}.")]
    CountMismatch { declared: u64, actual: u64 },
}

/// A single constraint violation, located as precisely as known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub key: Option<TypeKey>,
    pub line: Option<u8>,
    pub field: Option<String>,
    pub address: Option<u16>,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(kind: impl Into<ViolationKind>) -> Self {
        Self {
            key: None,
            line: None,
            field: None,
            address: None,
            kind: kind.into(),
        }
    }

    pub(crate) fn at_field(mut self, name: &str, address: u16) -> Self {
        self.field = Some(name.to_owned());
        self.address = Some(address);
        self
    }

    pub(crate) fn in_line(mut self, key: TypeKey, line: u8) -> Self {
        self.key.get_or_insert(key);
        self.line.get_or_insert(line);
        self
    }

    pub(crate) fn in_record(mut self, key: TypeKey) -> Self {
        self.key.get_or_insert(key);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(key) = &self.key {
            write!(f, "Satzart {key} ")?;
        }
        if let Some(line) = self.line {
            write!(f, "line {line} ")?;
        }
        if let (Some(field), Some(address)) = (&self.field, self.address) {
            write!(f, "field {field} ({address}) ")?;
        }
        write!(f, "- {}", self.kind)
    }
}
