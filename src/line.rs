//! Physical lines: non-overlapping fields ordered by address.

use thiserror::Error;

use crate::{
    config::{Config, ValidationMode},
    field::{Field, LINE_LENGTH},
    key::TypeKey,
    violation::Violation,
};

/// An error placing a field in a line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A field starts before byte 1.
    #[error("Field {name} starts at address {address}, below 1.")]
    AddressBelowOne { name: String, address: u16 },
    /// A field ends past the line bound.
    #[error("Field {name} ends at address {end}, past the line bound.")]
    EndAddressExceeded { name: String, end: u16 },
    /// A field of no width.
    #[error("Field {0} has no length.")]
    ZeroLength(String),
    /// A field shares bytes with one already placed.
    #[error("Field {name} overlaps field {existing}.")]
    Overlap { name: String, existing: String },
    /// A layout names an alignment other than left or right.
    #[error("Unknown alignment '{0}'.")]
    UnknownAlignment(String),
    /// A presented part reaches past the field it is split from.
    #[error("Part {part} does not fit in field {field}.")]
    PartOutOfBounds { part: String, field: String },
}

/// A lookup for a field the record does not have.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("No field {name} in Satzart {key}.")]
pub struct FieldNotFound {
    pub name: String,
    pub key: TypeKey,
}

/// One physical line of a record.
#[derive(Debug, Clone)]
pub struct RecordLine {
    key: TypeKey,
    seq: u8,
    fields: Vec<Field>,
}

impl RecordLine {
    /// Create an empty line.
    pub fn new(key: TypeKey, seq: u8) -> Self {
        Self {
            key,
            seq,
            fields: vec![],
        }
    }

    /// Create a line from fields known to be ordered and disjoint.
    pub(crate) fn from_sorted(key: TypeKey, seq: u8, fields: Vec<Field>) -> Self {
        Self { key, seq, fields }
    }

    /// Create a line from a layout, as a builder step.
    pub fn with_fields(
        mut self,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self, LayoutError> {
        for field in fields {
            self.add(field)?;
        }
        Ok(self)
    }

    /// The key of the owning record.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The 1-based position of this line within its record.
    pub fn seq(&self) -> u8 {
        self.seq
    }

    pub(crate) fn set_key(&mut self, key: TypeKey) {
        self.key = key;
    }

    /// Place a field.
    ///
    /// A field with the identifier of an existing one replaces it. Fields
    /// sharing any byte with another field are rejected.
    pub fn add(&mut self, field: Field) -> Result<(), LayoutError> {
        let name = || field.name().to_owned();

        if field.address() < 1 {
            Err(LayoutError::AddressBelowOne {
                name: name(),
                address: field.address(),
            })?;
        }
        if field.len() == 0 {
            Err(LayoutError::ZeroLength(name()))?;
        }
        if field.end_address() > LINE_LENGTH {
            Err(LayoutError::EndAddressExceeded {
                name: name(),
                end: field.end_address(),
            })?;
        }

        let clash = self.fields.iter().find(|f| {
            f.name() != field.name() && (f.address() == field.address() || f.overlaps(&field))
        });

        if let Some(existing) = clash {
            Err(LayoutError::Overlap {
                name: name(),
                existing: existing.name().to_owned(),
            })?;
        }

        self.fields.retain(|f| f.name() != field.name());

        let i = self
            .fields
            .partition_point(|f| f.address() < field.address());
        self.fields.insert(i, field);

        Ok(())
    }

    /// Remove a field, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Field> {
        let i = self.fields.iter().position(|f| f.name() == name)?;
        Some(self.fields.remove(i))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    /// Look up a field by identifier.
    pub fn field(&self, name: &str) -> Result<&Field, FieldNotFound> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| self.not_found(name))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field, FieldNotFound> {
        match self.fields.iter().position(|f| f.name() == name) {
            Some(i) => Ok(&mut self.fields[i]),
            None => Err(self.not_found(name)),
        }
    }

    /// Look up the field starting at a byte address.
    pub fn field_at(&self, address: u16) -> Option<&Field> {
        self.fields
            .binary_search_by_key(&address, Field::address)
            .ok()
            .map(|i| &self.fields[i])
    }

    /// Look up a field by position, counting from 0 in address order.
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Fields in ascending address order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Populate every field from the bytes of a physical line.
    ///
    /// Bytes are assigned by address without validation. Fields reaching
    /// past the end of `r` are blank-padded.
    pub fn import(&mut self, r: &[u8]) {
        for field in &mut self.fields {
            let start = (field.address() as usize - 1).min(r.len());
            let end = (field.end_address() as usize).min(r.len());
            field.import(&r[start..end]);
        }
    }

    /// Overwrite the bytes starting at an address, whichever fields hold them.
    pub fn write_bytes(&mut self, address: u16, value: &[u8]) {
        let mut bytes = self.to_bytes();
        let start = (address as usize).saturating_sub(1).min(bytes.len());
        let end = (start + value.len()).min(bytes.len());
        bytes[start..end].copy_from_slice(&value[..end - start]);
        self.import(&bytes);
    }

    /// The line as it is written: every field's content at its address,
    /// with blanks between.
    pub fn to_bytes(&self) -> [u8; LINE_LENGTH as usize] {
        let mut bytes = [b' '; LINE_LENGTH as usize];
        for field in &self.fields {
            let start = field.address() as usize - 1;
            bytes[start..start + field.len() as usize].copy_from_slice(field.as_bytes());
        }
        bytes
    }

    /// Check every field, and that no field passes the line bound.
    pub fn validate(&self, mode: ValidationMode) -> Vec<Violation> {
        self.fields
            .iter()
            .flat_map(|f| f.validate(mode))
            .map(|v| v.in_line(self.key, self.seq))
            .collect()
    }

    /// A copy of this line whose fields apply another configuration.
    pub fn with_config(&self, config: Config) -> Self {
        Self {
            key: self.key,
            seq: self.seq,
            fields: self.fields.iter().map(|f| f.with_config(config)).collect(),
        }
    }

    fn not_found(&self, name: &str) -> FieldNotFound {
        FieldNotFound {
            name: name.to_owned(),
            key: self.key,
        }
    }
}

/// Lines are equal when they hold equal fields in the same order.
impl PartialEq for RecordLine {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for RecordLine {}
