//! Logical records made of one or more lines.

use core::fmt;
use std::{io, sync::Arc};

use thiserror::Error;

use crate::{
    charset,
    config::{Config, ValidationMode},
    field::{Field, FieldError, FieldKind},
    key::TypeKey,
    line::{FieldNotFound, RecordLine},
    violation::{Violation, ViolationKind},
};

/// An error setting a record field.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    NotFound(#[from] FieldNotFound),
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// A stored field presented as several consecutive fields.
///
/// Storage keeps the single field; the parts are synthesized on read and
/// written back into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub field: Arc<str>,
    pub parts: Vec<Part>,
}

/// One presented part of a [`Split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: Arc<str>,
    /// Offset from the first byte of the stored field.
    pub offset: u16,
    pub length: u16,
    pub kind: FieldKind,
}

impl Split {
    pub fn new(field: impl Into<Arc<str>>) -> Self {
        Self {
            field: field.into(),
            parts: vec![],
        }
    }

    /// Append a part directly after the previous one.
    pub fn part(mut self, name: impl Into<Arc<str>>, kind: FieldKind, length: u16) -> Self {
        let offset = self.parts.iter().map(|p| p.length).sum();
        self.parts.push(Part {
            name: name.into(),
            offset,
            length,
            kind,
        });
        self
    }

    fn present(&self, stored: &Field) -> impl Iterator<Item = Field> {
        self.parts.iter().map(|part| {
            let start = (part.offset as usize).min(stored.as_bytes().len());
            let end = (start + part.length as usize).min(stored.as_bytes().len());

            let mut field = Field::new(
                part.name.clone(),
                part.kind,
                stored.address() + part.offset,
                part.length,
            )
            .with_config(stored.config());
            field.import(&stored.as_bytes()[start..end]);
            field
        })
    }
}

/// A logical record: lines sharing one type key.
#[derive(Debug, Clone)]
pub struct Record {
    key: TypeKey,
    template: Option<TypeKey>,
    version: Arc<str>,
    lines: Vec<RecordLine>,
    splits: Arc<[Split]>,
}

impl Record {
    pub(crate) fn new(
        key: TypeKey,
        template: Option<TypeKey>,
        version: Arc<str>,
        lines: Vec<RecordLine>,
        splits: Arc<[Split]>,
    ) -> Self {
        Self {
            key,
            template,
            version,
            lines,
            splits,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The coarse record kind (Satzart).
    pub fn kind(&self) -> u16 {
        self.key.kind()
    }

    /// The key of the registered layout this record was made from, or
    /// `None` for the generic layout.
    pub fn template_key(&self) -> Option<TypeKey> {
        self.template
    }

    pub fn is_generic(&self) -> bool {
        self.template.is_none()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn lines(&self) -> &[RecordLine] {
        &self.lines
    }

    /// The line with a sequence number.
    pub fn line(&self, seq: u8) -> Option<&RecordLine> {
        self.lines.iter().find(|l| l.seq() == seq)
    }

    pub fn line_mut(&mut self, seq: u8) -> Option<&mut RecordLine> {
        self.lines.iter_mut().find(|l| l.seq() == seq)
    }

    pub(crate) fn lines_mut(&mut self) -> &mut Vec<RecordLine> {
        &mut self.lines
    }

    pub(crate) fn set_key(&mut self, key: TypeKey) {
        self.key = key;
        for line in &mut self.lines {
            line.set_key(key);
        }
    }

    /// The first stored field with an identifier.
    pub fn field(&self, name: &str) -> Result<&Field, FieldNotFound> {
        self.lines
            .iter()
            .find_map(|l| l.field(name).ok())
            .ok_or_else(|| self.not_found(name))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field, FieldNotFound> {
        let key = self.key;
        self.lines
            .iter_mut()
            .find_map(|l| l.field_mut(name).ok())
            .ok_or(FieldNotFound {
                name: name.to_owned(),
                key,
            })
    }

    /// The content of a field, or of a presented part of a split field.
    pub fn get(&self, name: &str) -> Result<String, FieldNotFound> {
        if let Ok(field) = self.field(name) {
            return Ok(field.content().into_owned());
        }

        self.part(name)
            .map(|f| f.content().into_owned())
            .ok_or_else(|| self.not_found(name))
    }

    /// Set a field in every line holding it, or a presented part of a split
    /// field.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), RecordError> {
        let mut found = false;

        for line in &mut self.lines {
            if let Ok(field) = line.field_mut(name) {
                field.set(value)?;
                found = true;
            }
        }

        if found {
            return Ok(());
        }

        let (Some((split, part)), Some(mut presented)) = (self.split_of(name), self.part(name))
        else {
            return Err(self.not_found(name).into());
        };
        presented.set(value)?;

        let stored = self.field_mut(&split)?;
        let mut bytes = stored.as_bytes().to_vec();
        let start = (part.offset as usize).min(bytes.len());
        let end = (start + presented.len() as usize).min(bytes.len());
        bytes[start..end].copy_from_slice(&presented.as_bytes()[..end - start]);
        stored.import(&bytes);

        Ok(())
    }

    /// Every field in line and address order, with split fields presented
    /// as their parts.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![];

        for field in self.lines.iter().flat_map(RecordLine::fields) {
            match self.splits.iter().find(|s| *s.field == *field.name()) {
                Some(split) => fields.extend(split.present(field)),
                None => fields.push(field.clone()),
            }
        }

        fields
    }

    /// Check every line, and that lines share a kind and are numbered
    /// without gaps.
    pub fn validate(&self, mode: ValidationMode) -> Vec<Violation> {
        let mut violations: Vec<_> = self
            .lines
            .iter()
            .flat_map(|l| l.validate(mode))
            .collect();

        if mode == ValidationMode::Off {
            return violations;
        }

        if self.key != TypeKey::UNKNOWN {
            for line in &self.lines {
                let bytes = line.to_bytes();
                let found = charset::decode(&bytes[..4]).parse::<u16>().ok();

                if let Some(found) = found.filter(|&k| k != self.kind()) {
                    violations.push(
                        Violation::new(ViolationKind::MixedKinds {
                            expected: self.kind(),
                            found,
                        })
                        .in_line(self.key, line.seq()),
                    );
                }
            }
        }

        if let Some(first) = self.lines.first() {
            for (expected, line) in (first.seq()..).zip(&self.lines) {
                if line.seq() != expected {
                    violations.push(
                        Violation::new(ViolationKind::SequenceGap {
                            expected,
                            found: line.seq(),
                        })
                        .in_record(self.key),
                    );
                    break;
                }
            }
        }

        violations
    }

    pub fn is_valid(&self, mode: ValidationMode) -> bool {
        self.validate(mode).is_empty()
    }

    /// Write every line as 256 bytes followed by a newline.
    pub fn write(&self, w: &mut impl io::Write) -> io::Result<()> {
        for line in &self.lines {
            w.write_all(&line.to_bytes())?;
            w.write_all(b"\n")?;
        }
        Ok(())
    }

    /// A copy of this record whose fields apply another configuration.
    pub fn with_config(&self, config: Config) -> Self {
        Self {
            lines: self.lines.iter().map(|l| l.with_config(config)).collect(),
            ..self.clone()
        }
    }

    fn split_of(&self, name: &str) -> Option<(Arc<str>, Part)> {
        self.splits.iter().find_map(|s| {
            s.parts
                .iter()
                .find(|p| *p.name == *name)
                .map(|p| (s.field.clone(), p.clone()))
        })
    }

    fn part(&self, name: &str) -> Option<Field> {
        let (split, _) = self.split_of(name)?;
        let stored = self.field(&split).ok()?;

        self.splits
            .iter()
            .filter(|s| s.field == split)
            .flat_map(|s| s.present(stored))
            .find(|f| f.name() == name)
    }

    fn not_found(&self, name: &str) -> FieldNotFound {
        FieldNotFound {
            name: name.to_owned(),
            key: self.key,
        }
    }
}

/// Records are equal when their keys and line contents are.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.lines == other.lines
    }
}

impl Eq for Record {}

/// Each line decoded, one per row.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(&charset::decode(&line.to_bytes()))?;
        }
        Ok(())
    }
}
