//! Composite record type keys.

use core::{fmt, str::FromStr};

use thiserror::Error;

/// A record type key: kind, then optionally branch, sub-branch and line
/// sequence, each only meaningful when the previous one is present.
///
/// The text form is `KKKK[.BBB[.S[.N]]]`, for example `0220.010.13.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    kind: u16,
    branch: Option<u16>,
    sub_branch: Option<u16>,
    sequence: Option<u8>,
}

/// An error parsing a type key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// No kind given.
    #[error("Empty type key.")]
    Empty,
    /// A part is not a number, or out of range.
    #[error("Invalid part '{0}' in type key.")]
    InvalidPart(String),
    /// More than four parts.
    #[error("Type key '{0}' has too many parts.")]
    TooManyParts(String),
}

impl TypeKey {
    /// The key used for content of no recognisable kind.
    pub const UNKNOWN: TypeKey = TypeKey::new(0);

    pub const fn new(kind: u16) -> Self {
        Self {
            kind,
            branch: None,
            sub_branch: None,
            sequence: None,
        }
    }

    pub const fn with_branch(self, branch: u16) -> Self {
        Self {
            branch: Some(branch),
            ..self
        }
    }

    /// Add a sub-branch. Ignored unless a branch is present.
    pub const fn with_sub_branch(self, sub_branch: u16) -> Self {
        if self.branch.is_none() {
            return self;
        }

        Self {
            sub_branch: Some(sub_branch),
            ..self
        }
    }

    /// Add a line sequence. Ignored unless a sub-branch is present.
    pub const fn with_sequence(self, sequence: u8) -> Self {
        if self.sub_branch.is_none() {
            return self;
        }

        Self {
            sequence: Some(sequence),
            ..self
        }
    }

    pub fn kind(&self) -> u16 {
        self.kind
    }

    pub fn branch(&self) -> Option<u16> {
        self.branch
    }

    pub fn sub_branch(&self) -> Option<u16> {
        self.sub_branch
    }

    pub fn sequence(&self) -> Option<u8> {
        self.sequence
    }

    pub fn without_sequence(self) -> Self {
        Self {
            sequence: None,
            ..self
        }
    }

    /// Whether two keys agree on everything but the line sequence.
    pub fn same_record(&self, other: &TypeKey) -> bool {
        self.without_sequence() == other.without_sequence()
    }

    /// Number of discriminators present, from 1 (kind only) to 4.
    pub fn depth(&self) -> usize {
        1 + self.branch.is_some() as usize
            + self.sub_branch.is_some() as usize
            + self.sequence.is_some() as usize
    }

    /// The key without its most specific discriminator, or `None` for a key
    /// of kind only.
    pub fn parent(&self) -> Option<TypeKey> {
        let mut parent = *self;

        if parent.sequence.take().is_some()
            || parent.sub_branch.take().is_some()
            || parent.branch.take().is_some()
        {
            Some(parent)
        } else {
            None
        }
    }

    /// This key followed by each of its ancestors, most specific first.
    pub fn relaxations(&self) -> impl Iterator<Item = TypeKey> {
        core::iter::successors(Some(*self), TypeKey::parent)
    }

    /// Whether `self` is `other`, or a more specific key below it.
    pub fn is_within(&self, other: &TypeKey) -> bool {
        self.relaxations().any(|k| k == *other)
    }
}

impl Default for TypeKey {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl From<u16> for TypeKey {
    fn from(kind: u16) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.kind)?;
        if let Some(branch) = self.branch {
            write!(f, ".{branch:03}")?;
        }
        if let Some(sub_branch) = self.sub_branch {
            write!(f, ".{sub_branch}")?;
        }
        if let Some(sequence) = self.sequence {
            write!(f, ".{sequence}")?;
        }
        Ok(())
    }
}

impl FromStr for TypeKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            Err(KeyError::Empty)?;
        }

        let mut parts = s.split('.');
        let mut next = || -> Result<Option<u16>, KeyError> {
            parts
                .next()
                .map(|p| p.parse().map_err(|_| KeyError::InvalidPart(p.to_owned())))
                .transpose()
        };

        let Some(kind) = next()? else {
            return Err(KeyError::Empty);
        };
        let mut key = TypeKey::new(kind);

        if let Some(branch) = next()? {
            key = key.with_branch(branch);
        }
        if let Some(sub_branch) = next()? {
            key = key.with_sub_branch(sub_branch);
        }
        if let Some(sequence) = next()? {
            let sequence =
                u8::try_from(sequence).map_err(|_| KeyError::InvalidPart(sequence.to_string()))?;
            key = key.with_sequence(sequence);
        }
        if next()?.is_some() {
            Err(KeyError::TooManyParts(s.to_owned()))?;
        }

        Ok(key)
    }
}
