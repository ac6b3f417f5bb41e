//! Fixed-width, byte-addressed value cells.
//!
//! Every field has a layout header (identifier, 1-based byte address, length
//! and alignment) shared by all field types, and a [`FieldKind`] tag which
//! selects how content is validated, padded and truncated. Content is stored
//! as raw bytes in the line encoding, always exactly as long as the field.

use core::{cmp::Ordering, fmt, hash};
use std::{borrow::Cow, sync::Arc};

use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    charset,
    config::{Config, ValidationMode},
    violation::{Violation, ViolationKind},
};

pub mod check;

pub use check::ValidationError;

/// The highest byte address of a line.
pub const LINE_LENGTH: u16 = 256;

/// Where content shorter than a field is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
}

/// The type of a field, selecting its validation and formatting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Alphanumeric text, left-aligned and blank-padded by default.
    Text,
    /// Non-negative integer digits with an implied number of decimals,
    /// right-aligned and zero-padded.
    Numeric { scale: u8 },
    /// A currency amount: numeric with two implied decimals.
    Amount,
    /// A single character.
    Char,
    /// A date of the form `DDMMYYYY`.
    Date,
}

impl FieldKind {
    /// Number of implied decimal places.
    pub fn scale(self) -> u8 {
        match self {
            Self::Numeric { scale } => scale,
            Self::Amount => 2,
            _ => 0,
        }
    }

    /// Whether the field holds numbers and accepts numeric setters.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric { .. } | Self::Amount)
    }

    pub fn default_align(self) -> Align {
        match self {
            Self::Numeric { .. } | Self::Amount | Self::Date => Align::Right,
            Self::Text | Self::Char => Align::Left,
        }
    }

    /// The byte unused positions are filled with.
    fn fill(self) -> u8 {
        match self {
            Self::Numeric { .. } | Self::Amount | Self::Date => b'0',
            Self::Text | Self::Char => b' ',
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Numeric { .. } => "Numeric",
            Self::Amount => "Amount",
            Self::Char => "Char",
            Self::Date => "Date",
        }
    }
}

/// An error setting field content.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The value breaks the rules of the field type.
    #[error("Field {field}: value '{value}' is not allowed ({source})")]
    Validation {
        field: String,
        value: String,
        source: ValidationError,
    },
    /// The value is wider than the field.
    #[error(transparent)]
    Overflow(#[from] OverflowError),
    /// A numeric setter was used on a field not holding numbers.
    #[error("Field {0} does not hold numbers.")]
    NotNumeric(String),
}

/// Content wider than its field, with truncation switched off.
#[derive(Debug, Error)]
#[error("Field {field}: '{value}' is longer than {length} bytes.")]
pub struct OverflowError {
    pub field: String,
    pub value: String,
    pub length: u16,
}

/// A single fixed-width value cell.
#[derive(Clone)]
pub struct Field {
    name: Arc<str>,
    address: u16,
    kind: FieldKind,
    align: Align,
    content: Box<[u8]>,
    config: Config,
}

impl Field {
    /// Create a field holding its default (blank or zero) content.
    pub fn new(name: impl Into<Arc<str>>, kind: FieldKind, address: u16, length: u16) -> Self {
        Self {
            name: name.into(),
            address,
            kind,
            align: kind.default_align(),
            content: vec![kind.fill(); length as usize].into_boxed_slice(),
            config: Config::default(),
        }
    }

    pub fn text(name: impl Into<Arc<str>>, address: u16, length: u16) -> Self {
        Self::new(name, FieldKind::Text, address, length)
    }

    pub fn numeric(name: impl Into<Arc<str>>, address: u16, length: u16) -> Self {
        Self::new(name, FieldKind::Numeric { scale: 0 }, address, length)
    }

    pub fn amount(name: impl Into<Arc<str>>, address: u16, length: u16) -> Self {
        Self::new(name, FieldKind::Amount, address, length)
    }

    pub fn char(name: impl Into<Arc<str>>, address: u16) -> Self {
        Self::new(name, FieldKind::Char, address, 1)
    }

    pub fn date(name: impl Into<Arc<str>>, address: u16) -> Self {
        Self::new(name, FieldKind::Date, address, 8)
    }

    /// Change the alignment. Content is kept as is.
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Change the number of implied decimals of a numeric field.
    ///
    /// Has no effect on other field types.
    pub fn with_scale(mut self, scale: u8) -> Self {
        if let FieldKind::Numeric { .. } = self.kind {
            self.kind = FieldKind::Numeric { scale };
        }
        self
    }

    /// Set initial content, as a builder step.
    pub fn with_content(mut self, value: &str) -> Result<Self, FieldError> {
        self.set(value)?;
        Ok(self)
    }

    /// A copy of this field which applies another configuration.
    pub fn with_config(&self, config: Config) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// First byte, counting from 1.
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Length in bytes.
    pub fn len(&self) -> u16 {
        self.content.len() as u16
    }

    /// Last byte, counting from 1.
    pub fn end_address(&self) -> u16 {
        self.address.saturating_add(self.len()).saturating_sub(1)
    }

    /// Whether two fields at different addresses share any bytes.
    ///
    /// A field never overlaps one starting at the same address.
    pub fn overlaps(&self, other: &Field) -> bool {
        match self.address.cmp(&other.address) {
            Ordering::Equal => false,
            Ordering::Less => self.end_address() >= other.address,
            Ordering::Greater => other.end_address() >= self.address,
        }
    }

    /// The content, decoded. Always as many characters as the field is long.
    pub fn content(&self) -> Cow<'_, str> {
        charset::decode(&self.content)
    }

    /// The content in the line encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Whether the field holds only blanks (or, for right-aligned numbers
    /// and dates, only blanks and zeros).
    pub fn is_blank(&self) -> bool {
        let zero_is_blank = self.align == Align::Right && self.kind.fill() == b'0';

        self.content
            .iter()
            .all(|&b| b == b' ' || (zero_is_blank && b == b'0'))
    }

    /// Whether a value other than the initial one is set.
    pub fn has_value(&self) -> bool {
        !self.is_blank()
    }

    /// Replace the content with a value, after validating it according to
    /// the field's configuration.
    ///
    /// Values wider than the field fail with [`FieldError::Overflow`] unless
    /// truncation is configured: numbers then lose leading zeros and
    /// saturate to all nines, other content is cut on the right.
    pub fn set(&mut self, value: &str) -> Result<(), FieldError> {
        let value = if self.kind.is_numeric() && self.config.fill_blanks_in_numeric_fields {
            value.trim()
        } else {
            value
        };

        check::verify(self.kind, value, self.config.validation_mode)
            .map_err(|source| self.invalid(value, source))?;

        let bytes = charset::encode(value)
            .ok_or_else(|| self.invalid(value, ValidationError::Unencodable(value.to_owned())))?;

        if bytes.len() > self.content.len() {
            if !self.config.truncate_on_overflow {
                Err(OverflowError {
                    field: self.name.to_string(),
                    value: value.to_owned(),
                    length: self.len(),
                })?;
            }

            let truncated = self.truncate(&bytes);
            self.place(&truncated);
        } else {
            self.place(&bytes);
        }

        Ok(())
    }

    /// Set a single character.
    pub fn set_char(&mut self, c: char) -> Result<(), FieldError> {
        let mut buf = [0; 4];
        self.set(c.encode_utf8(&mut buf))
    }

    /// Set a whole number. Fields with implied decimals store
    /// `n * 10^scale`; amounts therefore store cents.
    pub fn set_number(&mut self, n: i64) -> Result<(), FieldError> {
        if !self.kind.is_numeric() {
            Err(FieldError::NotNumeric(self.name.to_string()))?;
        }

        if n < 0 {
            let value = n.to_string();
            Err(self.invalid(&value, ValidationError::Negative(value.clone())))?;
        }

        let mut digits = n.to_string();
        if n != 0 {
            digits.extend(core::iter::repeat_n('0', self.kind.scale() as usize));
        }

        self.set(&digits)
    }

    /// Set a decimal number, rounded to the field's implied decimals.
    pub fn set_decimal(&mut self, x: f64) -> Result<(), FieldError> {
        if !self.kind.is_numeric() {
            Err(FieldError::NotNumeric(self.name.to_string()))?;
        }

        let value = x.to_string();

        if !x.is_finite() {
            Err(self.invalid(&value, ValidationError::NotNumeric(value.clone())))?;
        }
        if x < 0.0 {
            Err(self.invalid(&value, ValidationError::Negative(value.clone())))?;
        }

        let scaled = (x * 10f64.powi(self.kind.scale() as i32)).round();
        self.set(&format!("{scaled:.0}"))
    }

    /// Replace the content with raw bytes, bypassing validation.
    ///
    /// Used when importing: short input is blank-padded on the right, long
    /// input is cut to the field width. Validation is left to
    /// [`Field::validate`].
    pub fn import(&mut self, r: &[u8]) {
        let n = r.len().min(self.content.len());
        self.content[..n].copy_from_slice(&r[..n]);
        self.content[n..].fill(b' ');
    }

    /// Restore the default (blank or zero) content.
    pub fn reset(&mut self) {
        self.content.fill(self.kind.fill());
    }

    /// The content as an integer, ignoring implied decimals.
    ///
    /// Blank content reads as zero.
    pub fn to_u64(&self) -> Result<u64, FieldError> {
        let content = self.content();
        let digits = content.trim();

        if digits.is_empty() {
            return Ok(0);
        }

        digits
            .parse()
            .map_err(|_| self.invalid(&content, ValidationError::NotNumeric(digits.to_owned())))
    }

    /// The content as a number, respecting implied decimals.
    pub fn to_f64(&self) -> Result<f64, FieldError> {
        Ok(self.to_u64()? as f64 / 10f64.powi(self.kind.scale() as i32))
    }

    /// Check layout and content against a validation mode.
    pub fn validate(&self, mode: ValidationMode) -> Vec<Violation> {
        let mut violations = vec![];

        if self.address < 1 {
            violations.push(ViolationKind::AddressBelowOne(self.address));
        }
        if self.end_address() > LINE_LENGTH {
            violations.push(ViolationKind::EndAddressExceeded(self.end_address()));
        }
        if let Err(err) = check::inspect(self.kind, self.align, &self.content(), mode) {
            violations.push(err.into());
        }

        violations
            .into_iter()
            .map(|kind| Violation::new(kind).at_field(&self.name, self.address))
            .collect()
    }

    /// Whether the field passes validation under its own configuration.
    pub fn is_valid(&self) -> bool {
        self.validate(self.config.validation_mode).is_empty()
    }

    fn place(&mut self, r: &[u8]) {
        self.reset();

        let start = match self.align {
            Align::Left => 0,
            Align::Right => self.content.len() - r.len(),
        };

        self.content[start..start + r.len()].copy_from_slice(r);
    }

    fn truncate<'a>(&self, r: &'a [u8]) -> Cow<'a, [u8]> {
        let n = self.content.len();

        if !self.kind.is_numeric() {
            return Cow::Borrowed(&r[..n]);
        }

        let significant = match r.iter().position(|&b| b != b'0') {
            Some(i) => &r[i..],
            None => &r[r.len() - 1..],
        };

        if significant.len() <= n {
            Cow::Borrowed(significant)
        } else {
            info!("Field {} saturates at {} digits.", self.name, n);
            Cow::Owned(vec![b'9'; n])
        }
    }

    fn invalid(&self, value: &str, source: ValidationError) -> FieldError {
        FieldError::Validation {
            field: self.name.to_string(),
            value: value.to_owned(),
            source,
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.name == other.name && self.content == other.content
    }
}

impl Eq for Field {}

impl hash::Hash for Field {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.name.hash(state);
        self.content.hash(state);
    }
}

/// Fields order by address first.
impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address
            .cmp(&other.address)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.content.cmp(&other.content))
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}-{}): \"{}\"",
            self.kind.name(),
            self.name,
            self.address,
            self.end_address(),
            self.content()
        )
    }
}
