//! Convenience interfaces for common import and export patterns.
//!
//! [`Importer`] reads records one at a time, reporting each to an
//! [`Observer`]. The functions in this module are suited to importing
//! records from files and data slices, publishing to the [`FromRecords`] and
//! [`FromRecord`] traits.
//!
//! In many cases (when records are of a known shape), these traits can be
//! derived. See the [`FromRecords`](macro@FromRecords) and
//! [`FromRecord`](macro@FromRecord) macros for details.

use crate::{field::Field, key::TypeKey, record::Record};

pub mod import;
pub mod reader;
pub mod slice;
pub mod validator;
pub mod writer;

pub use import::{Error, Importer, Observer, Report, StreamError};
pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;
pub use validator::Validator;
pub use writer::encode;

/// Derive [`FromRecords`] for a struct holding a collection of records.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// To collect a single record, add the `record("K")` attribute to an
/// `Option<T>` struct field, where `K` is a type key such as `"0100"` or
/// `"0220.010.13"` and `T` is a type implementing [`FromRecord`] and
/// [`Default`]. A record is collected by the field with the most specific
/// key it lies within. Additional records for the same field overwrite
/// earlier ones. To collect multiple records, apply the attribute to a
/// `Vec<T>` instead.
///
/// ```
/// #[derive(Debug, Default, FromRecords)]
/// struct Contracts {
///     #[record("0001")]
///     header: Option<Header>,
///     #[record("0100")]
///     addresses: Vec<Address>,
///     #[record("0220.010")]
///     life: Vec<Life>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use gdv_records_derive::FromRecords;

/// Produce record receivers for a stream of records.
///
/// See the [`FromRecords`](macro@FromRecords) derive macro for an automatic
/// implementation of this trait.
pub trait FromRecords {
    /// Retrieve a receiver for a record, if one exists.
    fn add_record(&mut self, key: &TypeKey) -> Option<&mut dyn FromRecord>;
}

/// Derive [`FromRecord`] for a struct representing a single record.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a single value, add the `field("Name")` attribute to an
/// `Option<T>` struct field, where `Name` is the field identifier and `T`
/// implements [`FieldValue`]. Blank fields are skipped.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Address {
///     #[field("Name1")]
///     name: Option<String>,
///     #[field("Postleitzahl")]
///     postcode: Option<String>,
///     #[field("Adresskennzeichen")]
///     kind: Option<u8>,
/// }
/// ```
///
/// To receive the field itself, supply a handler closure. Since the field
/// type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Address {
///     #[field("Ort", |v, f: &Field| v.push(f.content().trim().to_owned()))]
///     places: Vec<String>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use gdv_records_derive::FromRecord;

/// Receive the fields of a record.
///
/// Fields arrive in line and address order. Split fields arrive as their
/// presented parts.
///
/// See the [`FromRecord`](macro@FromRecord) derive macro for an automatic
/// implementation of this trait.
pub trait FromRecord {
    /// Add a field to the record.
    fn add_field(&mut self, field: &Field);
}

/// Conversion of field content to a Rust value.
pub trait FieldValue: Sized {
    /// Convert a field, or `None` if it is blank or does not convert.
    fn from_field(field: &Field) -> Option<Self>;
}

impl FieldValue for String {
    fn from_field(field: &Field) -> Option<Self> {
        let content = field.content();
        let trimmed = content.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}

impl FieldValue for char {
    fn from_field(field: &Field) -> Option<Self> {
        field.content().chars().find(|c| *c != ' ')
    }
}

macro_rules! unsigned {
    ($($t:ty),*) => {$(
        impl FieldValue for $t {
            fn from_field(field: &Field) -> Option<Self> {
                if field.content().trim().is_empty() {
                    return None;
                }
                field.to_u64().ok().and_then(|n| n.try_into().ok())
            }
        }
    )*};
}

unsigned!(u8, u16, u32, u64);

impl FieldValue for f64 {
    fn from_field(field: &Field) -> Option<Self> {
        if field.content().trim().is_empty() {
            return None;
        }
        field.to_f64().ok()
    }
}

/// Publish every field of a record to a receiver.
pub(crate) fn publish(record: &Record, o: &mut impl FromRecords) {
    let Some(o) = o.add_record(&record.key()) else {
        return;
    };

    for field in record.fields() {
        o.add_field(&field);
    }
}
