//! A decoder and encoder for the GDV fixed-width record interchange format.
//!
//! Lines of the format are 256 bytes wide. A record (Satz) spans one or more
//! lines, and its layout is selected by a type key spread over the line: the
//! record kind (Satzart) always comes first, while branch (Sparte) and
//! deeper discriminators are only meaningful once the earlier ones are known.
//!
//! Most users should begin with the [`avec`] module: [`avec::Importer`] reads
//! records from any buffered reader, and the derive macros extract records of
//! a known shape into plain structs. Layouts live in a
//! [`registry::Registry`], which can be extended at runtime, for example
//! from a [`schema::Schema`]. If finer control is needed, the discriminator
//! state machine is exposed in the [`sans`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).

pub mod avec;
pub mod charset;
pub mod config;
pub mod field;
pub mod key;
pub mod line;
pub mod packet;
pub mod record;
pub mod registry;
pub mod sans;
pub mod schema;
pub mod violation;

pub use config::{Config, ValidationMode};
pub use field::Field;
pub use key::TypeKey;
pub use record::Record;
pub use registry::Registry;
