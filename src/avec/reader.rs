//! Reader-based decoder implementation.

use std::io::{BufReader, Read};

use crate::registry::{self, Registry};

use super::{FromRecords, Importer, import::Error, publish};

/// Import records from a reader, publishing to a receiver.
///
/// Templates come from the process-wide registry. This method is also
/// re-exported as `gdv_records::avec::decode_reader`.
pub fn decode(r: &mut impl Read, o: &mut impl FromRecords) -> Result<(), Error> {
    decode_with(r, registry::global(), o)
}

/// Import records from a reader with the templates of a registry,
/// publishing to a receiver.
pub fn decode_with(
    r: &mut impl Read,
    registry: &Registry,
    o: &mut impl FromRecords,
) -> Result<(), Error> {
    for record in Importer::new(BufReader::new(r), registry) {
        publish(&record?, o);
    }

    Ok(())
}
