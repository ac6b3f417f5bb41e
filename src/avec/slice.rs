//! Slice-based decoder implementation.

use crate::registry;

use super::{FromRecords, Importer, publish};

/// Import records from a data slice, publishing to a receiver.
///
/// Templates come from the process-wide registry. Reading a slice cannot
/// fail; lines too short to start a record are skipped. This method is also
/// re-exported as `gdv_records::avec::decode_slice`.
pub fn decode(data: &[u8], o: &mut impl FromRecords) {
    let mut importer = Importer::new(data, registry::global());

    // A slice never fails to read, so the loop ends with the data.
    while let Ok(Some(record)) = importer.next_record() {
        publish(&record, o);
    }
}
