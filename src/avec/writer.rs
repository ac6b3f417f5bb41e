//! Line writer.

use std::io::{self, Write};

use crate::record::Record;

/// Write records as lines of 256 bytes, each followed by a newline.
pub fn encode<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    w: &mut impl Write,
) -> io::Result<()> {
    for record in records {
        record.write(w)?;
    }
    w.flush()
}
