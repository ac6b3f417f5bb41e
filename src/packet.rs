//! Complete data packets: a header, data records and a trailer.

use std::io::{self, BufRead, Write};

use log::warn;
use thiserror::Error;

use crate::{
    avec::{self, Importer, Observer},
    config::{Config, ValidationMode},
    field::Field,
    key::TypeKey,
    record::{Record, RecordError},
    registry::{Registry, builtin},
    violation::{Violation, ViolationKind},
};

/// Kind of the header record (Vorsatz).
pub const HEADER: u16 = 1;
/// Kind of the trailer record (Nachsatz).
pub const TRAILER: u16 = 9999;

/// An error reading or writing a packet.
#[derive(Debug, Error)]
pub enum PacketError {
    #[error(transparent)]
    Import(#[from] avec::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// A data packet (Datenpaket).
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    header: Record,
    records: Vec<Record>,
    trailer: Record,
}

impl Packet {
    /// Create an empty packet with a fresh header and trailer.
    pub fn new(registry: &Registry) -> Self {
        let mut packet = Self {
            header: registry.resolve(TypeKey::new(HEADER)),
            records: vec![],
            trailer: registry.resolve(TypeKey::new(TRAILER)),
        };

        let (header, trailer) = (packet.header.clone(), packet.trailer.clone());
        packet.note_version(&header);
        packet.note_version(&trailer);
        packet
    }

    /// The header record (Vorsatz).
    pub fn header(&self) -> &Record {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Record {
        &mut self.header
    }

    /// The trailer record (Nachsatz).
    pub fn trailer(&self) -> &Record {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut Record {
        &mut self.trailer
    }

    /// Data records, in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of data lines, as counted by the trailer.
    pub fn line_count(&self) -> usize {
        self.records.iter().map(|r| r.lines().len()).sum()
    }

    /// Append a data record, noting its layout version in the header.
    pub fn push(&mut self, record: Record) {
        self.note_version(&record);
        self.records.push(record);
    }

    /// Set the insurer number (VU-Nummer) in every record.
    pub fn set_insurer(&mut self, number: &str) -> Result<(), RecordError> {
        for record in self.all_mut() {
            if record.field("VU-Nummer").is_ok() {
                record.set("VU-Nummer", number)?;
            }
        }
        Ok(())
    }

    /// Import a packet from a reader of lines.
    ///
    /// The first header and trailer records read are kept; a packet without
    /// one receives a fresh one.
    pub fn import(
        r: impl BufRead,
        registry: &Registry,
        config: Config,
        observer: Option<&mut dyn Observer>,
    ) -> Result<Self, PacketError> {
        let mut importer = Importer::new(r, registry).with_config(config);
        if let Some(observer) = observer {
            importer = importer.with_observer(observer);
        }

        let mut header = None;
        let mut trailer = None;
        let mut records = vec![];

        for record in importer {
            let record = record?;
            match record.kind() {
                HEADER if header.is_none() => header = Some(record),
                TRAILER if trailer.is_none() => trailer = Some(record),
                HEADER | TRAILER => warn!("Ignoring repeated record of kind {:04}.", record.kind()),
                _ => records.push(record),
            }
        }

        let header = header.unwrap_or_else(|| {
            warn!("Packet has no header record.");
            registry.resolve(TypeKey::new(HEADER)).with_config(config)
        });
        let trailer = trailer.unwrap_or_else(|| {
            warn!("Packet has no trailer record.");
            registry.resolve(TypeKey::new(TRAILER)).with_config(config)
        });

        Ok(Self {
            header,
            records,
            trailer,
        })
    }

    /// Write the packet, first updating the trailer's line count.
    pub fn export(&mut self, w: &mut impl Write) -> Result<(), PacketError> {
        if self.trailer.field(builtin::RECORD_COUNT).is_ok() {
            let count = self.line_count().to_string();
            self.trailer.set(builtin::RECORD_COUNT, &count)?;
        }

        avec::encode(
            core::iter::once(&self.header)
                .chain(&self.records)
                .chain(core::iter::once(&self.trailer)),
            w,
        )?;

        Ok(())
    }

    /// Validate every record, and the trailer's line count.
    pub fn validate(&self, mode: ValidationMode) -> Vec<Violation> {
        let mut violations: Vec<_> = core::iter::once(&self.header)
            .chain(&self.records)
            .chain(core::iter::once(&self.trailer))
            .flat_map(|r| r.validate(mode))
            .collect();

        if mode == ValidationMode::Off {
            return violations;
        }

        if let Ok(Ok(declared)) = self.trailer.field(builtin::RECORD_COUNT).map(Field::to_u64) {
            let actual = self.line_count() as u64;
            if declared != actual {
                violations.push(
                    Violation::new(ViolationKind::CountMismatch { declared, actual })
                        .in_record(self.trailer.key()),
                );
            }
        }

        violations
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        core::iter::once(&mut self.header)
            .chain(&mut self.records)
            .chain(core::iter::once(&mut self.trailer))
    }

    /// Record the layout version of a record's template in the header, if
    /// the header has a field for it.
    fn note_version(&mut self, record: &Record) {
        let Some(key) = record.template_key() else {
            return;
        };
        if record.version().is_empty() {
            return;
        }

        let name = match key.branch() {
            Some(branch) => format!("Version Satzart {:04} {branch:03}", key.kind()),
            None => format!("Version Satzart {:04}", key.kind()),
        };

        if self.header.field(&name).is_ok() {
            if let Err(err) = self.header.set(&name, record.version()) {
                warn!("Cannot note version of {key}: {err}");
            }
        }
    }
}
