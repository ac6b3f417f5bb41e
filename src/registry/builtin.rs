//! Compiled layouts registered by [`Registry::with_builtins`].
//!
//! [`Registry::with_builtins`]: super::Registry::with_builtins

use std::{collections::HashMap, sync::Arc};

use log::error;
use thiserror::Error;

use crate::{
    field::FieldKind,
    key::{KeyError, TypeKey},
    line::LayoutError,
    record::Split,
    sans::rules,
};

use super::Template;

/// Field identifier of the header's creation period.
pub const CREATION_PERIOD: &str = "Erstellungs-Datum Zeitraum vom Zeitraum bis";
/// First half of [`CREATION_PERIOD`].
pub const PERIOD_FROM: &str = "Erstellungsdatum Zeitraum vom";
/// Second half of [`CREATION_PERIOD`].
pub const PERIOD_TO: &str = "Erstellungsdatum Zeitraum bis";
/// Field identifier of the trailer's line count.
pub const RECORD_COUNT: &str = "Anzahl der Saetze";

/// `(identifier, type, address, length)`
type Row = (&'static str, FieldKind, u16, u16);

const A: FieldKind = FieldKind::Text;
const N: FieldKind = FieldKind::Numeric { scale: 0 };
const B: FieldKind = FieldKind::Amount;
const D: FieldKind = FieldKind::Date;

struct Table {
    key: &'static str,
    version: &'static str,
    lines: &'static [(u8, &'static [Row])],
    splits: &'static [(&'static str, &'static [(&'static str, FieldKind, u16)])],
}

/// Leading fields of every line of a kind with a branch.
const PREFIX: &[Row] = &[
    ("Satzart", N, 1, 4),
    ("VU-Nummer", A, 5, 5),
    ("Buendelungskennzeichen", A, 10, 1),
    ("Sparte", N, 11, 3),
    ("Versicherungsschein-Nummer", A, 14, 17),
    ("Folgenummer", N, 31, 2),
    ("Geschaeftsstelle/Vermittler", A, 33, 10),
];

const SEQUENCE: Row = ("Satznummer", N, 256, 1);

const LIFE: [Row; 3] = [
    ("Versicherte Person", A, 43, 17),
    ("Wagnisart", N, 60, 1),
    ("Lfd. Nummer zur Wagnisart", N, 61, 6),
];

static TABLES: &[Table] = &[
    Table {
        key: "0001",
        version: "2.4",
        lines: &[(
            1,
            &[
                ("Satzart", N, 1, 4),
                ("VU-Nummer", A, 5, 5),
                ("Absender", A, 10, 30),
                ("Adressat", A, 40, 30),
                (CREATION_PERIOD, A, 70, 16),
                ("Geschaeftsstelle/Vermittler", A, 86, 10),
                ("Version Satzart 0001", A, 96, 3),
                ("Version Satzart 0100", A, 99, 3),
                ("Version Satzart 0200", A, 102, 3),
                ("Version Satzart 0210 030", A, 105, 3),
                ("Version Satzart 0220 010", A, 108, 3),
                ("Version Satzart 0220 020", A, 111, 3),
                ("Version Satzart 0220 580", A, 114, 3),
                ("Version Satzart 0342", A, 117, 3),
                ("Version Satzart 9999", A, 120, 3),
                ("Leerstellen", A, 123, 133),
                SEQUENCE,
            ],
        )],
        splits: &[(CREATION_PERIOD, &[(PERIOD_FROM, D, 8), (PERIOD_TO, D, 8)])],
    },
    Table {
        key: "0100",
        version: "2.4",
        lines: &[
            (
                1,
                &[
                    ("Anredeschluessel", A, 43, 1),
                    ("Name1", A, 44, 30),
                    ("Name2", A, 74, 30),
                    ("Name3", A, 104, 30),
                    ("Titel", A, 134, 20),
                    ("Laenderkennzeichen", A, 154, 3),
                    ("Postleitzahl", A, 157, 6),
                    ("Ort", A, 163, 25),
                    ("Strasse", A, 188, 30),
                    ("Postfach", A, 218, 6),
                    ("Geburtsdatum", D, 224, 8),
                    ("Staatsangehoerigkeit", A, 232, 3),
                    ("Adresskennzeichen", N, 235, 2),
                    ("Aktenzeichen Sicherungsglaeubiger", A, 237, 17),
                    ("Leerstellen", A, 254, 2),
                    SEQUENCE,
                ],
            ),
            (
                2,
                &[
                    ("Kommunikationstyp 1", N, 43, 2),
                    ("Kommunikationsnummer 1", A, 45, 60),
                    ("Kommunikationstyp 2", N, 105, 2),
                    ("Kommunikationsnummer 2", A, 107, 60),
                    ("Kommunikationstyp 3", N, 167, 2),
                    ("Kommunikationsnummer 3", A, 169, 60),
                    ("Leerstellen", A, 229, 27),
                    SEQUENCE,
                ],
            ),
        ],
        splits: &[],
    },
    Table {
        key: "0200",
        version: "2.3",
        lines: &[(
            1,
            &[
                ("Vertragsstatus", A, 43, 1),
                ("Beginn", D, 44, 8),
                ("Ablauf", D, 52, 8),
                ("Hauptfaelligkeit", D, 60, 8),
                ("Zahlungsweise", A, 68, 1),
                ("Gesamtbeitrag", B, 69, 12),
                ("Waehrungsschluessel", A, 81, 3),
                ("Leerstellen", A, 84, 172),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "0210.030",
        version: "2.1",
        lines: &[(
            1,
            &[
                ("Vertragsstatus", A, 43, 1),
                ("Beginn", D, 44, 8),
                ("Ablauf", D, 52, 8),
                ("Beitrag", B, 60, 12),
                ("Leerstellen", A, 72, 184),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "0220.010.0",
        version: "2.2",
        lines: &[(
            1,
            &[
                LIFE[0],
                LIFE[1],
                LIFE[2],
                ("Leerstellen", A, 67, 189),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "0220.010.13.1",
        version: "2.2",
        lines: &[
            (
                1,
                &[
                    LIFE[0],
                    LIFE[1],
                    LIFE[2],
                    ("Versicherungssumme", B, 67, 14),
                    ("Beginn", D, 81, 8),
                    ("Ablauf", D, 89, 8),
                    ("Leerstellen", A, 97, 159),
                    SEQUENCE,
                ],
            ),
            (
                2,
                &[
                    LIFE[0],
                    LIFE[1],
                    LIFE[2],
                    ("Todesfallleistung", B, 67, 14),
                    ("Erlebensfallleistung", B, 81, 14),
                    ("Leerstellen", A, 95, 161),
                    SEQUENCE,
                ],
            ),
        ],
        splits: &[],
    },
    Table {
        key: "0220.010.13.6",
        version: "2.2",
        lines: &[(
            6,
            &[
                LIFE[0],
                LIFE[1],
                LIFE[2],
                ("Bezugsberechtigter", A, 67, 30),
                ("Anteil", FieldKind::Numeric { scale: 2 }, 97, 5),
                ("Leerstellen", A, 102, 154),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "0220.020.1",
        version: "1.3",
        lines: &[(
            1,
            &[
                ("Lfd. Nummer der versicherten Person", N, 43, 5),
                ("Krankenfolgenummer", N, 48, 1),
                ("Name der versicherten Person", A, 49, 30),
                ("Geburtsdatum", D, 79, 8),
                ("Leerstellen", A, 87, 169),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "0220.580.1",
        version: "1.2",
        lines: &[(
            1,
            &[
                ("Kennzeichen", A, 43, 1),
                ("Bausparart", N, 44, 1),
                ("Bausparsumme", B, 45, 14),
                ("Abschlussdatum", D, 59, 8),
                ("Leerstellen", A, 67, 189),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "0220.580.2",
        version: "1.2",
        lines: &[(
            1,
            &[
                ("Kennzeichen", A, 43, 1),
                ("Bausparart", N, 44, 1),
                ("Sparbeitrag", B, 45, 12),
                ("Leerstellen", A, 57, 199),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "0342",
        version: "1.1",
        lines: &[(
            1,
            &[
                ("Lfd. Nummer", N, 43, 3),
                ("Dokumenttyp", A, 46, 2),
                ("Dokumentbeschreibung", A, 48, 100),
                ("Leerstellen", A, 148, 108),
                SEQUENCE,
            ],
        )],
        splits: &[],
    },
    Table {
        key: "9999",
        version: "1.1",
        lines: &[(
            1,
            &[
                ("Satzart", N, 1, 4),
                ("VU-Nummer", A, 5, 5),
                (RECORD_COUNT, N, 10, 10),
                ("Geschaeftsstelle/Vermittler", A, 20, 10),
                ("Gesamtbeitrag", B, 30, 15),
                ("Gesamtbeitrag-Brutto", B, 45, 15),
                ("Gesamtprovisions-Betrag", B, 60, 15),
                ("Versicherungsleistungen", B, 75, 15),
                ("Schadenbearbeitungskosten", B, 90, 15),
                ("Leerstellen", A, 105, 152),
            ],
        )],
        splits: &[],
    },
];

#[derive(Debug, Error)]
enum TableError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl Table {
    fn build(&self) -> Result<(TypeKey, Template), TableError> {
        let key: TypeKey = self.key.parse()?;
        let prefix = if rules::has_branch(key.kind()) {
            PREFIX
        } else {
            &[]
        };

        let rows = self.lines.iter().flat_map(|(seq, rows)| {
            prefix
                .iter()
                .chain(rows.iter())
                .map(|&(name, kind, address, length)| (*seq, name, kind, address, length))
        });

        let mut template = Template::from_rows(self.version, rows)?;

        for (field, parts) in self.splits {
            let split = parts
                .iter()
                .fold(Split::new(*field), |s, &(name, kind, length)| {
                    s.part(name, kind, length)
                });
            template = template.with_split(split)?;
        }

        Ok((key, template))
    }
}

/// The built-in templates.
pub fn templates() -> HashMap<TypeKey, Arc<Template>> {
    TABLES
        .iter()
        .filter_map(|table| match table.build() {
            Ok((key, template)) => Some((key, Arc::new(template))),
            Err(err) => {
                error!("Built-in layout {} is broken: {err}", table.key);
                None
            }
        })
        .collect()
}

/// Keys of the built-in templates, in table order.
pub fn keys() -> impl Iterator<Item = TypeKey> {
    TABLES.iter().filter_map(|t| t.key.parse().ok())
}
