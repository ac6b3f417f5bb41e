use gdv_records::{
    TypeKey, ValidationMode,
    field::Field,
    line::{FieldNotFound, LayoutError, RecordLine},
};

fn address_line() -> RecordLine {
    RecordLine::new(TypeKey::new(100), 1)
        .with_fields([
            Field::text("Name1", 44, 30),
            Field::numeric("Satzart", 1, 4),
            Field::text("Ort", 163, 25),
            Field::numeric("Satznummer", 256, 1),
        ])
        .unwrap()
}

#[test]
fn fields_are_ordered_by_address() {
    let line = address_line();

    let names: Vec<_> = line.fields().iter().map(Field::name).collect();
    assert_eq!(names, ["Satzart", "Name1", "Ort", "Satznummer"]);
    assert_eq!(line.get(1).map(Field::name), Some("Name1"));
    assert_eq!(line.field_at(163).map(Field::name), Some("Ort"));
    assert!(line.field_at(164).is_none());
    assert_eq!(line.len(), 4);
}

#[test]
fn overlapping_fields_are_rejected() {
    let mut line = address_line();

    let err = line.add(Field::text("Name2", 70, 10)).unwrap_err();
    assert_eq!(
        err,
        LayoutError::Overlap {
            name: "Name2".into(),
            existing: "Name1".into(),
        }
    );

    let err = line.add(Field::text("Name2", 44, 1)).unwrap_err();
    assert!(matches!(err, LayoutError::Overlap { .. }));

    assert_eq!(line.len(), 4);
}

#[test]
fn fields_with_the_same_name_are_replaced() {
    let mut line = address_line();

    line.add(Field::text("Name1", 44, 20)).unwrap();
    assert_eq!(line.len(), 4);
    assert_eq!(line.field("Name1").unwrap().len(), 20);

    // A replacement may move into the bytes it frees.
    line.add(Field::text("Ort", 160, 28)).unwrap();
    assert_eq!(line.field_at(160).map(Field::name), Some("Ort"));
    assert!(line.field_at(163).is_none());
}

#[test]
fn fields_must_fit_the_line() {
    let mut line = RecordLine::new(TypeKey::new(100), 1);

    assert_eq!(
        line.add(Field::text("Rest", 250, 10)),
        Err(LayoutError::EndAddressExceeded {
            name: "Rest".into(),
            end: 259,
        })
    );
    assert_eq!(
        line.add(Field::text("Anfang", 0, 3)),
        Err(LayoutError::AddressBelowOne {
            name: "Anfang".into(),
            address: 0,
        })
    );
    assert_eq!(
        line.add(Field::text("Leer", 10, 0)),
        Err(LayoutError::ZeroLength("Leer".into()))
    );
    assert!(line.is_empty());

    line.add(Field::text("Ende", 255, 2)).unwrap();
}

#[test]
fn missing_fields_name_the_key() {
    let line = address_line();
    let err = line.field("Name9").unwrap_err();

    assert_eq!(
        err,
        FieldNotFound {
            name: "Name9".into(),
            key: TypeKey::new(100),
        }
    );
    assert_eq!(err.to_string(), "No field Name9 in Satzart 0100.");
}

#[test]
fn remove_fields() {
    let mut line = address_line();

    assert_eq!(line.remove("Ort").map(|f| f.address()), Some(163));
    assert!(!line.contains("Ort"));
    assert!(line.remove("Ort").is_none());
}

#[test]
fn import_and_write() {
    let mut line = address_line();

    let mut bytes = [b' '; 256];
    bytes[..4].copy_from_slice(b"0100");
    bytes[43..47].copy_from_slice(b"Max ");
    bytes[162..166].copy_from_slice(b"Bonn");
    bytes[255] = b'1';

    line.import(&bytes);
    assert_eq!(line.field("Satzart").unwrap().content(), "0100");
    assert_eq!(line.field("Ort").unwrap().content().trim_end(), "Bonn");
    assert_eq!(line.to_bytes(), bytes);
}

#[test]
fn short_input_is_blank_padded() {
    let mut line = address_line();
    line.import(b"0100");

    assert_eq!(line.field("Satzart").unwrap().content(), "0100");
    assert!(line.field("Name1").unwrap().is_blank());
    assert_eq!(line.field("Satznummer").unwrap().content(), " ");
}

#[test]
fn write_bytes_patches_fields() {
    let mut line = address_line();
    line.write_bytes(43, b"XMeier");

    // Byte 43 lies between fields and is not kept.
    assert_eq!(line.field("Name1").unwrap().content().trim_end(), "Meier");
    assert_eq!(line.to_bytes()[42], b' ');

    line.write_bytes(42, b"XMeier");
    assert_eq!(line.field("Name1").unwrap().content().trim_end(), "eier");
}

#[test]
fn validate_locates_violations() {
    let mut line = address_line();
    line.import(b"01x0");

    let violations = line.validate(ValidationMode::Lax);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].key, Some(TypeKey::new(100)));
    assert_eq!(violations[0].line, Some(1));
    assert_eq!(violations[0].field.as_deref(), Some("Satzart"));
}
