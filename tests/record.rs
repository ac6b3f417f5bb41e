use gdv_records::{
    Registry, TypeKey, ValidationMode,
    avec::Importer,
    field::{Field, FieldError, FieldKind},
    record::RecordError,
    registry::{Template, builtin},
    violation::ViolationKind,
};

fn key(s: &str) -> TypeKey {
    s.parse().unwrap()
}

#[test]
fn set_reaches_every_line() {
    let registry = Registry::with_builtins();
    let mut record = registry.resolve(key("0100"));

    record.set("Versicherungsschein-Nummer", "VS-4711").unwrap();

    for line in record.lines() {
        let field = line.field("Versicherungsschein-Nummer").unwrap();
        assert_eq!(field.content().trim_end(), "VS-4711");
    }
    assert_eq!(record.get("Name1").unwrap().trim(), "");
}

#[test]
fn unknown_fields() {
    let registry = Registry::with_builtins();
    let mut record = registry.resolve(key("0200.010"));

    let err = record.set("Name1", "Max").unwrap_err();
    assert!(matches!(err, RecordError::NotFound(ref e) if e.name == "Name1"));
    assert_eq!(err.to_string(), "No field Name1 in Satzart 0200.010.");

    let err = record.get("Name1").unwrap_err();
    assert_eq!(err.key, key("0200.010"));
}

#[test]
fn set_reports_field_errors() {
    let registry = Registry::with_builtins();
    let mut record = registry.resolve(key("0200.010"));

    let err = record.set("Gesamtbeitrag", "12,50").unwrap_err();
    assert!(matches!(
        err,
        RecordError::Field(FieldError::Validation { ref field, .. }) if field == "Gesamtbeitrag"
    ));
}

#[test]
fn split_fields_are_presented_as_parts() {
    let registry = Registry::with_builtins();
    let mut header = registry.resolve(TypeKey::new(1));

    header.set(builtin::CREATION_PERIOD, "0101202431122024").unwrap();
    assert_eq!(header.get(builtin::PERIOD_FROM).unwrap(), "01012024");
    assert_eq!(header.get(builtin::PERIOD_TO).unwrap(), "31122024");

    header.set(builtin::PERIOD_TO, "30062024").unwrap();
    assert_eq!(
        header.get(builtin::CREATION_PERIOD).unwrap(),
        "0101202430062024"
    );

    let names: Vec<_> = header.fields().iter().map(|f| f.name().to_owned()).collect();
    assert!(names.iter().any(|n| n == builtin::PERIOD_FROM));
    assert!(!names.iter().any(|n| n == builtin::CREATION_PERIOD));

    let to = header
        .fields()
        .into_iter()
        .find(|f| f.name() == builtin::PERIOD_TO)
        .unwrap();
    assert_eq!(to.address(), 78);
    assert_eq!(to.len(), 8);
}

#[test]
fn fields_in_line_and_address_order() {
    let registry = Registry::with_builtins();
    let record = registry.resolve(key("0100"));

    let fields = record.fields();
    let first = fields.iter().position(|f| f.name() == "Name1").unwrap();
    let second = fields
        .iter()
        .position(|f| f.name() == "Kommunikationstyp 1")
        .unwrap();
    assert!(first < second);

    let satzarten = fields.iter().filter(|f| f.name() == "Satzart").count();
    assert_eq!(satzarten, 2);
}

#[test]
fn fresh_records_validate() {
    let registry = Registry::with_builtins();

    for key in builtin::keys() {
        let record = registry.resolve(key);
        let violations = record.validate(ValidationMode::Lax);
        assert!(violations.is_empty(), "{key}: {violations:?}");
    }
}

#[test]
fn mixed_kinds_are_reported() {
    let registry = Registry::with_builtins();
    let mut record = registry.resolve(key("0100"));
    assert!(record.validate(ValidationMode::Lax).is_empty());

    record.line_mut(2).unwrap().write_bytes(1, b"0101");

    let violations = record.validate(ValidationMode::Lax);
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].kind,
        ViolationKind::MixedKinds {
            expected: 100,
            found: 101,
        }
    );
    assert_eq!(violations[0].line, Some(2));
    assert_eq!(violations[0].key, Some(key("0100")));
}

#[test]
fn sequence_gaps_are_reported() {
    let registry = Registry::new();
    registry.register(
        key("0220.010.13.1"),
        Template::from_rows(
            "1.0",
            [1u8, 2, 3].into_iter().flat_map(|seq| {
                [
                    (seq, "Satzart", FieldKind::Numeric { scale: 0 }, 1, 4),
                    (seq, "Satznummer", FieldKind::Char, 256, 1),
                ]
            }),
        )
        .unwrap(),
    );

    let line = |seq: u8| {
        let mut line = vec![b' '; 256];
        line[..4].copy_from_slice(b"0220");
        line[10..13].copy_from_slice(b"010");
        line[59] = b'1';
        line[255] = seq;
        line
    };

    let mut data = line(b'1');
    data.push(b'\n');
    data.extend(line(b'3'));

    let record = Importer::new(&data[..], &registry)
        .next_record()
        .unwrap()
        .unwrap();
    assert_eq!(record.lines().len(), 2);

    let violations = record.validate(ValidationMode::Lax);
    assert!(
        violations
            .iter()
            .any(|v| v.kind == ViolationKind::SequenceGap { expected: 2, found: 3 }),
        "{violations:?}"
    );
    assert!(record.validate(ValidationMode::Off).is_empty());
}

#[test]
fn write_and_display() {
    let registry = Registry::with_builtins();
    let mut record = registry.resolve(TypeKey::new(9999));
    record.set("VU-Nummer", "12345").unwrap();

    let mut written = vec![];
    record.write(&mut written).unwrap();
    assert_eq!(written.len(), 257);
    assert_eq!(written[256], b'\n');
    assert!(written.starts_with(b"999912345"));

    let shown = record.to_string();
    assert_eq!(shown.len(), 256);
    assert!(shown.starts_with("999912345"));
}

#[test]
fn records_compare_by_content() {
    let registry = Registry::with_builtins();
    let mut a = registry.resolve(key("0100"));
    let b = a.clone();
    assert_eq!(a, b);

    a.field_mut("Name1").unwrap().set("Max").unwrap();
    assert_ne!(a, b);

    let expected = Field::text("Name1", 44, 30).with_content("Max").unwrap();
    assert_eq!(a.field("Name1").unwrap(), &expected);
}
