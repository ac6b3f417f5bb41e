use gdv_records::{
    Config, Registry, TypeKey,
    avec::Importer,
    field::Field,
    line::RecordLine,
};
use proptest::prelude::*;

fn truncating() -> Config {
    Config::default().with_truncation(true)
}

proptest! {
    #[test]
    fn text_keeps_field_length(value in "[ -~]{0,40}", length in 1u16..=30) {
        let mut field = Field::text("Text", 1, length).with_config(truncating());
        field.set(&value).unwrap();

        prop_assert_eq!(field.as_bytes().len(), length as usize);
        prop_assert_eq!(field.content().chars().count(), length as usize);
    }

    #[test]
    fn numbers_keep_field_length(n in 0u64..1_000_000_000_000_000_000, length in 1u16..=12) {
        let mut field = Field::numeric("Zahl", 1, length).with_config(truncating());
        field.set_number(n as i64).unwrap();

        prop_assert_eq!(field.as_bytes().len(), length as usize);
        prop_assert!(field.as_bytes().iter().all(u8::is_ascii_digit));

        if n < 10u64.pow(length as u32) {
            prop_assert_eq!(field.to_u64().unwrap(), n);
        } else {
            prop_assert!(field.as_bytes().iter().all(|b| *b == b'9'));
        }
    }

    #[test]
    fn overlap_is_symmetric(
        a in 1u16..=256,
        a_length in 1u16..=20,
        b in 1u16..=256,
        b_length in 1u16..=20,
    ) {
        let a = Field::text("A", a, a_length);
        let b = Field::text("B", b, b_length);
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn lines_stay_ordered_and_disjoint(
        fields in prop::collection::vec((1u16..=250, 1u16..=6), 0..40),
    ) {
        let mut line = RecordLine::new(TypeKey::new(100), 1);

        for (i, (address, length)) in fields.into_iter().enumerate() {
            let _ = line.add(Field::text(format!("F{i}"), address, length));

            for pair in line.fields().windows(2) {
                prop_assert!(pair[0].end_address() < pair[1].address());
            }
        }
    }

    #[test]
    fn keys_round_trip_through_text(
        kind in 0u16..=9999,
        branch in prop::option::of(0u16..=999),
        sub_branch in prop::option::of(0u16..=99),
        sequence in prop::option::of(0u8..=9),
    ) {
        let mut key = TypeKey::new(kind);
        if let Some(branch) = branch {
            key = key.with_branch(branch);
        }
        if let Some(sub_branch) = sub_branch {
            key = key.with_sub_branch(sub_branch);
        }
        if let Some(sequence) = sequence {
            key = key.with_sequence(sequence);
        }

        prop_assert_eq!(key.to_string().parse::<TypeKey>().unwrap(), key);
    }

    #[test]
    fn importing_arbitrary_bytes_never_fails(
        data in prop::collection::vec(any::<u8>(), 0..1200),
    ) {
        let registry = Registry::with_builtins();

        for record in Importer::new(&data[..], &registry) {
            let record = record.unwrap();
            prop_assert!(!record.lines().is_empty());

            let mut written = vec![];
            record.write(&mut written).unwrap();
            prop_assert_eq!(written.len(), record.lines().len() * 257);
        }
    }

    #[test]
    fn generic_records_keep_their_key(
        kind in 1000u16..=9000,
        branch in 1u16..=999,
    ) {
        let registry = Registry::with_builtins();
        let key = TypeKey::new(kind).with_branch(branch);

        let record = registry.resolve(key);
        prop_assert!(record.is_generic());

        let mut written = vec![];
        record.write(&mut written).unwrap();

        prop_assert_eq!(gdv_records::avec::import::type_key(&written[..256]), Some(key));
    }
}
