use either::Either::{Left, Right};
use gdv_records::{
    TypeKey,
    avec::import::type_key,
    key::KeyError,
    sans::{
        Decoder,
        discriminator::{Branch, Sequence},
        rules,
    },
};

/// A line with a kind, a branch and optional bytes at further addresses.
fn line(kind: &str, branch: &str, bytes: &[(usize, u8)]) -> Vec<u8> {
    let mut line = vec![b' '; 256];
    line[..4].copy_from_slice(kind.as_bytes());
    line[4..9].copy_from_slice(b"12345");
    line[10..10 + branch.len()].copy_from_slice(branch.as_bytes());
    for &(address, b) in bytes {
        line[address - 1] = b;
    }
    line
}

fn key(s: &str) -> TypeKey {
    s.parse().unwrap()
}

#[test]
fn parse_and_display() {
    let k = key("0220.010.13.1");
    assert_eq!(k.kind(), 220);
    assert_eq!(k.branch(), Some(10));
    assert_eq!(k.sub_branch(), Some(13));
    assert_eq!(k.sequence(), Some(1));
    assert_eq!(k.to_string(), "0220.010.13.1");

    assert_eq!(key("100").to_string(), "0100");
    assert_eq!(key(" 0210.30 ").to_string(), "0210.030");
    assert_eq!(TypeKey::from(9999).to_string(), "9999");
}

#[test]
fn parse_errors() {
    assert_eq!("".parse::<TypeKey>(), Err(KeyError::Empty));
    assert_eq!(
        "0220.x".parse::<TypeKey>(),
        Err(KeyError::InvalidPart("x".into()))
    );
    assert_eq!(
        "0220.010.1.300".parse::<TypeKey>(),
        Err(KeyError::InvalidPart("300".into()))
    );
    assert_eq!(
        "0220.010.1.1.1".parse::<TypeKey>(),
        Err(KeyError::TooManyParts("0220.010.1.1.1".into()))
    );
}

#[test]
fn discriminators_need_their_predecessors() {
    let k = TypeKey::new(220).with_sub_branch(1).with_sequence(2);
    assert_eq!(k, TypeKey::new(220));

    let k = TypeKey::new(220).with_branch(10).with_sequence(2);
    assert_eq!(k, TypeKey::new(220).with_branch(10));
}

#[test]
fn relaxations() {
    let relaxed: Vec<_> = key("0220.010.13.1")
        .relaxations()
        .map(|k| k.to_string())
        .collect();
    assert_eq!(relaxed, ["0220.010.13.1", "0220.010.13", "0220.010", "0220"]);

    assert_eq!(key("0100").parent(), None);
    assert_eq!(key("0220.010.13.1").depth(), 4);
    assert_eq!(key("0220.010.13.1").without_sequence(), key("0220.010.13"));
}

#[test]
fn within() {
    assert!(key("0220.010.13.1").is_within(&key("0220.010")));
    assert!(key("0220.010").is_within(&key("0220.010")));
    assert!(!key("0220.010").is_within(&key("0220.010.13")));
    assert!(!key("0221.010").is_within(&key("0220")));

    assert!(key("0220.010.13.1").same_record(&key("0220.010.13.2")));
    assert!(!key("0220.010.13.1").same_record(&key("0220.010.48.1")));
}

#[test]
fn keys_order_by_kind_first() {
    let mut keys = vec![key("0220.010"), key("0100"), key("0220"), key("0001")];
    keys.sort();

    let keys: Vec<_> = keys.iter().map(TypeKey::to_string).collect();
    assert_eq!(keys, ["0001", "0100", "0220", "0220.010"]);
}

#[test]
fn header_and_trailer_have_no_branch() {
    assert_eq!(type_key(&line("0001", "010", &[])), Some(key("0001")));
    assert_eq!(type_key(&line("9999", "010", &[])), Some(key("9999")));
    assert!(!rules::has_branch(1));
    assert!(rules::has_branch(100));
}

#[test]
fn blank_or_zero_branch() {
    assert_eq!(type_key(&line("0100", "   ", &[])), Some(key("0100")));
    assert_eq!(type_key(&line("0100", "000", &[])), Some(key("0100")));
    assert_eq!(type_key(&line("0210", "030", &[])), Some(key("0210.030")));
}

#[test]
fn life_sub_branches() {
    let life = |kind, wagnisart, seq| line(kind, "010", &[(60, wagnisart), (256, seq)]);

    assert_eq!(type_key(&life("0220", b'1', b'2')), Some(key("0220.010.13.2")));
    assert_eq!(type_key(&life("0220", b'3', b'1')), Some(key("0220.010.13.1")));
    assert_eq!(type_key(&life("0221", b'8', b'1')), Some(key("0221.010.48.1")));
    assert_eq!(type_key(&life("0221", b'4', b' ')), Some(key("0221.010.48")));
    assert_eq!(type_key(&life("0220", b'0', b'1')), Some(key("0220.010.0.1")));
    assert_eq!(type_key(&life("0220", b' ', b'1')), Some(key("0220.010")));
}

#[test]
fn other_sub_branches() {
    let health = line("0220", "020", &[(48, b'1'), (256, b'1')]);
    assert_eq!(type_key(&health), Some(key("0220.020.1")));

    let savings = line("0220", "580", &[(44, b'2'), (256, b'1')]);
    assert_eq!(type_key(&savings), Some(key("0220.580.2")));

    // No rule for this kind and branch.
    let contract = line("0200", "010", &[(60, b'1'), (256, b'1')]);
    assert_eq!(type_key(&contract), Some(key("0200.010")));
}

#[test]
fn unknown_and_short_lines() {
    assert_eq!(type_key(b"garbage"), Some(TypeKey::UNKNOWN));
    assert_eq!(type_key(b"02"), None);
    assert_eq!(type_key(b"0220 12345"), None);

    // Everything past the line reads as blank.
    assert_eq!(type_key(b"022012345 010"), Some(key("0220.010")));
}

#[test]
fn state_machine() {
    let r = line("0220", "010", &[(60, b'1'), (256, b'6')]);

    let Left(branch) = Decoder::advance(r[..4].try_into().unwrap()) else {
        panic!("kind 0220 has a branch");
    };

    let start = Branch::ADDRESS as usize - 1;
    let Left(sub_branch) = branch.advance(r[start..start + 9].try_into().unwrap()) else {
        panic!("branch 010 has a sub-branch");
    };
    assert_eq!(sub_branch.address(), 60);

    let Left(sequence) = sub_branch.advance([r[59]]) else {
        panic!("life sub-branches are followed by a sequence");
    };

    let key = sequence.advance([r[Sequence::ADDRESS as usize - 1]]);
    assert_eq!(key.to_string(), "0220.010.13.6");

    assert!(matches!(Decoder::advance(*b"0001"), Right(k) if k == TypeKey::new(1)));
}
