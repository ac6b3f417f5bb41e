#![allow(dead_code)]
#![cfg(feature = "derive")]

use gdv_records::{
    avec::{FromRecord, FromRecords},
    field::Field,
};

#[test]
fn decode_slice_sample() {
    const PATH: &str = "fixtures/sample.gdv";
    let data = std::fs::read(PATH).unwrap();
    let mut holdings = Holdings::default();
    gdv_records::avec::decode_slice(&data, &mut holdings);

    let header = holdings.header.unwrap();
    assert_eq!(header.sender.as_deref(), Some("Muster Versicherung AG"));
    assert_eq!(header.period_from, Some(1012024));

    let [address] = &holdings.addresses[..] else {
        panic!("expected one address, got {:?}", holdings.addresses);
    };
    assert_eq!(address.name.as_deref(), Some("Mustermann"));
    assert_eq!(address.first_name.as_deref(), Some("Max"));
    assert_eq!(address.place.as_deref(), Some("Köln"));
    assert_eq!(address.kind, Some(1));
    assert_eq!(address.numbers, ["0221 123456"]);

    let [life] = &holdings.life[..] else {
        panic!("expected one life record, got {:?}", holdings.life);
    };
    assert_eq!(life.wagnisart, Some('1'));
    assert_eq!(life.sum, Some(100_000.0));
    assert_eq!(life.death_benefit, Some(50_000.0));

    let [beneficiary] = &holdings.beneficiaries[..] else {
        panic!("expected one beneficiary, got {:?}", holdings.beneficiaries);
    };
    assert_eq!(beneficiary.name.as_deref(), Some("Erika Mustermann"));
    assert_eq!(beneficiary.share, Some(100.0));

    assert_eq!(holdings.trailer.unwrap().count, Some(9));
}

#[test]
fn decode_reader_sample() {
    const PATH: &str = "fixtures/sample.gdv";
    let mut file = std::fs::File::open(PATH).unwrap();
    let mut holdings = Holdings::default();
    gdv_records::avec::decode_reader(&mut file, &mut holdings).unwrap();

    assert!(holdings.header.is_some());
    assert_eq!(holdings.addresses.len(), 1);
    assert_eq!(holdings.life.len(), 1);
}

#[test]
fn unclaimed_records_are_skipped() {
    let data = b"0500     0010Schaden\n";
    let mut holdings = Holdings::default();
    gdv_records::avec::decode_slice(data, &mut holdings);

    assert!(holdings.header.is_none());
    assert!(holdings.addresses.is_empty());
}

#[derive(Debug, Default, FromRecords)]
struct Holdings {
    #[record("0001")]
    header: Option<Header>,
    #[record("0100")]
    addresses: Vec<Address>,
    #[record("0220.010")]
    life: Vec<Life>,
    #[record("0220.010.13.6")]
    beneficiaries: Vec<Beneficiary>,
    #[record("9999")]
    trailer: Option<Trailer>,
    unrelated: u8,
}

#[derive(Debug, Default, FromRecord)]
struct Header {
    #[field("Absender")]
    sender: Option<String>,
    #[field("Erstellungsdatum Zeitraum vom")]
    period_from: Option<u32>,
}

#[derive(Debug, Default, FromRecord)]
struct Address {
    #[field("Name1")]
    name: Option<String>,
    #[field("Name2")]
    first_name: Option<String>,
    #[field("Name3")]
    more_names: Option<String>,
    #[field("Ort")]
    place: Option<String>,
    #[field("Adresskennzeichen")]
    kind: Option<u8>,
    #[field("Kommunikationsnummer 1", |v, f: &Field| v.push(f.content().trim().to_owned()))]
    numbers: Vec<String>,
}

#[derive(Debug, Default, FromRecord)]
struct Life {
    #[field("Wagnisart")]
    wagnisart: Option<char>,
    #[field("Versicherungssumme")]
    sum: Option<f64>,
    #[field("Todesfallleistung")]
    death_benefit: Option<f64>,
}

#[derive(Debug, Default, FromRecord)]
struct Beneficiary {
    #[field("Bezugsberechtigter")]
    name: Option<String>,
    #[field("Anteil")]
    share: Option<f64>,
}

#[derive(Debug, Default, FromRecord)]
struct Trailer {
    #[field("Anzahl der Saetze")]
    count: Option<u64>,
}
