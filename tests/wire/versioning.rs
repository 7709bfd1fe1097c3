//! Version-gated fields and embedded aggregate versions.

use crate::common::through_version;
use std::rc::Rc;
use verser::{
    aggregate, from_bytes, from_bytes_versioned, to_bytes, to_bytes_versioned, Aggregate,
    ConversionError, Deserializer, Error, VersionRange,
};

#[derive(Debug, Default, PartialEq)]
struct Gated {
    a: u8,
    b: u8,
    c: u8,
    d: u8,
}

aggregate! {
    Gated {
        field a;
        field b [2, 0];
        field c [2, 3];
        field d;
    }
}

fn gated() -> Gated {
    Gated { a: 1, b: 2, c: 3, d: 4 }
}

#[test]
fn test_fields_present_per_version() {
    assert_eq!(to_bytes_versioned(&gated(), 1).unwrap(), vec![1, 4]);
    assert_eq!(to_bytes_versioned(&gated(), 2).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(to_bytes_versioned(&gated(), 3).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(to_bytes_versioned(&gated(), 5).unwrap(), vec![1, 2, 4]);
}

#[test]
fn test_version_zero_skips_as_of_runs() {
    assert_eq!(to_bytes(&gated()).unwrap(), vec![1, 4]);
    assert_eq!(to_bytes_versioned(&gated(), 0).unwrap(), vec![1, 4]);
    assert_eq!(through_version(&gated(), 0), Gated { a: 1, d: 4, ..Gated::default() });
}

#[test]
fn test_absent_fields_keep_defaults() {
    assert_eq!(through_version(&gated(), 1), Gated { a: 1, d: 4, ..Gated::default() });
    assert_eq!(through_version(&gated(), 5), Gated { c: 0, ..gated() });
}

#[test]
fn test_old_reader_stops_early() {
    let bytes = to_bytes_versioned(&gated(), 3).unwrap();
    let mut de = Deserializer::new(&bytes[..]).with_default_version(1);
    let decoded: Gated = de.deserialize().unwrap();
    assert_eq!(de.bytes_read(), 2);
    assert_eq!(decoded.a, 1);
    assert_eq!(decoded.d, 2);
    assert_eq!(decoded.b, 0);
}

#[test]
fn test_schema_reports_present_fields() {
    let present = |version| -> Vec<&'static str> {
        Gated::SCHEMA
            .present_fields(version)
            .map(|field| field.name)
            .collect()
    };
    assert_eq!(present(1), vec!["a", "d"]);
    assert_eq!(present(5), vec!["a", "b", "d"]);
    assert_eq!(Gated::SCHEMA.fields[2].range, VersionRange::between(2, 3));
}

#[derive(Debug, Default, PartialEq)]
struct Settings {
    gated: Gated,
    label: String,
    retries: u8,
}

aggregate! {
    Settings version 4 {
        field gated;
        field label;
        field retries [3, 0];
    }
}

#[test]
fn test_versioned_root_embeds_version() {
    let settings = Settings {
        gated: gated(),
        label: "l".to_string(),
        retries: 9,
    };

    let bytes = to_bytes(&settings).unwrap();
    // version 4, then Gated at version 4, label, retries
    assert_eq!(bytes, vec![4, 1, 2, 4, 1, b'l', 9]);
    let expected = Settings {
        gated: Gated { c: 0, ..gated() },
        ..settings
    };
    assert_eq!(from_bytes::<Settings>(&bytes).unwrap(), expected);
}

#[test]
fn test_embedded_version_wins_over_default() {
    let settings = Settings {
        gated: gated(),
        label: String::new(),
        retries: 9,
    };
    let bytes = to_bytes_versioned(&settings, 2).unwrap();
    assert_eq!(bytes, vec![2, 1, 2, 3, 4, 0]);

    // The embedded version overrides the reader's default.
    let decoded: Settings = from_bytes_versioned(&bytes, 7).unwrap();
    assert_eq!(decoded.gated, gated());
    assert_eq!(decoded.retries, 0);
}

#[derive(Debug, Default, PartialEq)]
struct Legacy {
    old: u8,
}

aggregate! {
    Legacy version 9 {
        field old [0, 2];
    }
}

#[derive(Debug, Default, PartialEq)]
struct Current {
    legacy: Legacy,
    fresh: u8,
}

aggregate! {
    Current {
        base legacy: Legacy;
        field fresh [3, 0];
    }
}

#[test]
fn test_versioned_base_writes_own_prefix() {
    let value = Current {
        legacy: Legacy { old: 1 },
        fresh: 2,
    };
    // Legacy runs at its own version 9; fresh is gated at the pass version 0
    assert_eq!(to_bytes(&value).unwrap(), vec![9]);
    assert_eq!(to_bytes_versioned(&value, 2).unwrap(), vec![2, 1]);
    assert_eq!(to_bytes_versioned(&value, 3).unwrap(), vec![3, 2]);
    assert_eq!(
        through_version(&value, 3),
        Current {
            legacy: Legacy::default(),
            fresh: 2,
        }
    );

    let decoded: Current = from_bytes(&[2, 1]).unwrap();
    assert_eq!(decoded.legacy.old, 1);
    assert_eq!(decoded.fresh, 0);
}

#[derive(Debug, Default, PartialEq)]
struct Rec {
    a: u8,
    b: u8,
}

aggregate! {
    Rec version 4 {
        field a;
        field b [2, 0];
    }
}

fn rec() -> Rec {
    Rec { a: 1, b: 2 }
}

#[test]
fn test_versioned_element_in_sequence() {
    let bytes = to_bytes(&vec![rec()]).unwrap();
    assert_eq!(bytes, vec![1, 4, 1, 2]);
    assert_eq!(from_bytes::<Vec<Rec>>(&bytes).unwrap(), vec![rec()]);

    let old = to_bytes_versioned(&vec![rec()], 1).unwrap();
    assert_eq!(old, vec![1, 1, 1]);
    assert_eq!(from_bytes::<Vec<Rec>>(&old).unwrap(), vec![Rec { a: 1, b: 0 }]);
}

#[test]
fn test_versioned_optional_and_shared() {
    let bytes = to_bytes_versioned(&Some(rec()), 3).unwrap();
    assert_eq!(bytes, vec![1, 3, 1, 2]);
    assert_eq!(from_bytes::<Option<Rec>>(&bytes).unwrap(), Some(rec()));

    let shared = Rc::new(rec());
    let bytes = to_bytes_versioned(&(shared.clone(), shared), 1).unwrap();
    // first occurrence: mode, id, version, a; repeat: mode, id
    assert_eq!(bytes, vec![1, 1, 1, 1, 2, 1]);
    let (first, second): (Rc<Rec>, Rc<Rec>) = from_bytes(&bytes).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(*first, Rec { a: 1, b: 0 });
}

#[derive(Debug, Default, PartialEq)]
struct Holder {
    rec: Rec,
    tail: u8,
}

aggregate! {
    Holder {
        field rec;
        field tail [2, 0];
    }
}

#[test]
fn test_versioned_field_scopes_its_version() {
    let holder = Holder { rec: rec(), tail: 7 };
    // Rec's own version does not leak into the holder's gate
    assert_eq!(to_bytes(&holder).unwrap(), vec![4, 1, 2]);
    assert_eq!(to_bytes_versioned(&holder, 2).unwrap(), vec![2, 1, 2, 7]);
    assert_eq!(through_version(&holder, 2), holder);
}

#[derive(Debug, Default, PartialEq)]
struct Envelope {
    rec: Rec,
    note: u8,
}

aggregate! {
    Envelope version 6 {
        field rec;
        field note [5, 0];
    }
}

#[test]
fn test_nested_prefix_capped_at_declared_version() {
    let envelope = Envelope { rec: rec(), note: 3 };
    let bytes = to_bytes(&envelope).unwrap();
    assert_eq!(bytes, vec![6, 4, 1, 2, 3]);
    assert_eq!(from_bytes::<Envelope>(&bytes).unwrap(), envelope);
}

#[test]
fn test_newer_embedded_version_rejected() {
    assert!(matches!(
        from_bytes::<Rec>(&[5, 1, 2]),
        Err(Error::Conversion(ConversionError::UnsupportedVersion {
            type_name: "Rec",
            version: 5,
            supported: 4,
        }))
    ));
    assert!(matches!(
        from_bytes::<Vec<Rec>>(&[1, 9, 1, 2]),
        Err(Error::Conversion(ConversionError::UnsupportedVersion { version: 9, .. }))
    ));
    assert_eq!(from_bytes::<Rec>(&[4, 1, 2]).unwrap(), rec());
}

proptest::proptest! {
    #[test]
    fn prop_present_fields_survive(
        a in proptest::prelude::any::<u8>(),
        b in proptest::prelude::any::<u8>(),
        c in proptest::prelude::any::<u8>(),
        d in proptest::prelude::any::<u8>(),
        version in 0u32..8,
    ) {
        let value = Gated { a, b, c, d };
        let bytes = to_bytes_versioned(&value, version).unwrap();
        proptest::prop_assert_eq!(bytes.len(), Gated::SCHEMA.present_fields(version).count());

        let decoded: Gated = from_bytes_versioned(&bytes, version).unwrap();
        let admits = |index: usize| Gated::SCHEMA.fields[index].range.admits(version);
        proptest::prop_assert_eq!(decoded.a, a);
        proptest::prop_assert_eq!(decoded.b, if admits(1) { b } else { 0 });
        proptest::prop_assert_eq!(decoded.c, if admits(2) { c } else { 0 });
        proptest::prop_assert_eq!(decoded.d, d);
    }
}
