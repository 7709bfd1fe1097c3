//! Shared reference identity across fields, containers and passes.

use std::rc::Rc;
use std::sync::Arc;
use verser::{aggregate, from_bytes, to_bytes, ConversionError, Error, SharedRef};

#[derive(Debug, Default, PartialEq)]
struct Config {
    name: String,
    retries: u8,
}

aggregate! {
    Config {
        field name;
        field retries;
    }
}

#[derive(Debug, Default)]
struct Job {
    primary: SharedRef<Rc<Config>>,
    fallback: SharedRef<Rc<Config>>,
    history: Vec<Rc<Config>>,
    spare: SharedRef<Rc<Config>>,
}

aggregate! {
    Job {
        field primary;
        field fallback;
        field history;
        field spare;
    }
}

fn config(name: &str) -> Rc<Config> {
    Rc::new(Config {
        name: name.to_string(),
        retries: 3,
    })
}

#[test]
fn test_aliases_survive_round_trip() {
    let shared = config("main");
    let other = config("other");
    let job = Job {
        primary: SharedRef::new(shared.clone()),
        fallback: SharedRef::new(shared.clone()),
        history: vec![other.clone(), shared, other],
        spare: SharedRef::null(),
    };

    let bytes = to_bytes(&job).unwrap();
    let decoded: Job = from_bytes(&bytes).unwrap();

    assert!(decoded.primary.ptr_eq(&decoded.fallback));
    let primary = decoded.primary.get().unwrap();
    assert_eq!(primary.name, "main");
    assert!(Rc::ptr_eq(primary, &decoded.history[1]));
    assert!(Rc::ptr_eq(&decoded.history[0], &decoded.history[2]));
    assert!(!Rc::ptr_eq(&decoded.history[0], &decoded.history[1]));
    assert!(decoded.spare.is_null());
}

#[test]
fn test_payload_written_once() {
    let shared = config("x");
    let job = Job {
        primary: SharedRef::new(shared.clone()),
        fallback: SharedRef::new(shared),
        history: Vec::new(),
        spare: SharedRef::null(),
    };
    let bytes = to_bytes(&job).unwrap();
    // first: mode, id, name (len + 1 byte), retries; repeat: mode, id;
    // empty history: length; null: mode
    assert_eq!(bytes, vec![1, 1, 1, b'x', 3, 2, 1, 0, 0]);
}

#[test]
fn test_distinct_equal_values_stay_distinct() {
    let job = Job {
        primary: SharedRef::new(config("same")),
        fallback: SharedRef::new(config("same")),
        ..Job::default()
    };
    let decoded: Job = from_bytes(&to_bytes(&job).unwrap()).unwrap();
    assert!(!decoded.primary.ptr_eq(&decoded.fallback));
    assert_eq!(decoded.primary, decoded.fallback);
}

#[test]
fn test_arc_identity() {
    let shared = Arc::new(String::from("threaded"));
    let pair = (shared.clone(), vec![shared]);
    let decoded: (Arc<String>, Vec<Arc<String>>) = from_bytes(&to_bytes(&pair).unwrap()).unwrap();
    assert!(Arc::ptr_eq(&decoded.0, &decoded.1[0]));
}

#[test]
fn test_alias_of_wrong_type_is_fatal() {
    // Id 1 is materialized as Rc<u8>, then aliased as Rc<Config>.
    let bytes = vec![1, 1, 7, 2, 1];
    let result = from_bytes::<(Rc<u8>, Rc<Config>)>(&bytes);
    assert!(matches!(
        result,
        Err(Error::Conversion(ConversionError::ReferenceTypeMismatch { id: 1, .. }))
    ));
}

#[test]
fn test_references_do_not_leak_between_passes() {
    let shared = config("pass");
    let first = to_bytes(&(shared.clone(), shared.clone())).unwrap();
    let second = to_bytes(&shared).unwrap();
    assert_eq!(&first[..second.len()], &second[..]);

    // A repeat marker with no earlier first occurrence in the same pass.
    assert!(matches!(
        from_bytes::<Rc<Config>>(&[2, 1]),
        Err(Error::Conversion(ConversionError::UnknownReference { id: 1 }))
    ));
}
