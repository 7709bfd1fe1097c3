//! Round trips of values mixing several wire shapes.

use crate::common::{le32, round_trip};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use verser::{aggregate, from_bytes, to_bytes};

#[derive(Debug, Default, PartialEq)]
struct Node {
    value: u32,
    next: Option<Box<Node>>,
}

aggregate! {
    Node {
        field value;
        field next;
    }
}

fn list(values: &[u32]) -> Option<Box<Node>> {
    values.iter().rev().fold(None, |next, &value| {
        Some(Box::new(Node { value, next }))
    })
}

#[derive(Debug, Default, PartialEq)]
struct Inventory {
    owner: String,
    counts: HashMap<String, Vec<Option<u16>>>,
    tags: BTreeSet<String>,
    grid: [[i8; 2]; 2],
    pending: VecDeque<(u8, char)>,
    history: BTreeMap<u64, f64>,
    head: Option<Box<Node>>,
}

aggregate! {
    Inventory {
        field owner;
        field counts;
        field tags;
        field grid;
        field pending;
        field history;
        field head;
    }
}

#[test]
fn test_nested_containers_round_trip() {
    let mut counts = HashMap::new();
    counts.insert("bolts".to_string(), vec![Some(3), None, Some(u16::MAX)]);
    counts.insert("nuts".to_string(), Vec::new());

    let inventory = Inventory {
        owner: "depot-7".into(),
        counts,
        tags: ["metal", "small"].iter().map(|s| s.to_string()).collect(),
        grid: [[-1, 2], [3, -4]],
        pending: VecDeque::from(vec![(1, 'x'), (2, 'ß')]),
        history: [(1, 0.5), (9, -2.25)].into_iter().collect(),
        head: list(&[10, 20, 30]),
    };
    round_trip(&inventory);
}

#[test]
fn test_empty_values_round_trip() {
    round_trip(&Inventory::default());
}

#[test]
fn test_owning_chain_wire_layout() {
    let head = Node {
        value: 1,
        next: list(&[2]),
    };
    let mut expected = Vec::new();
    expected.extend_from_slice(&le32(1));
    expected.push(1);
    expected.extend_from_slice(&le32(2));
    expected.push(0);
    assert_eq!(to_bytes(&head).unwrap(), expected);
}

#[test]
fn test_every_shape_is_self_delimiting() {
    // Two values back to back in one sequence decode without external framing.
    let pair = vec![list(&[1, 2, 3]), list(&[])];
    let bytes = to_bytes(&pair).unwrap();
    let decoded: Vec<Option<Box<Node>>> = from_bytes(&bytes).unwrap();
    assert_eq!(decoded, pair);
}

#[test]
fn test_truncated_aggregate_is_fatal() {
    let bytes = to_bytes(&Node {
        value: 5,
        next: list(&[6]),
    })
    .unwrap();
    for cut in 0..bytes.len() {
        let err = from_bytes::<Node>(&bytes[..cut]).unwrap_err();
        assert!(err.is_truncation(), "cut at {}: {}", cut, err);
    }
}
