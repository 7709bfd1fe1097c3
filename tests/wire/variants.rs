//! Tagged unions carrying aggregates, containers and empty alternatives.

use crate::common::round_trip;
use std::rc::Rc;
use verser::{
    aggregate, from_bytes, impl_enum, impl_variant, to_bytes, ConversionError, Empty, Error,
    TaggedUnion,
};

#[derive(Debug, Default, PartialEq)]
struct Point {
    x: i16,
    y: i16,
}

aggregate! {
    Point {
        field x;
        field y;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
enum Unit {
    Metric = 1,
    Imperial = 2,
}

impl_enum!(Unit as u8 { Metric, Imperial });

#[derive(Debug, PartialEq)]
enum Command {
    Move(Point),
    Path(Vec<Point>),
    Scale((f32, Unit)),
    Reset(Empty),
    Share(Rc<Point>),
}

impl_variant!(Command {
    Move(Point),
    Path(Vec<Point>),
    Scale((f32, Unit)),
    Reset(Empty),
    Share(Rc<Point>),
});

#[test]
fn test_discriminant_follows_declaration_order() {
    assert_eq!(Command::NAME, "Command");
    assert_eq!(Command::ALTERNATIVES.len(), 5);
    assert_eq!(Command::Reset(Empty).discriminant(), 3);
    assert_eq!(round_trip(&Command::Reset(Empty)), vec![3]);
}

#[test]
fn test_alternative_payloads() {
    let bytes = round_trip(&Command::Move(Point { x: -1, y: 2 }));
    assert_eq!(bytes, vec![0, 0xFF, 0xFF, 2, 0]);

    round_trip(&Command::Path(vec![Point::default(), Point { x: 5, y: 6 }]));

    let bytes = round_trip(&Command::Scale((1.0, Unit::Imperial)));
    assert_eq!(bytes[0], 2);
    assert_eq!(bytes[5], 2);

    round_trip(&Command::Share(Rc::new(Point { x: 7, y: 8 })));
}

#[test]
fn test_sequence_of_unions_is_self_delimiting() {
    let commands = vec![
        Command::Reset(Empty),
        Command::Move(Point { x: 1, y: 1 }),
        Command::Path(Vec::new()),
        Command::Reset(Empty),
    ];
    assert_eq!(round_trip(&commands).len(), 1 + 1 + 5 + 2 + 1);
}

#[test]
fn test_shared_payload_across_alternatives() {
    let point = Rc::new(Point { x: 3, y: 4 });
    let commands = vec![Command::Share(point.clone()), Command::Share(point)];
    let decoded: Vec<Command> = from_bytes(&to_bytes(&commands).unwrap()).unwrap();
    match (&decoded[0], &decoded[1]) {
        (Command::Share(a), Command::Share(b)) => assert!(Rc::ptr_eq(a, b)),
        other => panic!("unexpected alternatives: {:?}", other),
    }
}

#[test]
fn test_unknown_discriminant_rejected() {
    assert!(matches!(
        from_bytes::<Command>(&[5]),
        Err(Error::Conversion(ConversionError::DiscriminantOutOfRange {
            type_name: "Command",
            discriminant: 5,
            alternatives: 5,
        }))
    ));
    assert!(from_bytes::<Command>(&[0xFF]).is_err());
}

#[test]
fn test_invalid_enum_value_inside_union() {
    // Scale with a valid float and unit value 9
    let mut bytes = vec![2];
    bytes.extend_from_slice(&1.0f32.to_le_bytes());
    bytes.push(9);
    assert!(matches!(
        from_bytes::<Command>(&bytes),
        Err(Error::Conversion(ConversionError::InvalidEnumValue {
            type_name: "Unit",
            value: 9,
        }))
    ));
}
