//! Aggregates with bases, diamonds and write-only types.

use crate::common::round_trip;
use verser::{aggregate, from_bytes, to_bytes, Aggregate, Error};

#[derive(Debug, Default, PartialEq)]
struct Entity {
    id: u16,
}

aggregate! {
    Entity {
        field id;
    }
}

#[derive(Debug, Default, PartialEq)]
struct Named {
    entity: Entity,
    name: String,
}

aggregate! {
    Named {
        base entity: Entity;
        field name;
    }
}

#[derive(Debug, Default, PartialEq)]
struct Priced {
    entity: Entity,
    cents: u32,
}

aggregate! {
    Priced {
        base entity: Entity;
        field cents;
    }
}

/// Reaches `Entity` through both bases.
#[derive(Debug, Default, PartialEq)]
struct Product {
    named: Named,
    priced: Priced,
    stock: u8,
}

aggregate! {
    Product {
        base named: Named;
        base priced: Priced;
        field stock;
    }
}

fn product() -> Product {
    Product {
        named: Named {
            entity: Entity { id: 9 },
            name: "bolt".to_string(),
        },
        priced: Priced {
            entity: Entity { id: 9 },
            cents: 25,
        },
        stock: 3,
    }
}

#[test]
fn test_bases_precede_fields() {
    let bytes = round_trip(&Named {
        entity: Entity { id: 0x0102 },
        name: "n".to_string(),
    });
    assert_eq!(bytes, vec![0x02, 0x01, 1, b'n']);
}

#[test]
fn test_diamond_base_written_once() {
    let bytes = to_bytes(&product()).unwrap();
    let mut expected = vec![9, 0];
    expected.extend_from_slice(&[4, b'b', b'o', b'l', b't']);
    expected.extend_from_slice(&25u32.to_le_bytes());
    expected.push(3);
    assert_eq!(bytes, expected);
}

#[test]
fn test_diamond_second_path_left_default() {
    let bytes = to_bytes(&product()).unwrap();
    let decoded: Product = from_bytes(&bytes).unwrap();
    assert_eq!(decoded.named.entity, Entity { id: 9 });
    assert_eq!(decoded.priced.entity, Entity::default());
    assert_eq!(decoded.priced.cents, 25);
    assert_eq!(decoded.stock, 3);
}

#[test]
fn test_nested_aggregates_are_not_bases() {
    // Two Entity fields are independent values, not a shared base.
    let pair = (Entity { id: 1 }, Entity { id: 2 });
    assert_eq!(round_trip(&pair), vec![1, 0, 2, 0]);

    let products = vec![product(), product()];
    let decoded: Vec<Product> = from_bytes(&to_bytes(&products).unwrap()).unwrap();
    assert!(decoded.iter().all(|p| p.named.entity.id == 9 && p.stock == 3));
}

#[test]
fn test_schema_lists_bases_and_fields() {
    let schema = Product::SCHEMA;
    assert_eq!(schema.name, "Product");
    assert_eq!(schema.bases, &["Named", "Priced"]);
    assert_eq!(schema.field_index("stock"), Some(0));
    assert!(schema.field(1).is_err());
}

#[derive(Debug, Default, PartialEq)]
struct Marker {}

aggregate! {
    Marker {}
}

#[test]
fn test_empty_aggregate_has_no_bytes() {
    assert!(round_trip(&Marker {}).is_empty());
    assert_eq!(round_trip(&vec![Marker {}, Marker {}]), vec![2]);
}

#[test]
fn test_write_only_aggregate() {
    // No `Default`, so it can only be written.
    struct Ticket {
        seat: u8,
        holder: String,
    }

    aggregate! {
        write_only Ticket {
            field seat;
            field holder;
        }
    }

    let ticket = Ticket {
        seat: 12,
        holder: "ada".to_string(),
    };
    assert_eq!(to_bytes(&ticket).unwrap(), vec![12, 3, b'a', b'd', b'a']);
}

#[test]
fn test_truncated_base_reports_truncation() {
    let bytes = to_bytes(&product()).unwrap();
    let result = from_bytes::<Product>(&bytes[..1]);
    assert!(matches!(&result, Err(Error::IoError(_))));
    assert!(result.unwrap_err().is_truncation());
}
