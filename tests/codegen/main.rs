//! Integration tests for build-time generation.
//!
//! `fixtures/types.toml` is resolved and rendered, and the output is compared
//! against `fixtures/generated.rs`. That same file is compiled into this test
//! below, so the expected output is also checked against the runtime.

#[path = "../common/mod.rs"]
mod common;

use common::through_version;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use verser::{from_bytes, to_bytes, to_bytes_versioned, Aggregate};
use verser_codegen::{generate, generate_file, CodegenError, GENERATED_HEADER};
use verser_schema::{
    ConfigError, DeclarationSet, GeneratorConfig, RangePolicy, RelevantClassResolver, ResolveError,
};

#[derive(Debug, Default, PartialEq)]
pub struct Stamp {
    seconds: u64,
}

#[derive(Debug, Default, PartialEq)]
pub struct Event {
    stamp: Stamp,
    kind: u8,
    detail: String,
    cache: Vec<u8>,
    legacy: u16,
    count: u32,
}

impl Event {
    #[allow(dead_code)]
    const LIMIT: u32 = 16;
}

pub struct Audit {
    event: Event,
    who: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct Tag {
    label: String,
}

include!("fixtures/generated.rs");

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/codegen/fixtures")
        .join(name)
}

fn declarations() -> DeclarationSet {
    DeclarationSet::from_file(&fixture("types.toml")).unwrap()
}

fn squash(source: &str) -> String {
    source.split_whitespace().collect()
}

fn event() -> Event {
    Event {
        stamp: Stamp { seconds: 60 },
        kind: 1,
        detail: "d".to_string(),
        cache: vec![9, 9],
        legacy: 0x0203,
        count: 4,
    }
}

#[test]
fn test_output_matches_fixture() {
    let generated = generate(&GeneratorConfig::default(), &declarations()).unwrap();
    assert!(generated.starts_with(GENERATED_HEADER));
    let expected = include_str!("fixtures/generated.rs");
    assert_eq!(squash(&generated), squash(expected));
}

#[test]
fn test_only_relevant_main_types_resolved() {
    let schema = RelevantClassResolver::new(&GeneratorConfig::default())
        .resolve(&declarations())
        .unwrap();
    let names: Vec<&str> = schema.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Stamp", "Event", "Audit", "Tag"]);

    let audit = schema.get("Audit").unwrap();
    assert_eq!(audit.bases.len(), 1);
    assert!(!audit.default_constructible);
}

#[test]
fn test_generated_schema_constants() {
    assert_eq!(Event::SCHEMA.version, 2);
    assert_eq!(Event::SCHEMA.bases, &["Stamp"]);
    assert!(Event::SCHEMA.field_index("cache").is_none());
    assert!(Event::SCHEMA.field_index("LIMIT").is_none());
    assert_eq!(Event::SCHEMA.runs().len(), 4);
}

#[test]
fn test_generated_event_layout() {
    let mut stamp = 60u64.to_le_bytes().to_vec();

    let bytes = to_bytes(&event()).unwrap();
    assert_eq!(bytes[0], 2);
    assert_eq!(&bytes[1..9], &stamp[..]);
    assert_eq!(&bytes[9..], &[1, 1, b'd', 0x03, 0x02, 4, 0, 0, 0]);

    // Event declares version 2, so a newer pass is capped to it
    assert_eq!(to_bytes_versioned(&event(), 5).unwrap(), bytes);

    let bytes = to_bytes_versioned(&event(), 1).unwrap();
    stamp.insert(0, 1);
    stamp.extend_from_slice(&[1, 4, 0, 0, 0]);
    assert_eq!(bytes, stamp);
}

#[test]
fn test_generated_event_round_trip() {
    let decoded: Event = from_bytes(&to_bytes(&event()).unwrap()).unwrap();
    assert_eq!(decoded, Event { cache: Vec::new(), ..event() });

    let old = through_version(&event(), 1);
    assert_eq!(old.detail, "");
    assert_eq!(old.legacy, 0);
    assert_eq!(old.count, 4);
    assert_eq!(old.stamp.seconds, 60);
}

#[test]
fn test_generated_write_only_type_carries_base_version() {
    let audit = Audit {
        event: event(),
        who: "ops".to_string(),
    };
    // Audit is unversioned; its Event base writes its own version 2 first
    let bytes = to_bytes(&audit).unwrap();
    assert_eq!(bytes[0], 2);
    assert_eq!(&bytes[1..9], &60u64.to_le_bytes());
    assert_eq!(bytes.len(), 1 + 8 + 1 + 2 + 2 + 4 + 4);
    assert_eq!(&bytes[bytes.len() - 4..], &[3, b'o', b'p', b's']);

    let old = to_bytes_versioned(&audit, 1).unwrap();
    assert_eq!(old[0], 1);
    assert_eq!(&old[9..], &[1, 4, 0, 0, 0, 3, b'o', b'p', b's']);

    let tag = Tag {
        label: "t".to_string(),
    };
    assert_eq!(from_bytes::<Tag>(&to_bytes(&tag).unwrap()).unwrap(), tag);
}

#[test]
fn test_reject_policy_reports_field() {
    let set = DeclarationSet::from_toml_str(
        r#"
        [[types]]
        name = "Odd"
        bases = [{ ty = "Serializable" }]
        members = [
            { marker = { until = 2 } },
            { marker = { as_of = 5 } },
            { field = { name = "late", ty = "u8" } },
        ]
        "#,
    )
    .unwrap();

    let config = GeneratorConfig::default().with_range_policy(RangePolicy::Reject);
    match generate(&config, &set) {
        Err(CodegenError::Resolve(ResolveError::ContradictoryRange {
            field,
            as_of,
            until,
            ..
        })) => {
            assert_eq!(field, "late");
            assert_eq!((as_of, until), (5, 2));
        }
        other => panic!("expected contradictory range, got {:?}", other.map(|_| ())),
    }

    let reset = generate(&GeneratorConfig::default(), &set).unwrap();
    assert!(reset.contains("::verser::VersionRange::between(5, 0)"));
}

#[test]
fn test_generate_file_writes_config_and_output() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("verser.toml");
    let out_path = dir.path().join("serialize.rs");

    let written = generate_file(&config_path, &fixture("types.toml"), &out_path).unwrap();
    assert!(config_path.exists());

    let output = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(output.len(), written);
    assert_eq!(squash(&output), squash(include_str!("fixtures/generated.rs")));
}

#[test]
fn test_unsupported_declaration_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("types.yaml");
    std::fs::write(&path, "types: []").unwrap();
    assert!(matches!(
        DeclarationSet::from_file(&path),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}
