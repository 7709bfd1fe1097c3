//! Rust source emission
//!
//! Each resolved type becomes an `Aggregate` impl (and an `AggregateRead`
//! impl when it has a default constructor) followed by the codec glue
//! macro. Fields are grouped into version-gated runs; each run with a
//! non-trivial range is wrapped in a single `if`:
//!
//! ```text
//! a          ->  encode a
//! b  [2, 0]  ->  if s.version_at_least(2) { encode b }
//! c  [2, 3]  ->  if s.version_at_least(2) && s.version_at_most(3) { encode c }
//! d          ->  encode d
//! ```

use std::fmt::Write as _;
use verser_core::VersionRange;
use verser_schema::{GeneratorConfig, ResolvedField, ResolvedSchema, ResolvedType};

/// First line of every generated file
pub const GENERATED_HEADER: &str = "// @generated by verser-codegen. Do not edit.";

const INDENT: &str = "    ";

/// Renders resolved types as Rust source
#[derive(Debug, Clone)]
pub struct RustEmitter {
    runtime: String,
}

impl RustEmitter {
    /// Create an emitter referring to the runtime crate at `runtime_path`
    pub fn new(runtime_path: impl Into<String>) -> Self {
        RustEmitter {
            runtime: runtime_path.into(),
        }
    }

    /// Create an emitter from the generator configuration
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.runtime_path.clone())
    }

    /// Render a whole schema as one file
    pub fn emit(&self, schema: &ResolvedSchema) -> String {
        let mut out = String::new();
        out.push_str(GENERATED_HEADER);
        out.push('\n');
        for ty in &schema.types {
            out.push('\n');
            out.push_str(&self.emit_type(ty));
        }
        out
    }

    /// Render one type
    pub fn emit_type(&self, ty: &ResolvedType) -> String {
        let rt = &self.runtime;
        let mut src = Source::default();

        src.open(format!("impl {rt}::Aggregate for {} {{", ty.name));
        src.open(format!(
            "const SCHEMA: {rt}::AggregateSchema = {rt}::AggregateSchema {{"
        ));
        src.line(format!("name: {:?},", ty.name));
        src.line(format!("version: {},", ty.version));
        if ty.bases.is_empty() {
            src.line("bases: &[],");
        } else {
            src.open("bases: &[");
            for base in &ty.bases {
                src.line(format!("{:?},", base.ty));
            }
            src.close("],");
        }
        if ty.write_fields.is_empty() {
            src.line("fields: &[],");
        } else {
            src.open("fields: &[");
            for field in &ty.write_fields {
                src.line(format!(
                    "{rt}::FieldDescriptor::new({:?}, {rt}::VersionRange::between({}, {})),",
                    field.name, field.range.as_of, field.range.until
                ));
            }
            src.close("],");
        }
        src.close("};");
        src.blank();

        let s = param_name("s", ty.bases.is_empty() && ty.write_fields.is_empty());
        src.open(format!(
            "fn write_members<W: ::std::io::Write>(&self, {s}: &mut {rt}::Serializer<W>) -> {rt}::Result<()> {{"
        ));
        for base in &ty.bases {
            src.line(format!("{s}.delegate_base(&self.{})?;", base.field));
        }
        self.emit_runs(&mut src, &ty.write_fields, s, |field| {
            format!("{rt}::Encode::encode(&self.{}, {s})?;", field.name)
        });
        src.line("Ok(())");
        src.close("}");
        src.close("}");

        if ty.default_constructible {
            src.blank();
            src.open(format!("impl {rt}::AggregateRead for {} {{", ty.name));
            let d = param_name("d", ty.bases.is_empty() && ty.read_fields.is_empty());
            src.open(format!(
                "fn read_members<R: ::std::io::Read>(&mut self, {d}: &mut {rt}::Deserializer<R>) -> {rt}::Result<()> {{"
            ));
            for base in &ty.bases {
                src.line(format!("{d}.delegate_base(&mut self.{})?;", base.field));
            }
            self.emit_runs(&mut src, &ty.read_fields, d, |field| {
                format!("self.{} = {rt}::Decode::decode({d})?;", field.name)
            });
            src.line("Ok(())");
            src.close("}");
            src.close("}");
            src.blank();
            src.line(format!("{rt}::impl_aggregate_codec!({});", ty.name));
        } else {
            src.blank();
            src.line(format!("{rt}::impl_aggregate_encode!({});", ty.name));
        }

        src.finish()
    }

    fn emit_runs(
        &self,
        src: &mut Source,
        fields: &[ResolvedField],
        receiver: &str,
        statement: impl Fn(&ResolvedField) -> String,
    ) {
        let ranges = fields.iter().map(|field| field.range);
        for run in verser_core::VersionGate::partition(ranges) {
            let guard = guard(receiver, run.range);
            if let Some(condition) = &guard {
                src.open(format!("if {condition} {{"));
            }
            for field in &fields[run.members] {
                src.line(statement(field));
            }
            if guard.is_some() {
                src.close("}");
            }
        }
    }
}

/// Guard condition for a run, `None` when the run is unconditional
fn guard(receiver: &str, range: VersionRange) -> Option<String> {
    match (range.as_of, range.until) {
        (0, 0) => None,
        (as_of, 0) => Some(format!("{receiver}.version_at_least({as_of})")),
        (0, until) => Some(format!("{receiver}.version_at_most({until})")),
        (as_of, until) => Some(format!(
            "{receiver}.version_at_least({as_of}) && {receiver}.version_at_most({until})"
        )),
    }
}

fn param_name(name: &'static str, unused: bool) -> &'static str {
    match (name, unused) {
        ("s", true) => "_s",
        ("d", true) => "_d",
        _ => name,
    }
}

/// Indentation-aware line buffer
#[derive(Default)]
struct Source {
    out: String,
    depth: usize,
}

impl Source {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    fn finish(self) -> String {
        self.out
    }
}
