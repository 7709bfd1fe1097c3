//! Relevant class resolution
//!
//! Decides which declared types are serializable and, for each one in the
//! main unit, which bases it delegates to and which fields it writes and
//! reads under which version ranges.
//!
//! ## Relevance
//!
//! A type is relevant when it has a definition and
//! - transitively derives from the configured marker type, or
//! - is named by an adaption record, or
//! - is on the allow-list.
//!
//! Included declarations can be relevant (and serve as bases) but are never
//! emitted.
//!
//! ## Bases
//!
//! Declared bases are kept in order when relevant, except that a base
//! already reachable through an earlier kept base is dropped:
//!
//! ```text
//!        A            D : B, C, A
//!       / \
//!      B   C          kept: B, C     (A is reachable through B)
//!       \ /
//!        D
//! ```

use crate::config::{GeneratorConfig, RangePolicy};
use crate::declaration::{is_qualified_name, Access, BaseDecl, DeclarationSource, MemberDecl, Origin, TypeDecl};
use crate::error::{ResolveError, ResolveResult};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};
use verser_core::{GatedRun, RangeUpdate, SchemaVersion, VersionGate, VersionMarker, VersionRange};

/// A base the emitted code delegates to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBase {
    /// Qualified base type name
    pub ty: String,
    /// Field holding the base
    pub field: String,
}

/// A field with its version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Field name
    pub name: String,
    /// Field type as declared
    pub ty: String,
    /// Versions in which the field is on the wire
    pub range: VersionRange,
}

/// A relevant type ready for emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Qualified name
    pub name: String,
    /// The type's own schema version
    pub version: SchemaVersion,
    /// Relevant bases in delegation order
    pub bases: Vec<ResolvedBase>,
    /// Fields written, in declaration order
    pub write_fields: Vec<ResolvedField>,
    /// Fields read, in declaration order
    pub read_fields: Vec<ResolvedField>,
    /// The type has a default constructor (and so can be read)
    pub default_constructible: bool,
}

impl ResolvedType {
    /// Written fields grouped into version-gated runs
    pub fn write_runs(&self) -> Vec<GatedRun> {
        VersionGate::partition(self.write_fields.iter().map(|f| f.range))
    }

    /// Read fields grouped into version-gated runs
    pub fn read_runs(&self) -> Vec<GatedRun> {
        VersionGate::partition(self.read_fields.iter().map(|f| f.range))
    }
}

/// Resolution output: the relevant types of the main unit, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSchema {
    /// Resolved types
    pub types: Vec<ResolvedType>,
}

impl ResolvedSchema {
    /// Look up a resolved type by qualified name
    pub fn get(&self, name: &str) -> Option<&ResolvedType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Number of resolved types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if nothing was resolved
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Resolves declarations against a generator configuration
#[derive(Debug, Clone)]
pub struct RelevantClassResolver<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> RelevantClassResolver<'c> {
    /// Create a resolver
    pub fn new(config: &'c GeneratorConfig) -> Self {
        RelevantClassResolver { config }
    }

    /// Resolve every relevant type of the main unit
    pub fn resolve<S: DeclarationSource + ?Sized>(&self, source: &S) -> ResolveResult<ResolvedSchema> {
        let mut pass = Pass::new(self.config, source)?;
        let mut types = Vec::new();

        for decl in source.declarations() {
            if !decl.definition || decl.origin != Origin::Main {
                continue;
            }
            if !pass.is_relevant(normalize(&decl.name))? {
                trace!(type_name = %decl.name, "not serializable");
                continue;
            }
            types.push(pass.resolve_type(decl)?);
        }

        debug!(
            declarations = source.declarations().len(),
            resolved = types.len(),
            "resolved declarations"
        );
        Ok(ResolvedSchema { types })
    }
}

#[derive(Debug, Clone, Copy)]
enum Visit {
    InProgress,
    Done(bool),
}

/// State of one resolution
struct Pass<'a> {
    config: &'a GeneratorConfig,
    marker: &'a str,
    definitions: FxHashMap<&'a str, &'a TypeDecl>,
    explicit: FxHashSet<&'a str>,
    derives_marker: FxHashMap<&'a str, Visit>,
}

impl<'a> Pass<'a> {
    fn new<S: DeclarationSource + ?Sized>(config: &'a GeneratorConfig, source: &'a S) -> ResolveResult<Self> {
        let mut definitions = FxHashMap::default();
        let mut forward = Vec::new();
        for decl in source.declarations() {
            let name = normalize(&decl.name);
            if !decl.definition {
                forward.push(name);
                continue;
            }
            if definitions.insert(name, decl).is_some() {
                return Err(ResolveError::DuplicateDefinition {
                    name: decl.name.clone(),
                });
            }
        }
        for name in forward {
            if !definitions.contains_key(name) {
                warn!(type_name = name, "forward declaration without definition, skipping");
            }
        }

        let mut explicit: FxHashSet<&'a str> = config.allow_list.iter().map(|n| normalize(n)).collect();
        for record in config.adapted.iter().chain(source.adaption_records()) {
            let record = record.trim();
            if is_qualified_name(record) {
                explicit.insert(normalize(record));
            } else {
                warn!(record, "malformed adaption record, skipping");
            }
        }

        Ok(Pass {
            config,
            marker: normalize(&config.marker_type),
            definitions,
            explicit,
            derives_marker: FxHashMap::default(),
        })
    }

    fn is_relevant(&mut self, name: &'a str) -> ResolveResult<bool> {
        if name == self.marker || !self.definitions.contains_key(name) {
            return Ok(false);
        }
        Ok(self.explicit.contains(name) || self.derives_from_marker(name)?)
    }

    fn derives_from_marker(&mut self, name: &'a str) -> ResolveResult<bool> {
        match self.derives_marker.get(name) {
            Some(Visit::Done(result)) => return Ok(*result),
            Some(Visit::InProgress) => {
                return Err(ResolveError::InheritanceCycle {
                    name: name.to_string(),
                })
            }
            None => {}
        }
        let decl = match self.definitions.get(name) {
            Some(decl) => *decl,
            None => return Ok(false),
        };

        self.derives_marker.insert(name, Visit::InProgress);
        let mut result = false;
        for base in &decl.bases {
            let base_name = normalize(&base.ty);
            if base_name == self.marker {
                result = true;
                continue;
            }
            if !self.definitions.contains_key(base_name) {
                if self.config.strict_bases {
                    return Err(ResolveError::UnknownBase {
                        type_name: decl.name.clone(),
                        base: base.ty.clone(),
                    });
                }
                warn!(type_name = %decl.name, base = %base.ty, "unknown base, ignoring");
                continue;
            }
            if self.derives_from_marker(base_name)? {
                result = true;
            }
        }
        self.derives_marker.insert(name, Visit::Done(result));
        Ok(result)
    }

    fn resolve_type(&mut self, decl: &'a TypeDecl) -> ResolveResult<ResolvedType> {
        let bases = self.relevant_bases(decl)?;
        let (write_fields, read_fields) = self.relevant_fields(decl)?;
        trace!(
            type_name = %decl.name,
            bases = bases.len(),
            write = write_fields.len(),
            read = read_fields.len(),
            "resolved type"
        );
        Ok(ResolvedType {
            name: decl.name.clone(),
            version: decl.version,
            bases: bases
                .into_iter()
                .map(|base| ResolvedBase {
                    ty: base.ty.clone(),
                    field: base.field_name(),
                })
                .collect(),
            write_fields,
            read_fields,
            default_constructible: decl.default_constructible,
        })
    }

    fn relevant_bases(&mut self, decl: &'a TypeDecl) -> ResolveResult<Vec<&'a BaseDecl>> {
        let mut kept = Vec::new();
        let mut reachable: FxHashSet<&'a str> = FxHashSet::default();
        for base in &decl.bases {
            let name = normalize(&base.ty);
            if !self.is_relevant(name)? {
                continue;
            }
            if !reachable.insert(name) {
                debug!(type_name = %decl.name, base = %base.ty, "base reachable through an earlier base");
                continue;
            }
            self.collect_ancestors(name, &mut reachable)?;
            kept.push(base);
        }
        Ok(kept)
    }

    fn collect_ancestors(&mut self, name: &'a str, reachable: &mut FxHashSet<&'a str>) -> ResolveResult<()> {
        let decl = match self.definitions.get(name) {
            Some(decl) => *decl,
            None => return Ok(()),
        };
        for base in &decl.bases {
            let base_name = normalize(&base.ty);
            if self.is_relevant(base_name)? && reachable.insert(base_name) {
                self.collect_ancestors(base_name, reachable)?;
            }
        }
        Ok(())
    }

    fn relevant_fields(
        &self,
        decl: &TypeDecl,
    ) -> ResolveResult<(Vec<ResolvedField>, Vec<ResolvedField>)> {
        let mut gate = VersionGate::new();
        let mut write = Vec::new();
        let mut read = Vec::new();

        for (index, member) in decl.members.iter().enumerate() {
            let field = match member {
                MemberDecl::Marker(marker) => {
                    let before = gate.tracked();
                    if gate.declare(*marker) == RangeUpdate::ResetOther {
                        let (as_of, until) = match *marker {
                            VersionMarker::AsOf(as_of) => (as_of, before.until),
                            VersionMarker::Until(until) => (before.as_of, until),
                        };
                        if self.config.contradictory_ranges == RangePolicy::Reject {
                            return Err(ResolveError::ContradictoryRange {
                                type_name: decl.name.clone(),
                                field: next_field_name(&decl.members[index + 1..]),
                                as_of,
                                until,
                            });
                        }
                        debug!(type_name = %decl.name, as_of, until, "contradictory marker, other bound reset");
                    }
                    continue;
                }
                MemberDecl::Field(field) => field,
            };

            let transition = gate.member();
            if transition.starts_run() {
                trace!(type_name = %decl.name, field = %field.name, ?transition, "gate transition");
            }
            if field.is_static || field.is_const {
                continue;
            }

            let resolved = ResolvedField {
                name: field.name.clone(),
                ty: field.ty.clone(),
                range: gate.tracked(),
            };
            let public = field.access == Access::Public;
            if public || decl.grants.private_write {
                write.push(resolved.clone());
            }
            if public || decl.grants.private_read {
                read.push(resolved);
            }
        }
        gate.finish();
        Ok((write, read))
    }
}

fn next_field_name(members: &[MemberDecl]) -> String {
    members
        .iter()
        .find_map(|member| match member {
            MemberDecl::Field(field) => Some(field.name.clone()),
            MemberDecl::Marker(_) => None,
        })
        .unwrap_or_default()
}

fn normalize(name: &str) -> &str {
    name.strip_prefix("::").unwrap_or(name)
}
