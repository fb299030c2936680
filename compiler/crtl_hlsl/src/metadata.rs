//! Binding metadata sidecar.
//!
//! The runtime maps "set parameter by name" calls onto registers through
//! this record. Entry-point parameters are keyed by the name written in the
//! source; `output_name` is the identifier in the generated HLSL. Maps are
//! `BTreeMap`s so serialized output is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crtl_ir::ast::{Ast, EntryPoint, Function, GlobalParam, Type};
use crtl_ir::visitor::Visitor;
use crtl_ir::{Name, NodeId, StringInterner};
use crtl_lower::{ExpansionMap, RenameMap};

use crate::binding::{BindingKind, BindingTable, ParamBinding};
use crate::registers::{Binding, RegisterClass};
use crate::types;

/// The whole sidecar.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub entry_points: BTreeMap<String, EntryPointInfo>,
    pub global_params: BTreeMap<String, ParamInfo>,
    pub expanded_globals: BTreeMap<String, ExpandedGlobalInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPointInfo {
    pub stage: String,
    /// Keyed by source name.
    pub parameters: BTreeMap<String, ParamInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamInfo {
    Struct(StructParamInfo),
    Value(ValueParamInfo),
}

/// A parameter bound as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueParamInfo {
    pub source_name: String,
    pub output_name: String,
    #[serde(flatten)]
    pub binding: BindingInfo,
}

/// Register range plus the HLSL type bound there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingInfo {
    pub register_class: RegisterClass,
    pub space: u32,
    pub slot: u32,
    /// `null` for unbounded arrays.
    pub count: Option<u32>,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A struct parameter bound member by member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructParamInfo {
    pub source_name: String,
    pub output_name: String,
    pub members: BTreeMap<String, MemberInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_buffer: Option<ConstantBufferInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub output_name: String,
    #[serde(flatten)]
    pub binding: BindingInfo,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantBufferInfo {
    pub name: String,
    pub register_class: RegisterClass,
    pub space: u32,
    pub slot: u32,
    pub contents: Vec<ConstantBufferEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantBufferEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedGlobalInfo {
    /// Member name -> generated global.
    pub members: BTreeMap<String, String>,
}

/// Build the sidecar for a generated program.
#[tracing::instrument(level = "debug", skip_all)]
pub fn emit_metadata(
    ast: &Ast,
    bindings: &BindingTable,
    expansions: &ExpansionMap,
    renames: &RenameMap,
    interner: &StringInterner,
) -> Metadata {
    let mut emitter = MetadataEmitter {
        bindings,
        renames,
        interner,
        metadata: Metadata::default(),
    };
    emitter.visit_ast(ast);
    let mut metadata = emitter.metadata;

    for expanded in expansions.iter() {
        let members = expanded
            .members
            .iter()
            .map(|m| {
                (
                    interner.lookup(m.member).to_owned(),
                    interner.lookup(m.global_name).to_owned(),
                )
            })
            .collect();
        metadata.expanded_globals.insert(
            interner.lookup(expanded.original_name).to_owned(),
            ExpandedGlobalInfo { members },
        );
    }

    debug!(
        entry_points = metadata.entry_points.len(),
        global_params = metadata.global_params.len(),
        expanded_globals = metadata.expanded_globals.len(),
        "metadata emitted"
    );
    metadata
}

struct MetadataEmitter<'a> {
    bindings: &'a BindingTable,
    renames: &'a RenameMap,
    interner: &'a StringInterner,
    metadata: Metadata,
}

impl MetadataEmitter<'_> {
    fn text(&self, name: Name) -> String {
        self.interner.lookup(name).to_owned()
    }

    fn spelling(&self, ty: &Type) -> String {
        types::spelling(ty, self.interner)
            .unwrap_or_else(|_| ty.display(self.interner).to_string())
    }

    fn binding_info(&self, binding: Binding, ty: &Type) -> BindingInfo {
        BindingInfo {
            register_class: binding.class,
            space: binding.space,
            slot: binding.slot,
            count: binding.count,
            ty: self.spelling(ty),
        }
    }

    fn param_info(&self, binding: &ParamBinding, source_name: Name) -> ParamInfo {
        let source_name = self.text(source_name);
        let output_name = self.text(binding.output_name);
        match &binding.kind {
            BindingKind::Value(value) => ParamInfo::Value(ValueParamInfo {
                source_name,
                output_name,
                binding: self.binding_info(value.binding, &value.ty),
            }),
            BindingKind::Split(split) => {
                let members = split
                    .members
                    .iter()
                    .map(|m| {
                        let info = MemberInfo {
                            output_name: self.text(m.output_name),
                            binding: self.binding_info(m.binding, &m.ty),
                        };
                        (self.text(m.member), info)
                    })
                    .collect();
                let constant_buffer = split.constant_buffer.as_ref().map(|cb| ConstantBufferInfo {
                    name: self.text(cb.name),
                    register_class: cb.binding.class,
                    space: cb.binding.space,
                    slot: cb.binding.slot,
                    contents: split
                        .members
                        .iter()
                        .filter(|m| cb.contents.contains(&m.output_name))
                        .map(|m| ConstantBufferEntry {
                            name: self.text(m.output_name),
                            ty: self.spelling(&m.ty),
                        })
                        .collect(),
                });
                ParamInfo::Struct(StructParamInfo {
                    source_name,
                    output_name,
                    members,
                    constant_buffer,
                })
            }
        }
    }

    fn lookup(&self, decl: NodeId, source_name: Name) -> Option<ParamInfo> {
        self.bindings
            .get(decl)
            .map(|binding| self.param_info(binding, source_name))
    }
}

impl<'ast> Visitor<'ast> for MetadataEmitter<'_> {
    fn visit_global_param(&mut self, global: &'ast GlobalParam) {
        if let Some(info) = self.lookup(global.id, global.symbol.name) {
            let name = self.text(global.symbol.name);
            self.metadata.global_params.insert(name, info);
        }
    }

    fn visit_entry_point(&mut self, entry: &'ast EntryPoint) {
        let mut parameters = BTreeMap::new();
        for param in &entry.params {
            let source_name = self
                .renames
                .get(param.id)
                .map_or(param.symbol.name, |r| r.source_name);
            if let Some(info) = self.lookup(param.id, source_name) {
                parameters.insert(self.text(source_name), info);
            }
        }
        let name = self.text(entry.symbol.name);
        self.metadata.entry_points.insert(
            name,
            EntryPointInfo {
                stage: entry.stage.as_str().to_owned(),
                parameters,
            },
        );
    }

    /// Function bodies hold no bindings.
    fn visit_function(&mut self, _function: &'ast Function) {}
}
