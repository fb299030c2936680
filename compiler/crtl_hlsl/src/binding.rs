//! Parameter binding policy.
//!
//! | Parameter type | Binding |
//! |----------------|---------|
//! | scalar, vector, matrix | own `cbuffer`, `bind(CBV, 1)` |
//! | read-only buffer or texture, acceleration structure | `bind(SRV, 1)` |
//! | read-write buffer or texture | `bind(UAV, 1)` |
//! | `T[n]` of a resource | `bind(class, n)` |
//! | `T[]` of a resource | `bind_unsized(class)` |
//! | `T[n]` of a numeric type | own `cbuffer`, `bind(CBV, 1)` |
//! | struct | split: numeric members share one `cbuffer`, each resource member is bound by the rules above |
//!
//! Anything else (void, rays, functions, unsized numeric arrays) cannot be
//! bound.

use rustc_hash::FxHashMap;

use crtl_ir::ast::{ResourceAccess, Struct, Type, TypeKind};
use crtl_ir::{Name, NodeId, Span, StringInterner};

use crate::problem::CodegenProblem;
use crate::registers::{Binding, RegisterAllocator, RegisterClass};

/// Where a value of some type lives.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Placement {
    /// Inside a constant buffer.
    Constant,
    /// `count` registers of `class`; `None` for an unbounded array.
    Resource {
        class: RegisterClass,
        count: Option<u32>,
    },
}

fn access_class(access: ResourceAccess) -> RegisterClass {
    match access {
        ResourceAccess::ReadOnly => RegisterClass::Srv,
        ResourceAccess::ReadWrite => RegisterClass::Uav,
    }
}

pub(crate) fn placement(ty: &Type) -> Option<Placement> {
    if ty.is_numeric() {
        return Some(Placement::Constant);
    }
    match &ty.kind {
        TypeKind::Buffer { access, .. } | TypeKind::Texture { access, .. } => {
            Some(Placement::Resource {
                class: access_class(*access),
                count: Some(1),
            })
        }
        TypeKind::AccelerationStructure => Some(Placement::Resource {
            class: RegisterClass::Srv,
            count: Some(1),
        }),
        TypeKind::Array { element, len } => match (placement(element)?, len) {
            (Placement::Constant, Some(_)) => Some(Placement::Constant),
            (Placement::Resource { class, count: Some(1) }, len) => Some(Placement::Resource {
                class,
                count: *len,
            }),
            _ => None,
        },
        _ => None,
    }
}

fn allocate(alloc: &mut RegisterAllocator, placement: Placement) -> Binding {
    match placement {
        Placement::Constant => alloc.bind(RegisterClass::Cbv, 1),
        Placement::Resource {
            class,
            count: Some(count),
        } => alloc.bind(class, count),
        Placement::Resource { class, count: None } => alloc.bind_unsized(class),
    }
}

/// A non-struct parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundValue {
    pub ty: Type,
    pub binding: Binding,
}

impl BoundValue {
    /// Numeric values get a `cbuffer` of their own.
    pub fn in_constant_buffer(&self) -> bool {
        self.binding.class == RegisterClass::Cbv
    }
}

/// One member of a split struct parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundMember {
    pub member: Name,
    /// `<param>_<member>`.
    pub output_name: Name,
    pub ty: Type,
    /// For numeric members, the shared constant buffer's binding.
    pub binding: Binding,
}

/// The constant buffer holding a split struct's numeric members.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantBuffer {
    /// `<param>_cb`.
    pub name: Name,
    pub binding: Binding,
    /// Output names of the members it holds, in member order.
    pub contents: Vec<Name>,
}

/// A struct parameter bound member by member.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitStruct {
    pub members: Vec<BoundMember>,
    pub constant_buffer: Option<ConstantBuffer>,
}

impl SplitStruct {
    pub fn member(&self, name: Name) -> Option<&BoundMember> {
        self.members.iter().find(|m| m.member == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BindingKind {
    Value(BoundValue),
    Split(SplitStruct),
}

/// Binding of one global parameter or entry-point parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamBinding {
    pub decl: NodeId,
    /// Name in the generated source.
    pub output_name: Name,
    pub kind: BindingKind,
}

impl ParamBinding {
    pub fn as_split(&self) -> Option<&SplitStruct> {
        match &self.kind {
            BindingKind::Split(split) => Some(split),
            BindingKind::Value(_) => None,
        }
    }
}

/// Every binding made during code generation, in allocation order.
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    params: Vec<ParamBinding>,
    by_decl: FxHashMap<NodeId, usize>,
}

impl BindingTable {
    pub(crate) fn insert(&mut self, binding: ParamBinding) {
        self.by_decl.insert(binding.decl, self.params.len());
        self.params.push(binding);
    }

    pub fn get(&self, decl: NodeId) -> Option<&ParamBinding> {
        self.by_decl.get(&decl).map(|&i| &self.params[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamBinding> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A parameter to bind.
pub(crate) struct Param<'a> {
    pub decl: NodeId,
    pub name: Name,
    pub span: Option<Span>,
    pub ty: &'a Type,
}

/// Bind a non-struct parameter.
pub(crate) fn bind_value(
    alloc: &mut RegisterAllocator,
    param: &Param<'_>,
    interner: &StringInterner,
) -> Result<ParamBinding, CodegenProblem> {
    let Some(placement) = placement(param.ty) else {
        return Err(CodegenProblem::UnsupportedParamType {
            span: param.span,
            param: param.name,
            ty: param.ty.display(interner).to_string(),
        });
    };
    Ok(ParamBinding {
        decl: param.decl,
        output_name: param.name,
        kind: BindingKind::Value(BoundValue {
            ty: param.ty.clone(),
            binding: allocate(alloc, placement),
        }),
    })
}

/// Bind a struct parameter member by member.
///
/// Every member is checked before anything is allocated, so a rejected
/// struct leaves the allocator untouched.
pub(crate) fn bind_split(
    alloc: &mut RegisterAllocator,
    param: &Param<'_>,
    decl: &Struct,
    interner: &StringInterner,
) -> Result<ParamBinding, Vec<CodegenProblem>> {
    let mut problems = Vec::new();
    let mut placements = Vec::with_capacity(decl.members.len());
    for member in &decl.members {
        if member.symbol.ty.as_struct().is_some() {
            problems.push(CodegenProblem::NestedStructParam {
                span: param.span,
                param: param.name,
                member: member.symbol.name,
            });
            continue;
        }
        match placement(&member.symbol.ty) {
            Some(placement) => placements.push((member, placement)),
            None => problems.push(CodegenProblem::UnsupportedParamType {
                span: param.span,
                param: interner.intern_joined(param.name, member.symbol.name),
                ty: member.symbol.ty.display(interner).to_string(),
            }),
        }
    }
    if !problems.is_empty() {
        return Err(problems);
    }

    let has_constants = placements
        .iter()
        .any(|(_, p)| *p == Placement::Constant);
    let constant_buffer = has_constants.then(|| ConstantBuffer {
        name: interner.intern(&format!("{}_cb", interner.lookup(param.name))),
        binding: alloc.bind(RegisterClass::Cbv, 1),
        contents: Vec::new(),
    });

    let mut split = SplitStruct {
        members: Vec::with_capacity(placements.len()),
        constant_buffer,
    };
    for (member, placement) in placements {
        let output_name = interner.intern_joined(param.name, member.symbol.name);
        let binding = match (placement, &mut split.constant_buffer) {
            (Placement::Constant, Some(cb)) => {
                cb.contents.push(output_name);
                cb.binding
            }
            (placement, _) => allocate(alloc, placement),
        };
        split.members.push(BoundMember {
            member: member.symbol.name,
            output_name,
            ty: member.symbol.ty.clone(),
            binding,
        });
    }

    Ok(ParamBinding {
        decl: param.decl,
        output_name: param.name,
        kind: BindingKind::Split(split),
    })
}

#[cfg(test)]
mod tests;
