//! CRTL to HLSL type names.

use crtl_ir::ast::{Modifiers, Primitive, ResourceAccess, Type, TypeKind};
use crtl_ir::StringInterner;

/// A type with no HLSL spelling in the position it was used.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct UnsupportedType;

fn primitive(p: Primitive) -> &'static str {
    match p {
        Primitive::Bool => "bool",
        Primitive::Int => "int",
        Primitive::Uint => "uint",
        Primitive::Float => "float",
        Primitive::Double => "double",
        Primitive::Void => "void",
    }
}

fn rw_prefix(access: ResourceAccess) -> &'static str {
    match access {
        ResourceAccess::ReadOnly => "",
        ResourceAccess::ReadWrite => "RW",
    }
}

/// Element types a buffer or texture may hold.
fn element_name(ty: &Type, interner: &StringInterner) -> Result<String, UnsupportedType> {
    match &ty.kind {
        TypeKind::Primitive(Primitive::Void) => Err(UnsupportedType),
        TypeKind::Primitive(_)
        | TypeKind::Vector { .. }
        | TypeKind::Matrix { .. }
        | TypeKind::Struct(_) => type_name(ty, interner),
        _ => Err(UnsupportedType),
    }
}

/// HLSL spelling of `ty`. Array types spell their element; the extent
/// goes on the declarator (see [`declarator`]).
pub fn type_name(ty: &Type, interner: &StringInterner) -> Result<String, UnsupportedType> {
    let name = match &ty.kind {
        TypeKind::Primitive(p) => primitive(*p).to_owned(),
        TypeKind::Vector { element, len } => {
            if *element == Primitive::Void || !(1..=4).contains(len) {
                return Err(UnsupportedType);
            }
            format!("{}{len}", primitive(*element))
        }
        TypeKind::Matrix {
            element,
            rows,
            cols,
        } => {
            if *element == Primitive::Void || !(1..=4).contains(rows) || !(1..=4).contains(cols)
            {
                return Err(UnsupportedType);
            }
            format!("{}{rows}x{cols}", primitive(*element))
        }
        TypeKind::Struct(s) => interner.lookup(s.name).to_owned(),
        TypeKind::Buffer { element, access } => format!(
            "{}StructuredBuffer<{}>",
            rw_prefix(*access),
            element_name(element, interner)?
        ),
        TypeKind::Texture {
            element,
            access,
            dims,
        } => {
            if !(1..=3).contains(dims) {
                return Err(UnsupportedType);
            }
            format!(
                "{}Texture{dims}D<{}>",
                rw_prefix(*access),
                element_name(element, interner)?
            )
        }
        TypeKind::AccelerationStructure => "RaytracingAccelerationStructure".to_owned(),
        TypeKind::Ray => "RayDesc".to_owned(),
        TypeKind::Array { element, .. } => type_name(element, interner)?,
        TypeKind::Function(_) | TypeKind::EntryPoint(_) => return Err(UnsupportedType),
    };
    Ok(name)
}

/// Innermost element of an array type, and the extents around it.
fn split_extents(ty: &Type) -> (&Type, String) {
    let mut extents = String::new();
    let mut current = ty;
    while let TypeKind::Array { element, len } = &current.kind {
        match len {
            Some(n) => extents.push_str(&format!("[{n}]")),
            None => extents.push_str("[]"),
        }
        current = element;
    }
    (current, extents)
}

/// `float name[4][2]`, `Texture2D<float4> name[]`, `int name`.
pub fn declarator(ty: &Type, name: &str, interner: &StringInterner) -> Result<String, UnsupportedType> {
    let (element, extents) = split_extents(ty);
    Ok(format!("{} {name}{extents}", type_name(element, interner)?))
}

/// The type alone, extents included: `float4[4]`.
pub fn spelling(ty: &Type, interner: &StringInterner) -> Result<String, UnsupportedType> {
    let (element, extents) = split_extents(ty);
    Ok(format!("{}{extents}", type_name(element, interner)?))
}

/// Parameter qualifiers, with a trailing space when non-empty.
pub fn qualifiers(modifiers: Modifiers) -> String {
    let mut out = String::new();
    for (flag, text) in [
        (Modifiers::CONST, "const "),
        (Modifiers::IN, "in "),
        (Modifiers::OUT, "out "),
        (Modifiers::INOUT, "inout "),
    ] {
        if modifiers.contains(flag) {
            out.push_str(text);
        }
    }
    out
}
