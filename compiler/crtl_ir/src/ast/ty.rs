//! Type annotations.

use std::fmt;

use bitflags::bitflags;

use crate::{Name, NodeId, Span, StringInterner};

use super::Stage;

bitflags! {
    /// Qualifiers attached to a type annotation.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u8 {
        const CONST = 1 << 0;
        const IN = 1 << 1;
        const OUT = 1 << 2;
        const INOUT = 1 << 3;
    }
}

/// An invalid combination of [`Modifiers`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ModifierConflict {
    /// `const` together with `out` or `inout`.
    ConstWritable,
    /// `inout` together with a standalone `in` or `out`.
    InOutRedundant,
}

impl Modifiers {
    /// Check the modifier set for a forbidden combination.
    pub fn conflict(self) -> Option<ModifierConflict> {
        if self.contains(Modifiers::CONST) && self.intersects(Modifiers::OUT | Modifiers::INOUT) {
            return Some(ModifierConflict::ConstWritable);
        }
        if self.contains(Modifiers::INOUT) && self.intersects(Modifiers::IN | Modifiers::OUT) {
            return Some(ModifierConflict::InOutRedundant);
        }
        None
    }
}

impl fmt::Display for ModifierConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierConflict::ConstWritable => {
                write!(f, "`const` cannot be combined with `out` or `inout`")
            }
            ModifierConflict::InOutRedundant => {
                write!(f, "`inout` cannot be combined with `in` or `out`")
            }
        }
    }
}

/// Scalar element kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Bool,
    Int,
    Uint,
    Float,
    Double,
    Void,
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Uint => "uint",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Void => "void",
        }
    }
}

/// Whether a buffer or texture may be written by the shader.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ResourceAccess {
    ReadOnly,
    ReadWrite,
}

/// Reference to a struct declaration by name.
///
/// Carries its own [`NodeId`]: the resolver binds each usage to the
/// declaring [`Struct`](super::Struct).
#[derive(Clone, Debug, PartialEq)]
pub struct StructRef {
    pub id: NodeId,
    pub name: Name,
    pub span: Option<Span>,
}

/// Signature of a function.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Type,
}

/// Signature of an entry point.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryPointType {
    pub params: Vec<Type>,
    pub stage: Stage,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    Primitive(Primitive),
    /// `float4`: element and arity 1-4.
    Vector {
        element: Primitive,
        len: u8,
    },
    /// `float4x4`: element, rows and columns each 1-4.
    Matrix {
        element: Primitive,
        rows: u8,
        cols: u8,
    },
    Struct(StructRef),
    Function(Box<FunctionType>),
    EntryPoint(Box<EntryPointType>),
    Buffer {
        element: Box<Type>,
        access: ResourceAccess,
    },
    Texture {
        element: Box<Type>,
        access: ResourceAccess,
        /// Dimensionality 1-3.
        dims: u8,
    },
    AccelerationStructure,
    Ray,
    /// Fixed-size (`len: Some`) or unbounded (`len: None`) array.
    Array {
        element: Box<Type>,
        len: Option<u32>,
    },
}

/// A type annotation: kind plus modifier set.
#[derive(Clone, Debug, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub modifiers: Modifiers,
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Type {
            kind,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn primitive(p: Primitive) -> Self {
        Type::new(TypeKind::Primitive(p))
    }

    pub fn void() -> Self {
        Type::primitive(Primitive::Void)
    }

    pub fn vector(element: Primitive, len: u8) -> Self {
        Type::new(TypeKind::Vector { element, len })
    }

    pub fn matrix(element: Primitive, rows: u8, cols: u8) -> Self {
        Type::new(TypeKind::Matrix {
            element,
            rows,
            cols,
        })
    }

    pub fn buffer(element: Type, access: ResourceAccess) -> Self {
        Type::new(TypeKind::Buffer {
            element: Box::new(element),
            access,
        })
    }

    pub fn texture(element: Type, access: ResourceAccess, dims: u8) -> Self {
        Type::new(TypeKind::Texture {
            element: Box::new(element),
            access,
            dims,
        })
    }

    pub fn array(element: Type, len: Option<u32>) -> Self {
        Type::new(TypeKind::Array {
            element: Box::new(element),
            len,
        })
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Scalars, vectors and matrices: values that live in a constant buffer.
    pub fn is_numeric(&self) -> bool {
        match &self.kind {
            TypeKind::Primitive(p) => *p != Primitive::Void,
            TypeKind::Vector { .. } | TypeKind::Matrix { .. } => true,
            _ => false,
        }
    }

    /// Buffers, textures and acceleration structures.
    pub fn is_resource(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Buffer { .. } | TypeKind::Texture { .. } | TypeKind::AccelerationStructure
        )
    }

    pub fn as_struct(&self) -> Option<&StructRef> {
        match &self.kind {
            TypeKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Render in CRTL surface syntax.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, interner }
    }
}

/// [`Display`](fmt::Display) adapter returned by [`Type::display`].
pub struct TypeDisplay<'a> {
    ty: &'a Type,
    interner: &'a StringInterner,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = self.interner;
        match &self.ty.kind {
            TypeKind::Primitive(p) => f.write_str(p.as_str()),
            TypeKind::Vector { element, len } => write!(f, "{}{len}", element.as_str()),
            TypeKind::Matrix {
                element,
                rows,
                cols,
            } => write!(f, "{}{rows}x{cols}", element.as_str()),
            TypeKind::Struct(s) => f.write_str(interner.lookup(s.name)),
            TypeKind::Function(sig) => {
                write!(f, "fn(")?;
                for (i, p) in sig.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p.display(interner))?;
                }
                write!(f, ") -> {}", sig.ret.display(interner))
            }
            TypeKind::EntryPoint(sig) => write!(f, "entry<{}>", sig.stage.as_str()),
            TypeKind::Buffer { element, access } => {
                let prefix = match access {
                    ResourceAccess::ReadOnly => "",
                    ResourceAccess::ReadWrite => "RW",
                };
                write!(f, "{prefix}Buffer<{}>", element.display(interner))
            }
            TypeKind::Texture {
                element,
                access,
                dims,
            } => {
                let prefix = match access {
                    ResourceAccess::ReadOnly => "",
                    ResourceAccess::ReadWrite => "RW",
                };
                write!(f, "{prefix}Texture{dims}D<{}>", element.display(interner))
            }
            TypeKind::AccelerationStructure => f.write_str("RaytracingAccelerationStructure"),
            TypeKind::Ray => f.write_str("Ray"),
            TypeKind::Array { element, len } => match len {
                Some(n) => write!(f, "{}[{n}]", element.display(interner)),
                None => write!(f, "{}[]", element.display(interner)),
            },
        }
    }
}
