//! Declarations and their symbols.

use crate::{Name, NodeId, Span};

use super::{Block, EntryPointType, Expr, FunctionType, Type, TypeKind};

/// Name, source location and type of a declaration.
///
/// Every declaration owns exactly one symbol. Renaming a declaration edits
/// its symbol in place so the declaration keeps its [`NodeId`].
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: Name,
    pub span: Option<Span>,
    pub ty: Type,
}

impl Symbol {
    pub fn new(name: Name, span: Option<Span>, ty: Type) -> Self {
        Symbol { name, span, ty }
    }
}

/// Shader stage of an entry point.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stage {
    RayGeneration,
    ClosestHit,
    AnyHit,
    Intersection,
    Miss,
    Compute,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::RayGeneration,
        Stage::ClosestHit,
        Stage::AnyHit,
        Stage::Intersection,
        Stage::Miss,
        Stage::Compute,
    ];

    /// Stage name in the DXR `[shader("...")]` attribute form.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::RayGeneration => "raygeneration",
            Stage::ClosestHit => "closesthit",
            Stage::AnyHit => "anyhit",
            Stage::Intersection => "intersection",
            Stage::Miss => "miss",
            Stage::Compute => "compute",
        }
    }

    pub fn from_name(name: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

/// Local variable, parameter or top-level variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub id: NodeId,
    pub symbol: Symbol,
    pub init: Option<Expr>,
}

/// User function, or a body-less builtin (no source reference).
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub id: NodeId,
    /// Type is the inferred [`FunctionType`].
    pub symbol: Symbol,
    pub params: Vec<Variable>,
    pub body: Option<Block>,
}

impl Function {
    /// Build a function whose symbol type is inferred from its parameters.
    pub fn new(
        id: NodeId,
        name: Name,
        span: Option<Span>,
        params: Vec<Variable>,
        ret: Type,
        body: Option<Block>,
    ) -> Self {
        let sig = FunctionType {
            params: params.iter().map(|p| p.symbol.ty.clone()).collect(),
            ret,
        };
        Function {
            id,
            symbol: Symbol::new(name, span, Type::new(TypeKind::Function(Box::new(sig)))),
            params,
            body,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.body.is_none() && self.symbol.span.is_none()
    }

    pub fn signature(&self) -> Option<&FunctionType> {
        match &self.symbol.ty.kind {
            TypeKind::Function(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<&Type> {
        self.signature().map(|sig| &sig.ret)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntryPoint {
    pub id: NodeId,
    /// Type is an [`EntryPointType`].
    pub symbol: Symbol,
    pub params: Vec<Variable>,
    pub body: Block,
    pub stage: Stage,
}

impl EntryPoint {
    pub fn new(
        id: NodeId,
        name: Name,
        span: Option<Span>,
        params: Vec<Variable>,
        stage: Stage,
        body: Block,
    ) -> Self {
        let sig = EntryPointType {
            params: params.iter().map(|p| p.symbol.ty.clone()).collect(),
            stage,
        };
        EntryPoint {
            id,
            symbol: Symbol::new(
                name,
                span,
                Type::new(TypeKind::EntryPoint(Box::new(sig))),
            ),
            params,
            body,
            stage,
        }
    }
}

/// Top-level binding point. Has no initializer.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalParam {
    pub id: NodeId,
    pub symbol: Symbol,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructMember {
    pub id: NodeId,
    pub symbol: Symbol,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Struct {
    pub id: NodeId,
    pub symbol: Symbol,
    pub members: Vec<StructMember>,
}

impl Struct {
    pub fn member(&self, name: Name) -> Option<&StructMember> {
        self.members.iter().find(|m| m.symbol.name == name)
    }
}

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Function(Function),
    EntryPoint(EntryPoint),
    GlobalParam(GlobalParam),
    Struct(Struct),
    Variable(Variable),
}

impl Decl {
    pub fn id(&self) -> NodeId {
        match self {
            Decl::Function(d) => d.id,
            Decl::EntryPoint(d) => d.id,
            Decl::GlobalParam(d) => d.id,
            Decl::Struct(d) => d.id,
            Decl::Variable(d) => d.id,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            Decl::Function(d) => &d.symbol,
            Decl::EntryPoint(d) => &d.symbol,
            Decl::GlobalParam(d) => &d.symbol,
            Decl::Struct(d) => &d.symbol,
            Decl::Variable(d) => &d.symbol,
        }
    }

    pub fn name(&self) -> Name {
        self.symbol().name
    }
}
