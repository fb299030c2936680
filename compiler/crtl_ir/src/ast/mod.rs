//! AST model.
//!
//! The tree is fully owned: each rewrite pass consumes an [`Ast`] and hands
//! back a new one. Node identity survives across passes through [`NodeId`],
//! not through pointers.

mod decl;
mod expr;
mod stmt;
mod ty;

pub use decl::{
    Decl, EntryPoint, Function, GlobalParam, Stage, Struct, StructMember, Symbol, Variable,
};
pub use expr::{Access, BinaryOp, Call, Constant, Expr, ExprKind, Fragment, UnaryOp};
pub use stmt::{Block, Stmt, StmtKind};
pub use ty::{
    EntryPointType, FunctionType, ModifierConflict, Modifiers, Primitive, ResourceAccess,
    StructRef, Type, TypeDisplay, TypeKind,
};

use crate::{NodeId, NodeIdGen};

/// Top-level container: the ordered declarations of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct Ast {
    pub decls: Vec<Decl>,
    ids: NodeIdGen,
}

impl Ast {
    /// Assemble a tree from its declarations and the generator that numbered them.
    pub fn new(decls: Vec<Decl>, ids: NodeIdGen) -> Self {
        Ast { decls, ids }
    }

    /// Split into declarations and id generator, for a rewrite pass to own.
    pub fn into_parts(self) -> (Vec<Decl>, NodeIdGen) {
        (self.decls, self.ids)
    }

    /// Allocate an id for a synthesized node.
    pub fn fresh_id(&mut self) -> NodeId {
        self.ids.fresh()
    }

    pub fn structs(&self) -> impl Iterator<Item = &Struct> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Struct(s) => Some(s),
            _ => None,
        })
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &EntryPoint> {
        self.decls.iter().filter_map(|d| match d {
            Decl::EntryPoint(e) => Some(e),
            _ => None,
        })
    }

    pub fn global_params(&self) -> impl Iterator<Item = &GlobalParam> {
        self.decls.iter().filter_map(|d| match d {
            Decl::GlobalParam(g) => Some(g),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests;
