//! CRTL IR - AST and traversal framework.
//!
//! This crate contains the data structures every compiler pass shares:
//! - Spans for source references (line/column)
//! - Names for interned identifiers
//! - `NodeId`s giving every node a stable identity across rewrites
//! - The AST model (declarations, statements, expressions, types)
//! - The builtin function catalogue
//! - A read-only [`visitor::Visitor`] and a rewriting [`rewrite::Rewriter`]
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`
//! - **Own the Tree**: each rewrite pass consumes an `Ast` and returns a new
//!   one; cross-reference tables are keyed by `NodeId`, never by pointer
//! - **Closed Results**: rewrite results are tagged unions per node category

pub mod ast;
mod builder;
pub mod builtins;
mod interner;
mod name;
pub mod node;
mod node_id;
pub mod rewrite;
mod span;
pub mod visitor;

pub use ast::{
    Access, Ast, BinaryOp, Block, Call, Constant, Decl, EntryPoint, Expr, ExprKind, Fragment,
    Function, GlobalParam, Modifiers, Primitive, ResourceAccess, Stage, Stmt, StmtKind, Struct,
    StructMember, StructRef, Symbol, Type, TypeKind, UnaryOp, Variable,
};
pub use builder::AstBuilder;
pub use builtins::Builtin;
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use node::{NodeKind, NodeRef};
pub use node_id::{NodeId, NodeIdGen};
pub use span::Span;
