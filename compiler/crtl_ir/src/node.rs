//! Uniform view over AST nodes.
//!
//! [`NodeRef`] lets generic code (statistics, debug dumps, completeness
//! checks) enumerate a node's kind, source reference and immediate children
//! without a per-variant visitor.

use crate::ast::{
    Decl, Expr, ExprKind, Fragment, Stmt, StmtKind, StructMember, Type, TypeKind, Variable,
};
use crate::{NodeId, Span};

/// Kind tag, one per concrete node variant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    // Declarations
    Function,
    EntryPoint,
    GlobalParam,
    Struct,
    StructMember,
    Variable,
    // Statements
    Block,
    IfElse,
    While,
    For,
    Return,
    VariableDeclaration,
    ExpressionStatement,
    // Expressions
    Unary,
    Binary,
    VariableRef,
    Constant,
    FunctionCall,
    StructArrayAccess,
    Assignment,
    // Types
    PrimitiveType,
    VectorType,
    MatrixType,
    StructType,
    FunctionType,
    EntryPointType,
    BufferType,
    TextureType,
    AccelerationStructureType,
    RayType,
    ArrayType,
}

/// Borrowed reference to any node.
#[derive(Copy, Clone, Debug)]
pub enum NodeRef<'a> {
    Decl(&'a Decl),
    Member(&'a StructMember),
    Variable(&'a Variable),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Type(&'a Type),
}

impl<'a> NodeRef<'a> {
    pub fn kind(self) -> NodeKind {
        match self {
            NodeRef::Decl(d) => match d {
                Decl::Function(_) => NodeKind::Function,
                Decl::EntryPoint(_) => NodeKind::EntryPoint,
                Decl::GlobalParam(_) => NodeKind::GlobalParam,
                Decl::Struct(_) => NodeKind::Struct,
                Decl::Variable(_) => NodeKind::Variable,
            },
            NodeRef::Member(_) => NodeKind::StructMember,
            NodeRef::Variable(_) => NodeKind::Variable,
            NodeRef::Stmt(s) => match s.kind {
                StmtKind::Block(_) => NodeKind::Block,
                StmtKind::IfElse { .. } => NodeKind::IfElse,
                StmtKind::While { .. } => NodeKind::While,
                StmtKind::For { .. } => NodeKind::For,
                StmtKind::Return(_) => NodeKind::Return,
                StmtKind::VariableDeclaration(_) => NodeKind::VariableDeclaration,
                StmtKind::Expression(_) => NodeKind::ExpressionStatement,
            },
            NodeRef::Expr(e) => match e.kind {
                ExprKind::Unary { .. } => NodeKind::Unary,
                ExprKind::Binary { .. } => NodeKind::Binary,
                ExprKind::Variable(_) => NodeKind::VariableRef,
                ExprKind::Constant(_) => NodeKind::Constant,
                ExprKind::Call(_) => NodeKind::FunctionCall,
                ExprKind::Access(_) => NodeKind::StructArrayAccess,
                ExprKind::Assignment { .. } => NodeKind::Assignment,
            },
            NodeRef::Type(t) => match t.kind {
                TypeKind::Primitive(_) => NodeKind::PrimitiveType,
                TypeKind::Vector { .. } => NodeKind::VectorType,
                TypeKind::Matrix { .. } => NodeKind::MatrixType,
                TypeKind::Struct(_) => NodeKind::StructType,
                TypeKind::Function(_) => NodeKind::FunctionType,
                TypeKind::EntryPoint(_) => NodeKind::EntryPointType,
                TypeKind::Buffer { .. } => NodeKind::BufferType,
                TypeKind::Texture { .. } => NodeKind::TextureType,
                TypeKind::AccelerationStructure => NodeKind::AccelerationStructureType,
                TypeKind::Ray => NodeKind::RayType,
                TypeKind::Array { .. } => NodeKind::ArrayType,
            },
        }
    }

    /// Identity, if the node has one. Only struct-typed annotations carry an
    /// id among types.
    pub fn id(self) -> Option<NodeId> {
        match self {
            NodeRef::Decl(d) => Some(d.id()),
            NodeRef::Member(m) => Some(m.id),
            NodeRef::Variable(v) => Some(v.id),
            NodeRef::Stmt(s) => Some(s.id),
            NodeRef::Expr(e) => Some(e.id),
            NodeRef::Type(t) => t.as_struct().map(|s| s.id),
        }
    }

    /// Source reference; `None` for synthesized nodes.
    pub fn span(self) -> Option<Span> {
        match self {
            NodeRef::Decl(d) => d.symbol().span,
            NodeRef::Member(m) => m.symbol.span,
            NodeRef::Variable(v) => v.symbol.span,
            NodeRef::Stmt(s) => s.span,
            NodeRef::Expr(e) => e.span,
            NodeRef::Type(t) => t.as_struct().and_then(|s| s.span),
        }
    }

    /// Immediate children in traversal order.
    pub fn children(self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match self {
            NodeRef::Decl(d) => match d {
                Decl::Function(f) => {
                    out.extend(f.params.iter().map(NodeRef::Variable));
                    if let Some(ret) = f.return_type() {
                        out.push(NodeRef::Type(ret));
                    }
                    if let Some(body) = &f.body {
                        out.extend(body.stmts.iter().map(NodeRef::Stmt));
                    }
                }
                Decl::EntryPoint(e) => {
                    out.extend(e.params.iter().map(NodeRef::Variable));
                    out.extend(e.body.stmts.iter().map(NodeRef::Stmt));
                }
                Decl::GlobalParam(g) => out.push(NodeRef::Type(&g.symbol.ty)),
                Decl::Struct(s) => out.extend(s.members.iter().map(NodeRef::Member)),
                Decl::Variable(v) => variable_children(v, &mut out),
            },
            NodeRef::Member(m) => out.push(NodeRef::Type(&m.symbol.ty)),
            NodeRef::Variable(v) => variable_children(v, &mut out),
            NodeRef::Stmt(s) => match &s.kind {
                StmtKind::Block(b) => out.extend(b.stmts.iter().map(NodeRef::Stmt)),
                StmtKind::IfElse {
                    cond,
                    then_branch,
                    else_branch,
                } => {
                    out.push(NodeRef::Expr(cond));
                    out.push(NodeRef::Stmt(then_branch));
                    out.extend(else_branch.as_deref().map(NodeRef::Stmt));
                }
                StmtKind::While { cond, body } => {
                    out.push(NodeRef::Expr(cond));
                    out.extend(body.as_deref().map(NodeRef::Stmt));
                }
                StmtKind::For {
                    init,
                    cond,
                    advance,
                    body,
                } => {
                    out.extend(init.as_deref().map(NodeRef::Stmt));
                    out.extend(cond.as_ref().map(NodeRef::Expr));
                    out.extend(advance.as_ref().map(NodeRef::Expr));
                    out.extend(body.as_deref().map(NodeRef::Stmt));
                }
                StmtKind::Return(value) => out.extend(value.as_ref().map(NodeRef::Expr)),
                StmtKind::VariableDeclaration(v) => out.push(NodeRef::Variable(v)),
                StmtKind::Expression(e) => out.push(NodeRef::Expr(e)),
            },
            NodeRef::Expr(e) => match &e.kind {
                ExprKind::Unary { operand, .. } => out.push(NodeRef::Expr(operand)),
                ExprKind::Binary { left, right, .. } => {
                    out.push(NodeRef::Expr(left));
                    out.push(NodeRef::Expr(right));
                }
                ExprKind::Variable(_) | ExprKind::Constant(_) => {}
                ExprKind::Call(call) => {
                    out.extend(call.args.iter().map(NodeRef::Expr));
                    chain_children(&call.chain, &mut out);
                }
                ExprKind::Access(access) => {
                    out.push(NodeRef::Expr(&access.base));
                    chain_children(&access.chain, &mut out);
                }
                ExprKind::Assignment { target, value } => {
                    out.push(NodeRef::Expr(target));
                    out.push(NodeRef::Expr(value));
                }
            },
            NodeRef::Type(t) => match &t.kind {
                TypeKind::Buffer { element, .. }
                | TypeKind::Texture { element, .. }
                | TypeKind::Array { element, .. } => out.push(NodeRef::Type(element)),
                _ => {}
            },
        }
        out
    }

    /// Depth-first pre-order walk over this node and all descendants.
    pub fn for_each_descendant(self, f: &mut impl FnMut(NodeRef<'a>)) {
        f(self);
        for child in self.children() {
            child.for_each_descendant(f);
        }
    }
}

fn variable_children<'a>(v: &'a Variable, out: &mut Vec<NodeRef<'a>>) {
    out.push(NodeRef::Type(&v.symbol.ty));
    out.extend(v.init.as_ref().map(NodeRef::Expr));
}

fn chain_children<'a>(chain: &'a [Fragment], out: &mut Vec<NodeRef<'a>>) {
    for fragment in chain {
        if let Fragment::Index(index) = fragment {
            out.push(NodeRef::Expr(index));
        }
    }
}

/// Count the nodes of every declaration in `decls`.
pub fn count_nodes(decls: &[Decl]) -> usize {
    let mut count = 0;
    for decl in decls {
        NodeRef::Decl(decl).for_each_descendant(&mut |_| count += 1);
    }
    count
}
