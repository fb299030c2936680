//! Statement nodes.

use crate::{NodeId, Span};

use super::{Expr, Variable};

/// `{ ... }`: an ordered statement sequence.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    pub span: Option<Span>,
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(span: Option<Span>, stmts: Vec<Stmt>) -> Self {
        Block { span, stmts }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Block(Block),
    IfElse {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        advance: Option<Expr>,
        body: Option<Box<Stmt>>,
    },
    Return(Option<Expr>),
    VariableDeclaration(Variable),
    Expression(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Option<Span>,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(id: NodeId, span: Option<Span>, kind: StmtKind) -> Self {
        Stmt { id, span, kind }
    }
}
