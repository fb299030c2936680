//! Expression nodes.

use crate::{Name, NodeId, Span};

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `!x`
    Not,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Mul,
    Div,
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
    Eq,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Ne => "!=",
            BinaryOp::Eq => "==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Typed literal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Constant {
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
}

/// One step of an access chain: `.member` or `[index]`.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    Member { name: Name, span: Option<Span> },
    Index(Expr),
}

/// `callee(args...)` with an optional trailing access chain on the result.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub callee: Name,
    pub args: Vec<Expr>,
    pub chain: Vec<Fragment>,
}

/// `base.member[index]...` where `base` is a variable reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Access {
    /// Always an [`ExprKind::Variable`].
    pub base: Box<Expr>,
    pub chain: Vec<Fragment>,
}

impl Access {
    /// Name of the base variable.
    pub fn base_name(&self) -> Option<Name> {
        match self.base.kind {
            ExprKind::Variable(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Reference to a variable by name. The resolver binds it to a declaration.
    Variable(Name),
    Constant(Constant),
    Call(Call),
    Access(Access),
    /// `target = value`; `target` is a `Variable` or `Access`.
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Option<Span>,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(id: NodeId, span: Option<Span>, kind: ExprKind) -> Self {
        Expr { id, span, kind }
    }

    /// Name of a plain variable reference.
    pub fn as_variable(&self) -> Option<Name> {
        match self.kind {
            ExprKind::Variable(name) => Some(name),
            _ => None,
        }
    }
}
