//! Parse-tree hand-off.
//!
//! The external front end parses CRTL source and serializes its parse tree
//! as JSON. This module deserializes that tree and replays it through an
//! [`AstBuilder`], so every node is numbered from one generator together
//! with the builtin declarations.
//!
//! Every node is an object tagged by `kind`. Positions are optional
//! `"pos": { "line": 3, "column": 5 }` fields; a node without one inherits
//! the last position seen.
//!
//! ```text
//! { "declarations": [
//!     { "kind": "global_param", "name": "color",
//!       "type": { "kind": "vector", "element": "float", "len": 4 } },
//!     { "kind": "entry_point", "name": "RayGen", "stage": "raygeneration",
//!       "params": [], "body": [] }
//! ] }
//! ```

use serde::Deserialize;

use crtl_ir::ast::{
    Ast, BinaryOp, Constant, Decl, Expr, Fragment, Function, Modifiers, Primitive,
    ResourceAccess, Stage, Stmt, StructMember, Type, TypeKind, UnaryOp, Variable,
};
use crtl_ir::{AstBuilder, StringInterner};

/// A parse tree that names something the compiler does not know.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrontendError {
    #[error("unknown shader stage `{0}`")]
    UnknownStage(String),
    #[error("unknown scalar type `{0}`")]
    UnknownScalar(String),
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Root of a serialized parse tree.
#[derive(Debug, Deserialize)]
pub struct ParseTree {
    pub declarations: Vec<DeclNode>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclNode {
    Function {
        name: String,
        #[serde(default)]
        params: Vec<VariableNode>,
        #[serde(rename = "return")]
        ret: TypeNode,
        body: Vec<StmtNode>,
        pos: Option<Position>,
    },
    EntryPoint {
        name: String,
        stage: String,
        #[serde(default)]
        params: Vec<VariableNode>,
        body: Vec<StmtNode>,
        pos: Option<Position>,
    },
    GlobalParam {
        name: String,
        #[serde(rename = "type")]
        ty: TypeNode,
        #[serde(default)]
        modifiers: Vec<String>,
        pos: Option<Position>,
    },
    Struct {
        name: String,
        members: Vec<MemberNode>,
        pos: Option<Position>,
    },
    Variable(VariableNode),
}

/// Local, parameter or top-level variable.
#[derive(Debug, Deserialize)]
pub struct VariableNode {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub init: Option<ExprNode>,
    pub pos: Option<Position>,
}

#[derive(Debug, Deserialize)]
pub struct MemberNode {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
    pub pos: Option<Position>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    Scalar {
        name: String,
    },
    Vector {
        element: String,
        len: u8,
    },
    Matrix {
        element: String,
        rows: u8,
        cols: u8,
    },
    Struct {
        name: String,
        pos: Option<Position>,
    },
    Buffer {
        element: Box<TypeNode>,
        #[serde(default)]
        writable: bool,
    },
    Texture {
        element: Box<TypeNode>,
        dims: u8,
        #[serde(default)]
        writable: bool,
    },
    AccelerationStructure,
    Ray,
    Array {
        element: Box<TypeNode>,
        #[serde(default)]
        len: Option<u32>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StmtNode {
    Block {
        stmts: Vec<StmtNode>,
        pos: Option<Position>,
    },
    If {
        cond: ExprNode,
        then: Box<StmtNode>,
        #[serde(default, rename = "else")]
        otherwise: Option<Box<StmtNode>>,
        pos: Option<Position>,
    },
    While {
        cond: ExprNode,
        #[serde(default)]
        body: Option<Box<StmtNode>>,
        pos: Option<Position>,
    },
    For {
        #[serde(default)]
        init: Option<Box<StmtNode>>,
        #[serde(default)]
        cond: Option<ExprNode>,
        #[serde(default)]
        advance: Option<ExprNode>,
        #[serde(default)]
        body: Option<Box<StmtNode>>,
        pos: Option<Position>,
    },
    Return {
        #[serde(default)]
        value: Option<ExprNode>,
        pos: Option<Position>,
    },
    Declare {
        variable: VariableNode,
    },
    Expression {
        expr: ExprNode,
        pos: Option<Position>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprNode {
    Unary {
        op: String,
        operand: Box<ExprNode>,
        pos: Option<Position>,
    },
    Binary {
        op: String,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
        pos: Option<Position>,
    },
    Variable {
        name: String,
        pos: Option<Position>,
    },
    Bool {
        value: bool,
        pos: Option<Position>,
    },
    Int {
        value: i64,
        pos: Option<Position>,
    },
    Float {
        value: f32,
        pos: Option<Position>,
    },
    Double {
        value: f64,
        pos: Option<Position>,
    },
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<ExprNode>,
        #[serde(default)]
        chain: Vec<FragmentNode>,
        pos: Option<Position>,
    },
    Access {
        base: String,
        chain: Vec<FragmentNode>,
        pos: Option<Position>,
    },
    Assign {
        target: Box<ExprNode>,
        value: Box<ExprNode>,
        pos: Option<Position>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FragmentNode {
    Member { name: String, pos: Option<Position> },
    Index { index: ExprNode },
}

/// A built program: the tree plus builtin declarations numbered from the
/// same generator.
#[derive(Debug)]
pub struct Program {
    pub ast: Ast,
    pub builtins: Vec<Function>,
}

/// Replay `tree` into an [`Ast`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn build_program(tree: &ParseTree, interner: &StringInterner) -> Result<Program, FrontendError> {
    let mut b = AstBuilder::new(interner);
    let builtins = b.builtin_declarations();
    let mut replay = Replay { b: &mut b };
    for decl in &tree.declarations {
        let decl = replay.decl(decl)?;
        replay.b.push(decl);
    }
    let ast = b.finish();
    tracing::debug!(decls = ast.decls.len(), "parse tree replayed");
    Ok(Program { ast, builtins })
}

struct Replay<'b, 'i> {
    b: &'b mut AstBuilder<'i>,
}

impl Replay<'_, '_> {
    fn locate(&mut self, pos: Option<Position>) {
        if let Some(pos) = pos {
            self.b.at(pos.line, pos.column);
        }
    }

    fn decl(&mut self, node: &DeclNode) -> Result<Decl, FrontendError> {
        Ok(match node {
            DeclNode::Function {
                name,
                params,
                ret,
                body,
                pos,
            } => {
                let params = self.variables(params)?;
                let ret = self.ty(ret)?;
                let body = self.stmts(body)?;
                self.locate(*pos);
                let body = self.b.block(body);
                Decl::Function(self.b.function(name, params, ret, body))
            }
            DeclNode::EntryPoint {
                name,
                stage,
                params,
                body,
                pos,
            } => {
                let stage =
                    Stage::from_name(stage).ok_or_else(|| FrontendError::UnknownStage(stage.clone()))?;
                let params = self.variables(params)?;
                let body = self.stmts(body)?;
                self.locate(*pos);
                let body = self.b.block(body);
                Decl::EntryPoint(self.b.entry_point(name, stage, params, body))
            }
            DeclNode::GlobalParam {
                name,
                ty,
                modifiers,
                pos,
            } => {
                let ty = self.ty(ty)?.with_modifiers(modifier_set(modifiers)?);
                self.locate(*pos);
                Decl::GlobalParam(self.b.global(name, ty))
            }
            DeclNode::Struct { name, members, pos } => {
                let members = members
                    .iter()
                    .map(|m| self.member(m))
                    .collect::<Result<Vec<_>, _>>()?;
                self.locate(*pos);
                Decl::Struct(self.b.structure(name, members))
            }
            DeclNode::Variable(var) => Decl::Variable(self.variable(var)?),
        })
    }

    fn member(&mut self, node: &MemberNode) -> Result<StructMember, FrontendError> {
        let ty = self.ty(&node.ty)?;
        self.locate(node.pos);
        Ok(self.b.member(&node.name, ty))
    }

    fn variables(&mut self, nodes: &[VariableNode]) -> Result<Vec<Variable>, FrontendError> {
        nodes.iter().map(|v| self.variable(v)).collect()
    }

    fn variable(&mut self, node: &VariableNode) -> Result<Variable, FrontendError> {
        let ty = self.ty(&node.ty)?.with_modifiers(modifier_set(&node.modifiers)?);
        let init = node.init.as_ref().map(|e| self.expr(e)).transpose()?;
        self.locate(node.pos);
        Ok(self.b.variable(&node.name, ty, init))
    }

    fn ty(&mut self, node: &TypeNode) -> Result<Type, FrontendError> {
        Ok(match node {
            TypeNode::Scalar { name } => Type::primitive(scalar(name)?),
            TypeNode::Vector { element, len } => Type::vector(scalar(element)?, *len),
            TypeNode::Matrix {
                element,
                rows,
                cols,
            } => Type::matrix(scalar(element)?, *rows, *cols),
            TypeNode::Struct { name, pos } => {
                self.locate(*pos);
                self.b.struct_type(name)
            }
            TypeNode::Buffer { element, writable } => {
                Type::buffer(self.ty(element)?, access(*writable))
            }
            TypeNode::Texture {
                element,
                dims,
                writable,
            } => Type::texture(self.ty(element)?, access(*writable), *dims),
            TypeNode::AccelerationStructure => Type::new(TypeKind::AccelerationStructure),
            TypeNode::Ray => Type::new(TypeKind::Ray),
            TypeNode::Array { element, len } => Type::array(self.ty(element)?, *len),
        })
    }

    fn stmts(&mut self, nodes: &[StmtNode]) -> Result<Vec<Stmt>, FrontendError> {
        nodes.iter().map(|s| self.stmt(s)).collect()
    }

    fn boxed_stmt(&mut self, node: Option<&StmtNode>) -> Result<Option<Stmt>, FrontendError> {
        node.map(|s| self.stmt(s)).transpose()
    }

    fn stmt(&mut self, node: &StmtNode) -> Result<Stmt, FrontendError> {
        Ok(match node {
            StmtNode::Block { stmts, pos } => {
                let stmts = self.stmts(stmts)?;
                self.locate(*pos);
                self.b.block_stmt(stmts)
            }
            StmtNode::If {
                cond,
                then,
                otherwise,
                pos,
            } => {
                let cond = self.expr(cond)?;
                let then = self.stmt(then)?;
                let otherwise = self.boxed_stmt(otherwise.as_deref())?;
                self.locate(*pos);
                self.b.if_else(cond, then, otherwise)
            }
            StmtNode::While { cond, body, pos } => {
                let cond = self.expr(cond)?;
                let body = self.boxed_stmt(body.as_deref())?;
                self.locate(*pos);
                self.b.while_loop(cond, body)
            }
            StmtNode::For {
                init,
                cond,
                advance,
                body,
                pos,
            } => {
                let init = self.boxed_stmt(init.as_deref())?;
                let cond = self.optional_expr(cond.as_ref())?;
                let advance = self.optional_expr(advance.as_ref())?;
                let body = self.boxed_stmt(body.as_deref())?;
                self.locate(*pos);
                self.b.for_loop(init, cond, advance, body)
            }
            StmtNode::Return { value, pos } => {
                let value = self.optional_expr(value.as_ref())?;
                self.locate(*pos);
                self.b.ret(value)
            }
            StmtNode::Declare { variable } => {
                let var = self.variable(variable)?;
                self.b.declare(var)
            }
            StmtNode::Expression { expr, pos } => {
                let expr = self.expr(expr)?;
                self.locate(*pos);
                self.b.expr_stmt(expr)
            }
        })
    }

    fn optional_expr(&mut self, node: Option<&ExprNode>) -> Result<Option<Expr>, FrontendError> {
        node.map(|e| self.expr(e)).transpose()
    }

    fn expr(&mut self, node: &ExprNode) -> Result<Expr, FrontendError> {
        Ok(match node {
            ExprNode::Unary { op, operand, pos } => {
                let op = unary_op(op)?;
                let operand = self.expr(operand)?;
                self.locate(*pos);
                self.b.unary(op, operand)
            }
            ExprNode::Binary {
                op,
                left,
                right,
                pos,
            } => {
                let op = binary_op(op)?;
                let left = self.expr(left)?;
                let right = self.expr(right)?;
                self.locate(*pos);
                self.b.binary(op, left, right)
            }
            ExprNode::Variable { name, pos } => {
                self.locate(*pos);
                self.b.var(name)
            }
            ExprNode::Bool { value, pos } => self.constant(Constant::Bool(*value), *pos),
            ExprNode::Int { value, pos } => self.constant(Constant::Int(*value), *pos),
            ExprNode::Float { value, pos } => self.constant(Constant::Float(*value), *pos),
            ExprNode::Double { value, pos } => self.constant(Constant::Double(*value), *pos),
            ExprNode::Call {
                callee,
                args,
                chain,
                pos,
            } => {
                let args = args
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<Result<Vec<_>, _>>()?;
                let chain = self.chain(chain)?;
                self.locate(*pos);
                self.b.call(callee, args, chain)
            }
            ExprNode::Access { base, chain, pos } => {
                let chain = self.chain(chain)?;
                self.locate(*pos);
                self.b.access(base, chain)
            }
            ExprNode::Assign { target, value, pos } => {
                let target = self.expr(target)?;
                let value = self.expr(value)?;
                self.locate(*pos);
                self.b.assign(target, value)
            }
        })
    }

    fn constant(&mut self, value: Constant, pos: Option<Position>) -> Expr {
        self.locate(pos);
        self.b.constant(value)
    }

    fn chain(&mut self, nodes: &[FragmentNode]) -> Result<Vec<Fragment>, FrontendError> {
        nodes
            .iter()
            .map(|fragment| match fragment {
                FragmentNode::Member { name, pos } => {
                    self.locate(*pos);
                    Ok(self.b.member_fragment(name))
                }
                FragmentNode::Index { index } => {
                    let index = self.expr(index)?;
                    Ok(self.b.index_fragment(index))
                }
            })
            .collect()
    }
}

fn scalar(name: &str) -> Result<Primitive, FrontendError> {
    Ok(match name {
        "bool" => Primitive::Bool,
        "int" => Primitive::Int,
        "uint" => Primitive::Uint,
        "float" => Primitive::Float,
        "double" => Primitive::Double,
        "void" => Primitive::Void,
        _ => return Err(FrontendError::UnknownScalar(name.to_owned())),
    })
}

fn access(writable: bool) -> ResourceAccess {
    if writable {
        ResourceAccess::ReadWrite
    } else {
        ResourceAccess::ReadOnly
    }
}

fn modifier_set(names: &[String]) -> Result<Modifiers, FrontendError> {
    names.iter().try_fold(Modifiers::empty(), |set, name| {
        let flag = match name.as_str() {
            "const" => Modifiers::CONST,
            "in" => Modifiers::IN,
            "out" => Modifiers::OUT,
            "inout" => Modifiers::INOUT,
            _ => return Err(FrontendError::UnknownModifier(name.clone())),
        };
        Ok(set | flag)
    })
}

fn unary_op(symbol: &str) -> Result<UnaryOp, FrontendError> {
    [UnaryOp::Negate, UnaryOp::Not]
        .into_iter()
        .find(|op| op.as_symbol() == symbol)
        .ok_or_else(|| FrontendError::UnknownOperator(symbol.to_owned()))
}

fn binary_op(symbol: &str) -> Result<BinaryOp, FrontendError> {
    const OPS: [BinaryOp; 12] = [
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
        BinaryOp::Ne,
        BinaryOp::Eq,
        BinaryOp::And,
        BinaryOp::Or,
    ];
    OPS.into_iter()
        .find(|op| op.as_symbol() == symbol)
        .ok_or_else(|| FrontendError::UnknownOperator(symbol.to_owned()))
}
