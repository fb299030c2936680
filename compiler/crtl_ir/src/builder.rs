//! Programmatic AST construction.
//!
//! The front end (and the test suites) build trees through [`AstBuilder`],
//! which interns names and numbers every node from one [`NodeIdGen`]. Builtin
//! declarations must come from the same builder so their ids never collide
//! with user nodes.

use crate::ast::{
    Access, Ast, BinaryOp, Block, Call, Constant, Decl, EntryPoint, Expr, ExprKind, Fragment,
    Function, GlobalParam, Stage, Stmt, StmtKind, Struct, StructMember, StructRef, Symbol, Type,
    TypeKind, UnaryOp, Variable,
};
use crate::builtins::Builtin;
use crate::{Name, NodeId, NodeIdGen, Span, StringInterner};

/// Builder for [`Ast`]s.
///
/// Nodes take the builder's current span (see [`AstBuilder::at`]); it
/// starts at `1:1`.
pub struct AstBuilder<'i> {
    interner: &'i StringInterner,
    ids: NodeIdGen,
    decls: Vec<Decl>,
    span: Option<Span>,
}

impl<'i> AstBuilder<'i> {
    pub fn new(interner: &'i StringInterner) -> Self {
        AstBuilder {
            interner,
            ids: NodeIdGen::new(),
            decls: Vec::new(),
            span: Some(Span::new(1, 1)),
        }
    }

    pub fn interner(&self) -> &'i StringInterner {
        self.interner
    }

    /// Set the source position for nodes built from here on.
    pub fn at(&mut self, line: u32, column: u32) -> &mut Self {
        self.span = Some(Span::new(line, column));
        self
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn fresh_id(&mut self) -> NodeId {
        self.ids.fresh()
    }

    /// Append a top-level declaration.
    pub fn push(&mut self, decl: Decl) -> NodeId {
        let id = decl.id();
        self.decls.push(decl);
        id
    }

    /// Declarations for every [`Builtin`], numbered from this builder.
    pub fn builtin_declarations(&mut self) -> Vec<Function> {
        Builtin::ALL
            .iter()
            .map(|builtin| {
                let id = self.ids.fresh();
                let name = self.interner.intern(builtin.name());
                Function::new(id, name, None, Vec::new(), builtin.return_type(), None)
            })
            .collect()
    }

    pub fn finish(self) -> Ast {
        Ast::new(self.decls, self.ids)
    }

    // Types

    pub fn struct_type(&mut self, name: &str) -> Type {
        let id = self.ids.fresh();
        Type::new(TypeKind::Struct(StructRef {
            id,
            name: self.interner.intern(name),
            span: self.span,
        }))
    }

    // Declarations

    pub fn variable(&mut self, name: &str, ty: Type, init: Option<Expr>) -> Variable {
        Variable {
            id: self.ids.fresh(),
            symbol: Symbol::new(self.interner.intern(name), self.span, ty),
            init,
        }
    }

    pub fn param(&mut self, name: &str, ty: Type) -> Variable {
        self.variable(name, ty, None)
    }

    pub fn global(&mut self, name: &str, ty: Type) -> GlobalParam {
        GlobalParam {
            id: self.ids.fresh(),
            symbol: Symbol::new(self.interner.intern(name), self.span, ty),
        }
    }

    pub fn member(&mut self, name: &str, ty: Type) -> StructMember {
        StructMember {
            id: self.ids.fresh(),
            symbol: Symbol::new(self.interner.intern(name), self.span, ty),
        }
    }

    pub fn structure(&mut self, name: &str, members: Vec<StructMember>) -> Struct {
        let id = self.ids.fresh();
        let self_ty = self.struct_type(name);
        Struct {
            id,
            symbol: Symbol::new(self.interner.intern(name), self.span, self_ty),
            members,
        }
    }

    pub fn function(
        &mut self,
        name: &str,
        params: Vec<Variable>,
        ret: Type,
        body: Block,
    ) -> Function {
        let id = self.ids.fresh();
        Function::new(
            id,
            self.interner.intern(name),
            self.span,
            params,
            ret,
            Some(body),
        )
    }

    pub fn entry_point(
        &mut self,
        name: &str,
        stage: Stage,
        params: Vec<Variable>,
        body: Block,
    ) -> EntryPoint {
        let id = self.ids.fresh();
        EntryPoint::new(id, self.interner.intern(name), self.span, params, stage, body)
    }

    // Statements

    pub fn block(&self, stmts: Vec<Stmt>) -> Block {
        Block::new(self.span, stmts)
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt::new(self.ids.fresh(), self.span, kind)
    }

    pub fn block_stmt(&mut self, stmts: Vec<Stmt>) -> Stmt {
        let block = self.block(stmts);
        self.stmt(StmtKind::Block(block))
    }

    pub fn declare(&mut self, var: Variable) -> Stmt {
        self.stmt(StmtKind::VariableDeclaration(var))
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expression(expr))
    }

    pub fn ret(&mut self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn if_else(&mut self, cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::IfElse {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_loop(&mut self, cond: Expr, body: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::While {
            cond,
            body: body.map(Box::new),
        })
    }

    pub fn for_loop(
        &mut self,
        init: Option<Stmt>,
        cond: Option<Expr>,
        advance: Option<Expr>,
        body: Option<Stmt>,
    ) -> Stmt {
        self.stmt(StmtKind::For {
            init: init.map(Box::new),
            cond,
            advance,
            body: body.map(Box::new),
        })
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr::new(self.ids.fresh(), self.span, kind)
    }

    pub fn var(&mut self, name: &str) -> Expr {
        let name = self.interner.intern(name);
        self.expr(ExprKind::Variable(name))
    }

    pub fn constant(&mut self, value: Constant) -> Expr {
        self.expr(ExprKind::Constant(value))
    }

    pub fn int(&mut self, value: i64) -> Expr {
        self.constant(Constant::Int(value))
    }

    pub fn float(&mut self, value: f32) -> Expr {
        self.constant(Constant::Float(value))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn call(&mut self, callee: &str, args: Vec<Expr>, chain: Vec<Fragment>) -> Expr {
        let callee = self.interner.intern(callee);
        self.expr(ExprKind::Call(Call {
            callee,
            args,
            chain,
        }))
    }

    /// `base.chain...` where `base` names a variable.
    pub fn access(&mut self, base: &str, chain: Vec<Fragment>) -> Expr {
        let base = self.var(base);
        self.expr(ExprKind::Access(Access {
            base: Box::new(base),
            chain,
        }))
    }

    pub fn assign(&mut self, target: Expr, value: Expr) -> Expr {
        self.expr(ExprKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn member_fragment(&self, name: &str) -> Fragment {
        Fragment::Member {
            name: self.interner.intern(name),
            span: self.span,
        }
    }

    pub fn index_fragment(&self, index: Expr) -> Fragment {
        Fragment::Index(index)
    }
}
