//! Read-only AST traversal.
//!
//! `visit_*` methods dispatch on the node kind, one method per concrete
//! variant. Every default implementation calls the matching `walk_*`
//! function, which visits the node's children in source order and discards
//! results. Analyses override only the variants they care about and call
//! `walk_*` themselves to keep descending.
//!
//! # Example
//!
//! ```text
//! struct CountCalls {
//!     count: usize,
//! }
//!
//! impl<'ast> Visitor<'ast> for CountCalls {
//!     fn visit_call(&mut self, expr: &'ast Expr, call: &'ast Call) {
//!         self.count += 1;
//!         walk_call(self, call);
//!     }
//! }
//! ```

use crate::ast::{
    Access, Ast, BinaryOp, Block, Call, Constant, Decl, EntryPoint, Expr, ExprKind, Fragment,
    Function, GlobalParam, Stmt, StmtKind, Struct, StructMember, StructRef, Type, TypeKind,
    UnaryOp, Variable,
};
use crate::Name;

/// AST visitor.
///
/// The visitor may mutate its own state; the AST stays immutable.
pub trait Visitor<'ast> {
    fn visit_ast(&mut self, ast: &'ast Ast) {
        walk_ast(self, ast);
    }

    fn visit_decl(&mut self, decl: &'ast Decl) {
        walk_decl(self, decl);
    }

    // Declarations

    fn visit_function(&mut self, function: &'ast Function) {
        walk_function(self, function);
    }

    fn visit_entry_point(&mut self, entry: &'ast EntryPoint) {
        walk_entry_point(self, entry);
    }

    fn visit_global_param(&mut self, global: &'ast GlobalParam) {
        self.visit_type(&global.symbol.ty);
    }

    fn visit_struct(&mut self, decl: &'ast Struct) {
        walk_struct(self, decl);
    }

    fn visit_struct_member(&mut self, member: &'ast StructMember) {
        self.visit_type(&member.symbol.ty);
    }

    /// Local, parameter or top-level variable.
    fn visit_variable(&mut self, var: &'ast Variable) {
        walk_variable(self, var);
    }

    // Statements

    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_if_else(
        &mut self,
        _stmt: &'ast Stmt,
        cond: &'ast Expr,
        then_branch: &'ast Stmt,
        else_branch: Option<&'ast Stmt>,
    ) {
        self.visit_expr(cond);
        self.visit_stmt(then_branch);
        if let Some(else_branch) = else_branch {
            self.visit_stmt(else_branch);
        }
    }

    fn visit_while(&mut self, _stmt: &'ast Stmt, cond: &'ast Expr, body: Option<&'ast Stmt>) {
        self.visit_expr(cond);
        if let Some(body) = body {
            self.visit_stmt(body);
        }
    }

    fn visit_for(
        &mut self,
        _stmt: &'ast Stmt,
        init: Option<&'ast Stmt>,
        cond: Option<&'ast Expr>,
        advance: Option<&'ast Expr>,
        body: Option<&'ast Stmt>,
    ) {
        walk_for(self, init, cond, advance, body);
    }

    fn visit_return(&mut self, _stmt: &'ast Stmt, value: Option<&'ast Expr>) {
        if let Some(value) = value {
            self.visit_expr(value);
        }
    }

    fn visit_var_decl(&mut self, _stmt: &'ast Stmt, var: &'ast Variable) {
        self.visit_variable(var);
    }

    fn visit_expr_stmt(&mut self, _stmt: &'ast Stmt, expr: &'ast Expr) {
        self.visit_expr(expr);
    }

    // Expressions

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_unary(&mut self, _expr: &'ast Expr, _op: UnaryOp, operand: &'ast Expr) {
        self.visit_expr(operand);
    }

    fn visit_binary(
        &mut self,
        _expr: &'ast Expr,
        _op: BinaryOp,
        left: &'ast Expr,
        right: &'ast Expr,
    ) {
        self.visit_expr(left);
        self.visit_expr(right);
    }

    /// Reference to a variable by name. No children.
    fn visit_variable_ref(&mut self, _expr: &'ast Expr, _name: Name) {}

    fn visit_constant(&mut self, _expr: &'ast Expr, _value: &'ast Constant) {}

    fn visit_call(&mut self, _expr: &'ast Expr, call: &'ast Call) {
        walk_call(self, call);
    }

    fn visit_access(&mut self, _expr: &'ast Expr, access: &'ast Access) {
        walk_access(self, access);
    }

    fn visit_assignment(&mut self, _expr: &'ast Expr, target: &'ast Expr, value: &'ast Expr) {
        self.visit_expr(target);
        self.visit_expr(value);
    }

    fn visit_fragment(&mut self, fragment: &'ast Fragment) {
        if let Fragment::Index(index) = fragment {
            self.visit_expr(index);
        }
    }

    // Types

    fn visit_type(&mut self, ty: &'ast Type) {
        walk_type(self, ty);
    }

    /// Usage of a struct type by name.
    fn visit_struct_ref(&mut self, _struct_ref: &'ast StructRef) {}
}

// Walk functions
//
// Children are visited depth-first, left to right, in declaration order.

pub fn walk_ast<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, ast: &'ast Ast) {
    for decl in &ast.decls {
        visitor.visit_decl(decl);
    }
}

pub fn walk_decl<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, decl: &'ast Decl) {
    match decl {
        Decl::Function(f) => visitor.visit_function(f),
        Decl::EntryPoint(e) => visitor.visit_entry_point(e),
        Decl::GlobalParam(g) => visitor.visit_global_param(g),
        Decl::Struct(s) => visitor.visit_struct(s),
        Decl::Variable(v) => visitor.visit_variable(v),
    }
}

/// Parameters, return type, then body.
pub fn walk_function<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, function: &'ast Function) {
    for param in &function.params {
        visitor.visit_variable(param);
    }
    if let Some(ret) = function.return_type() {
        visitor.visit_type(ret);
    }
    if let Some(body) = &function.body {
        visitor.visit_block(body);
    }
}

pub fn walk_entry_point<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, entry: &'ast EntryPoint) {
    for param in &entry.params {
        visitor.visit_variable(param);
    }
    visitor.visit_block(&entry.body);
}

pub fn walk_struct<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, decl: &'ast Struct) {
    for member in &decl.members {
        visitor.visit_struct_member(member);
    }
}

/// Type annotation, then initializer.
pub fn walk_variable<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, var: &'ast Variable) {
    visitor.visit_type(&var.symbol.ty);
    if let Some(init) = &var.init {
        visitor.visit_expr(init);
    }
}

pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

/// Dispatch a statement to its per-variant method.
pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Block(block) => visitor.visit_block(block),
        StmtKind::IfElse {
            cond,
            then_branch,
            else_branch,
        } => visitor.visit_if_else(stmt, cond, then_branch, else_branch.as_deref()),
        StmtKind::While { cond, body } => visitor.visit_while(stmt, cond, body.as_deref()),
        StmtKind::For {
            init,
            cond,
            advance,
            body,
        } => visitor.visit_for(
            stmt,
            init.as_deref(),
            cond.as_ref(),
            advance.as_ref(),
            body.as_deref(),
        ),
        StmtKind::Return(value) => visitor.visit_return(stmt, value.as_ref()),
        StmtKind::VariableDeclaration(var) => visitor.visit_var_decl(stmt, var),
        StmtKind::Expression(expr) => visitor.visit_expr_stmt(stmt, expr),
    }
}

pub fn walk_for<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    init: Option<&'ast Stmt>,
    cond: Option<&'ast Expr>,
    advance: Option<&'ast Expr>,
    body: Option<&'ast Stmt>,
) {
    if let Some(init) = init {
        visitor.visit_stmt(init);
    }
    if let Some(cond) = cond {
        visitor.visit_expr(cond);
    }
    if let Some(advance) = advance {
        visitor.visit_expr(advance);
    }
    if let Some(body) = body {
        visitor.visit_stmt(body);
    }
}

/// Dispatch an expression to its per-variant method.
pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Unary { op, operand } => visitor.visit_unary(expr, *op, operand),
        ExprKind::Binary { op, left, right } => visitor.visit_binary(expr, *op, left, right),
        ExprKind::Variable(name) => visitor.visit_variable_ref(expr, *name),
        ExprKind::Constant(value) => visitor.visit_constant(expr, value),
        ExprKind::Call(call) => visitor.visit_call(expr, call),
        ExprKind::Access(access) => visitor.visit_access(expr, access),
        ExprKind::Assignment { target, value } => visitor.visit_assignment(expr, target, value),
    }
}

/// Arguments, then the trailing chain.
pub fn walk_call<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, call: &'ast Call) {
    for arg in &call.args {
        visitor.visit_expr(arg);
    }
    for fragment in &call.chain {
        visitor.visit_fragment(fragment);
    }
}

/// Base variable, then the chain.
pub fn walk_access<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, access: &'ast Access) {
    visitor.visit_expr(&access.base);
    for fragment in &access.chain {
        visitor.visit_fragment(fragment);
    }
}

pub fn walk_type<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, ty: &'ast Type) {
    match &ty.kind {
        TypeKind::Struct(s) => visitor.visit_struct_ref(s),
        TypeKind::Buffer { element, .. }
        | TypeKind::Texture { element, .. }
        | TypeKind::Array { element, .. } => visitor.visit_type(element),
        TypeKind::Function(sig) => {
            for param in &sig.params {
                visitor.visit_type(param);
            }
            visitor.visit_type(&sig.ret);
        }
        TypeKind::EntryPoint(sig) => {
            for param in &sig.params {
                visitor.visit_type(param);
            }
        }
        TypeKind::Primitive(_)
        | TypeKind::Vector { .. }
        | TypeKind::Matrix { .. }
        | TypeKind::AccelerationStructure
        | TypeKind::Ray => {}
    }
}
