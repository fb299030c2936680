//! Rewriting AST traversal.
//!
//! A [`Rewriter`] consumes nodes and returns a result per node category:
//! declarations and statements may be removed, replaced by one node, or
//! expanded into several; expressions may only be removed or replaced.
//!
//! Default implementations rebuild each node from its rewritten children
//! with these cascade rules:
//!
//! | Parent | Child removed | Outcome |
//! |--------|---------------|---------|
//! | `IfElse` / `While` / `For` | condition | [`RewriteViolation`] |
//! | `VariableDeclaration` | variable | statement removed |
//! | `ExpressionStatement` | expression | statement removed |
//! | `Unary` | operand | expression removed |
//! | `Binary` | one side | collapses to the other side |
//! | `Binary` | both sides | expression removed |
//! | `Assignment` | either side | expression removed |
//! | `FunctionCall` | argument | [`RewriteViolation`] |
//!
//! Access chains are opaque: [`Rewriter::rewrite_access`] returns the node
//! unchanged and [`walk_call`] rewrites only the arguments. A pass that
//! needs to look inside a chain overrides those methods and calls
//! [`rewrite_chain`], which rewrites every index expression through
//! [`Rewriter::rewrite_expr`].

use std::fmt;

use crate::ast::{
    Block, Call, Decl, EntryPoint, Expr, ExprKind, Fragment, Function, Stmt, StmtKind, TypeKind,
    Variable,
};
use crate::{NodeId, Span};

/// Result of rewriting a declaration or statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Rewritten<T> {
    /// Delete the node.
    Removed,
    /// Replace with one node of the same category.
    One(T),
    /// Replace with several nodes of the same category.
    Many(Vec<T>),
}

impl<T> Rewritten<T> {
    /// Append the surviving nodes to `out`.
    pub fn extend_into(self, out: &mut Vec<T>) {
        match self {
            Rewritten::Removed => {}
            Rewritten::One(node) => out.push(node),
            Rewritten::Many(nodes) => out.extend(nodes),
        }
    }
}

pub type DeclResult = Rewritten<Decl>;
pub type StmtResult = Rewritten<Stmt>;

/// Result of rewriting an expression. Expressions never expand.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprResult {
    Removed,
    One(Expr),
}

impl ExprResult {
    pub fn into_option(self) -> Option<Expr> {
        match self {
            ExprResult::Removed => None,
            ExprResult::One(expr) => Some(expr),
        }
    }
}

/// Result of rewriting a variable (parameter, local or top-level).
#[derive(Clone, Debug, PartialEq)]
pub enum VariableResult {
    Removed,
    One(Variable),
}

/// What a rewrite did that the tree shape cannot accept.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ViolationKind {
    /// The condition of an `if`/`while`/`for` was removed.
    ConditionRemoved,
    /// A call argument was removed.
    ArgumentRemoved,
    /// An array-index expression inside an access chain was removed.
    IndexRemoved,
    /// A `for` initializer expanded into several statements.
    InitializerExpanded,
}

/// A mandatory child disappeared during a rewrite. Always a compiler bug
/// in the rewriting pass, never a user error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RewriteViolation {
    /// Parent node whose child was lost.
    pub node: NodeId,
    pub span: Option<Span>,
    pub kind: ViolationKind,
}

impl fmt::Display for RewriteViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ViolationKind::ConditionRemoved => "loop or branch condition was removed",
            ViolationKind::ArgumentRemoved => "call argument was removed",
            ViolationKind::IndexRemoved => "index expression in access chain was removed",
            ViolationKind::InitializerExpanded => "`for` initializer expanded into many statements",
        };
        write!(f, "rewrite of {:?} failed: {what}", self.node)
    }
}

/// AST rewriter.
///
/// Implementors must provide [`Rewriter::violation`]; everything else has a
/// structural default.
pub trait Rewriter {
    /// Record a [`RewriteViolation`]. The offending parent is dropped.
    fn violation(&mut self, violation: RewriteViolation);

    fn rewrite_decl(&mut self, decl: Decl) -> DeclResult {
        walk_decl(self, decl)
    }

    fn rewrite_function(&mut self, function: Function) -> DeclResult {
        Rewritten::One(Decl::Function(walk_function(self, function)))
    }

    fn rewrite_entry_point(&mut self, entry: EntryPoint) -> DeclResult {
        Rewritten::One(Decl::EntryPoint(walk_entry_point(self, entry)))
    }

    fn rewrite_global_param(&mut self, global: crate::ast::GlobalParam) -> DeclResult {
        Rewritten::One(Decl::GlobalParam(global))
    }

    fn rewrite_struct(&mut self, decl: crate::ast::Struct) -> DeclResult {
        Rewritten::One(Decl::Struct(decl))
    }

    fn rewrite_variable(&mut self, var: Variable) -> VariableResult {
        walk_variable(self, var)
    }

    fn rewrite_block(&mut self, block: Block) -> Block {
        walk_block(self, block)
    }

    fn rewrite_stmt(&mut self, stmt: Stmt) -> StmtResult {
        walk_stmt(self, stmt)
    }

    fn rewrite_expr(&mut self, expr: Expr) -> ExprResult {
        walk_expr(self, expr)
    }

    /// `expr` is an [`ExprKind::Variable`].
    fn rewrite_variable_ref(&mut self, expr: Expr) -> ExprResult {
        ExprResult::One(expr)
    }

    /// `expr` is an [`ExprKind::Call`].
    fn rewrite_call(&mut self, expr: Expr) -> ExprResult {
        walk_call(self, expr)
    }

    /// `expr` is an [`ExprKind::Access`]. Opaque by default.
    fn rewrite_access(&mut self, expr: Expr) -> ExprResult {
        ExprResult::One(expr)
    }
}

/// Rewrite a list of top-level declarations.
pub fn rewrite_decls<R: Rewriter + ?Sized>(rewriter: &mut R, decls: Vec<Decl>) -> Vec<Decl> {
    let mut out = Vec::with_capacity(decls.len());
    for decl in decls {
        rewriter.rewrite_decl(decl).extend_into(&mut out);
    }
    out
}

pub fn walk_decl<R: Rewriter + ?Sized>(rewriter: &mut R, decl: Decl) -> DeclResult {
    match decl {
        Decl::Function(f) => rewriter.rewrite_function(f),
        Decl::EntryPoint(e) => rewriter.rewrite_entry_point(e),
        Decl::GlobalParam(g) => rewriter.rewrite_global_param(g),
        Decl::Struct(s) => rewriter.rewrite_struct(s),
        Decl::Variable(v) => match rewriter.rewrite_variable(v) {
            VariableResult::Removed => Rewritten::Removed,
            VariableResult::One(v) => Rewritten::One(Decl::Variable(v)),
        },
    }
}

fn rewrite_params<R: Rewriter + ?Sized>(rewriter: &mut R, params: Vec<Variable>) -> Vec<Variable> {
    params
        .into_iter()
        .filter_map(|p| match rewriter.rewrite_variable(p) {
            VariableResult::Removed => None,
            VariableResult::One(p) => Some(p),
        })
        .collect()
}

/// Rewrite parameters and body. The signature tracks the surviving parameters.
pub fn walk_function<R: Rewriter + ?Sized>(rewriter: &mut R, mut function: Function) -> Function {
    function.params = rewrite_params(rewriter, std::mem::take(&mut function.params));
    if let TypeKind::Function(sig) = &mut function.symbol.ty.kind {
        sig.params = function.params.iter().map(|p| p.symbol.ty.clone()).collect();
    }
    function.body = function.body.map(|body| rewriter.rewrite_block(body));
    function
}

pub fn walk_entry_point<R: Rewriter + ?Sized>(rewriter: &mut R, mut entry: EntryPoint) -> EntryPoint {
    entry.params = rewrite_params(rewriter, std::mem::take(&mut entry.params));
    if let TypeKind::EntryPoint(sig) = &mut entry.symbol.ty.kind {
        sig.params = entry.params.iter().map(|p| p.symbol.ty.clone()).collect();
    }
    entry.body = rewriter.rewrite_block(entry.body);
    entry
}

/// A removed initializer leaves the variable uninitialized.
pub fn walk_variable<R: Rewriter + ?Sized>(rewriter: &mut R, mut var: Variable) -> VariableResult {
    var.init = var
        .init
        .and_then(|init| rewriter.rewrite_expr(init).into_option());
    VariableResult::One(var)
}

/// Removed statements vanish; expanded statements are spliced in place.
pub fn walk_block<R: Rewriter + ?Sized>(rewriter: &mut R, block: Block) -> Block {
    let mut stmts = Vec::with_capacity(block.stmts.len());
    for stmt in block.stmts {
        rewriter.rewrite_stmt(stmt).extend_into(&mut stmts);
    }
    Block::new(block.span, stmts)
}

/// Collapse a statement result into one statement for a mandatory slot.
fn single_stmt(result: StmtResult, id: NodeId, span: Option<Span>) -> Stmt {
    match result {
        Rewritten::One(stmt) => stmt,
        Rewritten::Removed => Stmt::new(id, span, StmtKind::Block(Block::new(span, Vec::new()))),
        Rewritten::Many(stmts) => Stmt::new(id, span, StmtKind::Block(Block::new(span, stmts))),
    }
}

/// Collapse a statement result into an optional slot.
fn optional_stmt(result: StmtResult, id: NodeId, span: Option<Span>) -> Option<Box<Stmt>> {
    match result {
        Rewritten::Removed => None,
        other => Some(Box::new(single_stmt(other, id, span))),
    }
}

pub fn walk_stmt<R: Rewriter + ?Sized>(rewriter: &mut R, stmt: Stmt) -> StmtResult {
    let Stmt { id, span, kind } = stmt;
    let kind = match kind {
        StmtKind::Block(block) => StmtKind::Block(rewriter.rewrite_block(block)),
        StmtKind::IfElse {
            cond,
            then_branch,
            else_branch,
        } => {
            let ExprResult::One(cond) = rewriter.rewrite_expr(cond) else {
                rewriter.violation(RewriteViolation {
                    node: id,
                    span,
                    kind: ViolationKind::ConditionRemoved,
                });
                return Rewritten::Removed;
            };
            let (then_id, then_span) = (then_branch.id, then_branch.span);
            let then_branch = single_stmt(rewriter.rewrite_stmt(*then_branch), then_id, then_span);
            let else_branch = else_branch.and_then(|e| {
                let (else_id, else_span) = (e.id, e.span);
                optional_stmt(rewriter.rewrite_stmt(*e), else_id, else_span)
            });
            StmtKind::IfElse {
                cond,
                then_branch: Box::new(then_branch),
                else_branch,
            }
        }
        StmtKind::While { cond, body } => {
            let ExprResult::One(cond) = rewriter.rewrite_expr(cond) else {
                rewriter.violation(RewriteViolation {
                    node: id,
                    span,
                    kind: ViolationKind::ConditionRemoved,
                });
                return Rewritten::Removed;
            };
            let body = body.and_then(|b| {
                let (body_id, body_span) = (b.id, b.span);
                optional_stmt(rewriter.rewrite_stmt(*b), body_id, body_span)
            });
            StmtKind::While { cond, body }
        }
        StmtKind::For {
            init,
            cond,
            advance,
            body,
        } => {
            let init = match init.map(|i| rewriter.rewrite_stmt(*i)) {
                None | Some(Rewritten::Removed) => None,
                Some(Rewritten::One(init)) => Some(Box::new(init)),
                Some(Rewritten::Many(_)) => {
                    rewriter.violation(RewriteViolation {
                        node: id,
                        span,
                        kind: ViolationKind::InitializerExpanded,
                    });
                    return Rewritten::Removed;
                }
            };
            let cond = match cond {
                Some(cond) => match rewriter.rewrite_expr(cond) {
                    ExprResult::One(cond) => Some(cond),
                    ExprResult::Removed => {
                        rewriter.violation(RewriteViolation {
                            node: id,
                            span,
                            kind: ViolationKind::ConditionRemoved,
                        });
                        return Rewritten::Removed;
                    }
                },
                None => None,
            };
            let advance = advance.and_then(|a| rewriter.rewrite_expr(a).into_option());
            let body = body.and_then(|b| {
                let (body_id, body_span) = (b.id, b.span);
                optional_stmt(rewriter.rewrite_stmt(*b), body_id, body_span)
            });
            StmtKind::For {
                init,
                cond,
                advance,
                body,
            }
        }
        StmtKind::Return(value) => {
            StmtKind::Return(value.and_then(|v| rewriter.rewrite_expr(v).into_option()))
        }
        StmtKind::VariableDeclaration(var) => match rewriter.rewrite_variable(var) {
            VariableResult::Removed => return Rewritten::Removed,
            VariableResult::One(var) => StmtKind::VariableDeclaration(var),
        },
        StmtKind::Expression(expr) => match rewriter.rewrite_expr(expr) {
            ExprResult::Removed => return Rewritten::Removed,
            ExprResult::One(expr) => StmtKind::Expression(expr),
        },
    };
    Rewritten::One(Stmt::new(id, span, kind))
}

pub fn walk_expr<R: Rewriter + ?Sized>(rewriter: &mut R, expr: Expr) -> ExprResult {
    match expr.kind {
        ExprKind::Variable(_) => return rewriter.rewrite_variable_ref(expr),
        ExprKind::Call(_) => return rewriter.rewrite_call(expr),
        ExprKind::Access(_) => return rewriter.rewrite_access(expr),
        ExprKind::Constant(_)
        | ExprKind::Unary { .. }
        | ExprKind::Binary { .. }
        | ExprKind::Assignment { .. } => {}
    }

    let Expr { id, span, kind } = expr;
    let kind = match kind {
        ExprKind::Unary { op, operand } => match rewriter.rewrite_expr(*operand) {
            ExprResult::Removed => return ExprResult::Removed,
            ExprResult::One(operand) => ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
        },
        ExprKind::Binary { op, left, right } => {
            let left = rewriter.rewrite_expr(*left);
            let right = rewriter.rewrite_expr(*right);
            match (left, right) {
                (ExprResult::One(left), ExprResult::One(right)) => ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                (ExprResult::One(survivor), ExprResult::Removed)
                | (ExprResult::Removed, ExprResult::One(survivor)) => {
                    return ExprResult::One(survivor)
                }
                (ExprResult::Removed, ExprResult::Removed) => return ExprResult::Removed,
            }
        }
        ExprKind::Assignment { target, value } => {
            let target = rewriter.rewrite_expr(*target);
            let value = rewriter.rewrite_expr(*value);
            match (target, value) {
                (ExprResult::One(target), ExprResult::One(value)) => ExprKind::Assignment {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                _ => return ExprResult::Removed,
            }
        }
        other => other,
    };
    ExprResult::One(Expr::new(id, span, kind))
}

/// Rewrite call arguments. The trailing chain is left untouched.
pub fn walk_call<R: Rewriter + ?Sized>(rewriter: &mut R, expr: Expr) -> ExprResult {
    let Expr { id, span, kind } = expr;
    let Call {
        callee,
        args,
        chain,
    } = match kind {
        ExprKind::Call(call) => call,
        other => return ExprResult::One(Expr::new(id, span, other)),
    };

    let mut rewritten = Vec::with_capacity(args.len());
    for arg in args {
        match rewriter.rewrite_expr(arg) {
            ExprResult::One(arg) => rewritten.push(arg),
            ExprResult::Removed => {
                rewriter.violation(RewriteViolation {
                    node: id,
                    span,
                    kind: ViolationKind::ArgumentRemoved,
                });
                return ExprResult::Removed;
            }
        }
    }
    ExprResult::One(Expr::new(
        id,
        span,
        ExprKind::Call(Call {
            callee,
            args: rewritten,
            chain,
        }),
    ))
}

/// Rewrite the index expressions of an access chain.
///
/// Member fragments pass through. Returns `None` (after reporting a
/// violation against `owner`) if an index expression is removed.
pub fn rewrite_chain<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    chain: Vec<Fragment>,
    owner: NodeId,
    span: Option<Span>,
) -> Option<Vec<Fragment>> {
    let mut out = Vec::with_capacity(chain.len());
    for fragment in chain {
        match fragment {
            Fragment::Member { .. } => out.push(fragment),
            Fragment::Index(index) => match rewriter.rewrite_expr(index) {
                ExprResult::One(index) => out.push(Fragment::Index(index)),
                ExprResult::Removed => {
                    rewriter.violation(RewriteViolation {
                        node: owner,
                        span,
                        kind: ViolationKind::IndexRemoved,
                    });
                    return None;
                }
            },
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests;
