use super::*;
use crate::ast::{BinaryOp, Primitive, Type, UnaryOp};
use crate::{AstBuilder, Name, StringInterner};
use pretty_assertions::assert_eq;

/// Deletes every reference to one variable name and records violations.
struct Eraser {
    target: Name,
    violations: Vec<RewriteViolation>,
}

impl Rewriter for Eraser {
    fn violation(&mut self, violation: RewriteViolation) {
        self.violations.push(violation);
    }

    fn rewrite_variable_ref(&mut self, expr: Expr) -> ExprResult {
        if expr.as_variable() == Some(self.target) {
            ExprResult::Removed
        } else {
            ExprResult::One(expr)
        }
    }
}

fn eraser(interner: &StringInterner, name: &str) -> Eraser {
    Eraser {
        target: interner.intern(name),
        violations: Vec::new(),
    }
}

#[test]
fn test_binary_collapses_to_surviving_side() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let gone = b.var("gone");
    let kept = b.var("kept");
    let expected = kept.clone();
    let sum = b.binary(BinaryOp::Add, gone, kept);

    let mut r = eraser(&interner, "gone");
    assert_eq!(r.rewrite_expr(sum), ExprResult::One(expected));
}

#[test]
fn test_binary_with_both_sides_removed_disappears() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let l = b.var("gone");
    let r_ = b.var("gone");
    let sum = b.binary(BinaryOp::Mul, l, r_);

    let mut r = eraser(&interner, "gone");
    assert_eq!(r.rewrite_expr(sum), ExprResult::Removed);
}

#[test]
fn test_unary_and_assignment_cascade() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let operand = b.var("gone");
    let neg = b.unary(UnaryOp::Negate, operand);
    let target = b.var("x");
    let value = b.var("gone");
    let assign = b.assign(target, value);

    let mut r = eraser(&interner, "gone");
    assert_eq!(r.rewrite_expr(neg), ExprResult::Removed);
    assert_eq!(r.rewrite_expr(assign), ExprResult::Removed);
    assert!(r.violations.is_empty());
}

#[test]
fn test_statement_cascade_in_block() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let gone = b.var("gone");
    let removed_stmt = b.expr_stmt(gone);
    let init = b.var("gone");
    let var = b.variable("y", Type::primitive(Primitive::Int), Some(init));
    let decl = b.declare(var);
    let kept = b.var("kept");
    let kept_stmt = b.expr_stmt(kept);
    let kept_id = kept_stmt.id;
    let block = b.block(vec![removed_stmt, decl, kept_stmt]);

    let mut r = eraser(&interner, "gone");
    let block = r.rewrite_block(block);
    // The expression statement vanishes; the declaration survives without
    // its initializer.
    assert_eq!(block.stmts.len(), 2);
    match &block.stmts[0].kind {
        StmtKind::VariableDeclaration(v) => assert!(v.init.is_none()),
        other => panic!("expected declaration, got {other:?}"),
    }
    assert_eq!(block.stmts[1].id, kept_id);
}

#[test]
fn test_removed_condition_is_a_violation() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let cond = b.var("gone");
    let body = b.block_stmt(Vec::new());
    let stmt = b.while_loop(cond, Some(body));
    let stmt_id = stmt.id;

    let mut r = eraser(&interner, "gone");
    assert_eq!(r.rewrite_stmt(stmt), Rewritten::Removed);
    assert_eq!(r.violations.len(), 1);
    assert_eq!(r.violations[0].node, stmt_id);
    assert_eq!(r.violations[0].kind, ViolationKind::ConditionRemoved);
}

#[test]
fn test_removed_call_argument_is_a_violation() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let arg = b.var("gone");
    let call = b.call("normalize", vec![arg], Vec::new());

    let mut r = eraser(&interner, "gone");
    assert_eq!(r.rewrite_expr(call), ExprResult::Removed);
    assert_eq!(r.violations[0].kind, ViolationKind::ArgumentRemoved);
}

#[test]
fn test_access_chain_is_opaque_by_default() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let index = b.var("gone");
    let fragment = b.index_fragment(index);
    let access = b.access("gone", vec![fragment]);
    let expected = access.clone();

    let mut r = eraser(&interner, "gone");
    assert_eq!(r.rewrite_expr(access), ExprResult::One(expected));
}

#[test]
fn test_rewrite_chain_reports_removed_index() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let kept = b.var("kept");
    let gone = b.var("gone");
    let member = b.member_fragment("data");
    let chain = vec![member, b.index_fragment(kept)];
    let owner = b.fresh_id();

    let mut r = eraser(&interner, "gone");
    let rewritten = rewrite_chain(&mut r, chain.clone(), owner, None);
    assert_eq!(rewritten, Some(chain));
    assert!(r.violations.is_empty());

    let bad = vec![b.index_fragment(gone)];
    assert_eq!(rewrite_chain(&mut r, bad, owner, None), None);
    assert_eq!(r.violations[0].kind, ViolationKind::IndexRemoved);
}

/// Expands every expression statement into two copies.
struct Doubler {
    ids: crate::NodeIdGen,
}

impl Rewriter for Doubler {
    fn violation(&mut self, _violation: RewriteViolation) {}

    fn rewrite_stmt(&mut self, stmt: Stmt) -> StmtResult {
        match &stmt.kind {
            StmtKind::Expression(_) => {
                let mut copy = stmt.clone();
                copy.id = self.ids.fresh();
                Rewritten::Many(vec![stmt, copy])
            }
            _ => walk_stmt(self, stmt),
        }
    }
}

#[test]
fn test_expansion_splices_into_block_and_wraps_mandatory_slot() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let e = b.var("x");
    let stmt = b.expr_stmt(e);
    let cond = b.var("c");
    let e2 = b.var("y");
    let then_stmt = b.expr_stmt(e2);
    let branch = b.if_else(cond, then_stmt, None);
    let block = b.block(vec![stmt, branch]);

    let mut r = Doubler {
        ids: crate::NodeIdGen::new(),
    };
    let block = r.rewrite_block(block);
    assert_eq!(block.stmts.len(), 3);
    match &block.stmts[2].kind {
        StmtKind::IfElse { then_branch, .. } => match &then_branch.kind {
            StmtKind::Block(inner) => assert_eq!(inner.stmts.len(), 2),
            other => panic!("expected wrapped block, got {other:?}"),
        },
        other => panic!("expected if, got {other:?}"),
    }
}
