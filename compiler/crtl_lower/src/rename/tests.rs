#![expect(clippy::unwrap_used, reason = "tests unwrap freely")]

use super::*;
use crtl_diagnostic::ErrorCode;
use crtl_ir::ast::{BinaryOp, Primitive, Stage, StmtKind, Type};
use crtl_ir::visitor::Visitor;
use crtl_ir::{AstBuilder, Span};
use crtl_resolve::resolve;
use pretty_assertions::assert_eq;

fn float() -> Type {
    Type::primitive(Primitive::Float)
}

fn run(
    interner: &StringInterner,
    build: impl FnOnce(&mut AstBuilder<'_>),
) -> (Lowered<RenameMap>, ResolverPassResult) {
    let mut b = AstBuilder::new(interner);
    let builtins = b.builtin_declarations();
    build(&mut b);
    let ast = b.finish();
    let mut xref = resolve(&ast, &builtins, interner, DiagnosticConfig::unlimited());
    assert!(xref.has_errors().is_none(), "{:?}", xref.diagnostics());
    let lowered =
        rename_entry_point_params(ast, &mut xref, interner, DiagnosticConfig::unlimited());
    (lowered, xref)
}

/// Text of every variable reference in traversal order.
#[derive(Default)]
struct Texts(Vec<Name>);

impl<'ast> Visitor<'ast> for Texts {
    fn visit_variable_ref(&mut self, _expr: &'ast Expr, name: Name) {
        self.0.push(name);
    }
}

fn texts(ast: &Ast, interner: &StringInterner) -> Vec<&'static str> {
    let mut texts = Texts::default();
    texts.visit_ast(ast);
    texts.0.into_iter().map(|n| interner.lookup(n)).collect()
}

/// `float gain;` plus an entry point `name(float color)` whose body is
/// `color * gain;`.
fn entry(b: &mut AstBuilder<'_>, name: &str) {
    let color_param = b.param("color", float());
    let color = b.var("color");
    let gain = b.var("gain");
    let product = b.binary(BinaryOp::Mul, color, gain);
    let stmt = b.expr_stmt(product);
    let body = b.block(vec![stmt]);
    let ep = b.entry_point(name, Stage::Miss, vec![color_param], body);
    b.push(Decl::EntryPoint(ep));
}

#[test]
fn test_params_and_references_are_renamed() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        let gain = b.global("gain", float());
        b.push(Decl::GlobalParam(gain));
        entry(b, "MissA");
        entry(b, "MissB");
    });
    assert!(lowered.diagnostics.flush().is_empty());

    let params: Vec<_> = lowered
        .ast
        .entry_points()
        .flat_map(|e| &e.params)
        .map(|p| interner.lookup(p.symbol.name))
        .collect();
    assert_eq!(params, vec!["MissA_color", "MissB_color"]);

    // References to the global are untouched.
    assert_eq!(
        texts(&lowered.ast, &interner),
        vec!["MissA_color", "gain", "MissB_color", "gain"]
    );

    let renamed: Vec<_> = lowered
        .output
        .iter()
        .map(|p| {
            (
                interner.lookup(p.entry_point),
                interner.lookup(p.source_name),
                interner.lookup(p.output_name),
            )
        })
        .collect();
    assert_eq!(
        renamed,
        vec![
            ("MissA", "color", "MissA_color"),
            ("MissB", "color", "MissB_color"),
        ]
    );
}

#[test]
fn test_identity_is_preserved() {
    let interner = StringInterner::new();
    let (lowered, xref) = run(&interner, |b| {
        let gain = b.global("gain", float());
        b.push(Decl::GlobalParam(gain));
        entry(b, "Miss");
    });

    let ep = lowered.ast.entry_points().next().unwrap();
    let param = &ep.params[0];
    let renamed = lowered.output.get(param.id).unwrap();
    assert_eq!(renamed.output_name, param.symbol.name);
    assert_eq!(
        interner.lookup(xref.declaration(param.id).unwrap().name),
        "Miss_color"
    );

    // The body's reference still binds to the same declaration.
    let StmtKind::Expression(expr) = &ep.body.stmts[0].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Binary { left, .. } = &expr.kind else {
        panic!("expected binary, got {expr:?}");
    };
    assert_eq!(xref.variable_decl(left.id), Some(param.id));
}

#[test]
fn test_access_bases_and_indexes_are_renamed() {
    let interner = StringInterner::new();
    let (lowered, _) = run(&interner, |b| {
        // compute Fill(float values[4], int i) { values[i]; }
        let values_param = b.param("values", Type::array(float(), Some(4)));
        let i_param = b.param("i", Type::primitive(Primitive::Int));
        let i = b.var("i");
        let index = b.index_fragment(i);
        let read = b.access("values", vec![index]);
        let stmt = b.expr_stmt(read);
        let body = b.block(vec![stmt]);
        let ep = b.entry_point("Fill", Stage::Compute, vec![values_param, i_param], body);
        b.push(Decl::EntryPoint(ep));
    });
    assert_eq!(texts(&lowered.ast, &interner), vec!["Fill_values", "Fill_i"]);
}

#[test]
fn test_functions_are_left_alone() {
    let interner = StringInterner::new();
    let (lowered, _) = run(&interner, |b| {
        let x_param = b.param("x", float());
        let x = b.var("x");
        let ret = b.ret(Some(x));
        let body = b.block(vec![ret]);
        let f = b.function("identity", vec![x_param], float(), body);
        b.push(Decl::Function(f));
    });
    assert!(lowered.output.is_empty());
    assert_eq!(texts(&lowered.ast, &interner), vec!["x"]);
}

fn codes(lowered: &mut Lowered<RenameMap>) -> Vec<ErrorCode> {
    lowered.diagnostics.flush().iter().map(|d| d.code).collect()
}

#[test]
fn test_renamed_param_taken_by_global_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        b.at(1, 1);
        let taken = b.global("Main_x", float());
        b.push(Decl::GlobalParam(taken));
        // Main(float x) { x = Main_x; }
        b.at(4, 9);
        let x_param = b.param("x", float());
        let x = b.var("x");
        let global = b.var("Main_x");
        let store = b.assign(x, global);
        let stmt = b.expr_stmt(store);
        let body = b.block(vec![stmt]);
        let main = b.entry_point("Main", Stage::Miss, vec![x_param], body);
        b.push(Decl::EntryPoint(main));
    });
    let diagnostics = lowered.diagnostics.flush();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E2004);
    assert_eq!(diagnostics[0].primary_span(), Some(Span::new(4, 9)));
    let spans: Vec<_> = diagnostics[0].labels.iter().map(|l| l.span).collect();
    assert_eq!(spans, vec![Some(Span::new(4, 9)), Some(Span::new(1, 1))]);
}

#[test]
fn test_renamed_params_of_different_entry_points_collide() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        for (entry, param) in [("A", "b_c"), ("A_b", "c")] {
            let p = b.param(param, float());
            let read = b.var(param);
            let stmt = b.expr_stmt(read);
            let body = b.block(vec![stmt]);
            let ep = b.entry_point(entry, Stage::Miss, vec![p], body);
            b.push(Decl::EntryPoint(ep));
        }
    });
    assert_eq!(codes(&mut lowered), vec![ErrorCode::E2004]);
}

#[test]
fn test_renamed_param_shadowed_by_local_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        let p = b.param("x", float());
        let read = b.var("x");
        let local = b.variable("Main_x", float(), Some(read));
        let local = b.declare(local);
        let shadow = b.var("Main_x");
        let use_local = b.expr_stmt(shadow);
        let body = b.block(vec![local, use_local]);
        let ep = b.entry_point("Main", Stage::Miss, vec![p], body);
        b.push(Decl::EntryPoint(ep));
    });
    assert_eq!(codes(&mut lowered), vec![ErrorCode::E2004]);
}
