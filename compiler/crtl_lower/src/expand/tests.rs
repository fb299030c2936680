#![expect(clippy::unwrap_used, reason = "tests unwrap freely")]

use super::*;
use crtl_diagnostic::ErrorCode;
use crtl_ir::ast::{Primitive, ResourceAccess, Stage, StmtKind, Type};
use crtl_ir::visitor::Visitor;
use crtl_ir::AstBuilder;
use crtl_resolve::resolve;
use pretty_assertions::assert_eq;

fn float4() -> Type {
    Type::vector(Primitive::Float, 4)
}

/// `struct Params { float4 color; Buffer<float4> data; } Params params;`
fn declare_params(b: &mut AstBuilder<'_>) {
    let color = b.member("color", float4());
    let data = b.member("data", Type::buffer(float4(), ResourceAccess::ReadOnly));
    let decl = b.structure("Params", vec![color, data]);
    b.push(Decl::Struct(decl));
    let ty = b.struct_type("Params");
    let global = b.global("params", ty);
    b.push(Decl::GlobalParam(global));
}

/// Resolve and expand whatever `build` pushes.
fn run(
    interner: &StringInterner,
    build: impl FnOnce(&mut AstBuilder<'_>),
) -> (Lowered<ExpansionMap>, ResolverPassResult) {
    let mut b = AstBuilder::new(interner);
    let builtins = b.builtin_declarations();
    build(&mut b);
    let ast = b.finish();
    let mut xref = resolve(&ast, &builtins, interner, DiagnosticConfig::unlimited());
    assert!(xref.has_errors().is_none(), "{:?}", xref.diagnostics());
    let lowered = expand_struct_globals(ast, &mut xref, interner, DiagnosticConfig::unlimited());
    (lowered, xref)
}

fn codes(lowered: &mut Lowered<ExpansionMap>) -> Vec<ErrorCode> {
    lowered.diagnostics.flush().iter().map(|d| d.code).collect()
}

/// Variable references in traversal order, with the declaration each binds to.
struct Refs<'x> {
    xref: &'x ResolverPassResult,
    interner: &'x StringInterner,
    seen: Vec<(&'static str, Option<NodeId>)>,
}

impl<'ast> Visitor<'ast> for Refs<'_> {
    fn visit_variable_ref(&mut self, expr: &'ast Expr, name: Name) {
        self.seen
            .push((self.interner.lookup(name), self.xref.variable_decl(expr.id)));
    }
}

fn refs(
    ast: &Ast,
    xref: &ResolverPassResult,
    interner: &StringInterner,
) -> Vec<(&'static str, Option<NodeId>)> {
    let mut refs = Refs {
        xref,
        interner,
        seen: Vec::new(),
    };
    refs.visit_ast(ast);
    refs.seen
}

#[test]
fn test_struct_global_splits_per_member() {
    let interner = StringInterner::new();
    let (mut lowered, xref) = run(&interner, declare_params);
    assert_eq!(codes(&mut lowered), vec![]);

    let globals: Vec<_> = lowered.ast.global_params().collect();
    let names: Vec<_> = globals
        .iter()
        .map(|g| interner.lookup(g.symbol.name))
        .collect();
    assert_eq!(names, vec!["params_color", "params_data"]);
    assert_eq!(globals[0].symbol.ty, float4());
    assert_eq!(
        globals[1].symbol.ty,
        Type::buffer(float4(), ResourceAccess::ReadOnly)
    );
    assert!(globals.iter().all(|g| g.symbol.span.is_none()));

    assert_eq!(lowered.output.len(), 1);
    let expanded = lowered.output.iter().next().unwrap();
    assert_eq!(interner.lookup(expanded.original_name), "params");
    assert_eq!(expanded.members.len(), 2);
    for (member, global) in expanded.members.iter().zip(&globals) {
        assert_eq!(member.global, global.id);
        assert_eq!(member.global_name, global.symbol.name);
        let info = xref.declaration(global.id).unwrap();
        assert_eq!(info.kind, DeclKind::GlobalParam);
    }
    assert!(xref.declaration(expanded.original).is_none());
    assert!(lowered.output.get(expanded.original).is_some());
}

#[test]
fn test_member_access_is_rerouted() {
    let interner = StringInterner::new();
    let (mut lowered, xref) = run(&interner, |b| {
        declare_params(b);
        // raygeneration Main() { float4 c = params.color; params.data[0]; c; }
        b.at(5, 9);
        let color = b.member_fragment("color");
        let read_color = b.access("params", vec![color]);
        let c = b.variable("c", float4(), Some(read_color));
        let decl_c = b.declare(c);
        b.at(6, 5);
        let data = b.member_fragment("data");
        let zero = b.int(0);
        let index = b.index_fragment(zero);
        let read_data = b.access("params", vec![data, index]);
        let read_data = b.expr_stmt(read_data);
        let use_c = b.var("c");
        let use_c = b.expr_stmt(use_c);
        let body = b.block(vec![decl_c, read_data, use_c]);
        let main = b.entry_point("Main", Stage::RayGeneration, Vec::new(), body);
        b.push(Decl::EntryPoint(main));
    });
    assert_eq!(codes(&mut lowered), vec![]);

    let expanded = lowered.output.iter().next().unwrap();
    let color_global = expanded.members[0].global;
    let data_global = expanded.members[1].global;
    let seen = refs(&lowered.ast, &xref, &interner);
    assert_eq!(seen[0], ("params_color", Some(color_global)));
    assert_eq!(seen[1], ("params_data", Some(data_global)));
    assert_eq!(seen[2].0, "c");

    // The rerouted `params_data[0]` keeps its index and its source position.
    let main = lowered.ast.entry_points().next().unwrap();
    let StmtKind::Expression(expr) = &main.body.stmts[1].kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Access(access) = &expr.kind else {
        panic!("expected access, got {expr:?}");
    };
    assert_eq!(access.chain.len(), 1);
    assert!(matches!(access.chain[0], Fragment::Index(_)));
    assert_eq!(access.base.span, Some(Span::new(6, 5)));
}

#[test]
fn test_bare_reference_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        declare_params(b);
        b.at(7, 3);
        let whole = b.var("params");
        let stmt = b.expr_stmt(whole);
        let body = b.block(vec![stmt]);
        let main = b.entry_point("Main", Stage::RayGeneration, Vec::new(), body);
        b.push(Decl::EntryPoint(main));
    });
    let diagnostics = lowered.diagnostics.flush();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E2002);
    assert_eq!(diagnostics[0].primary_span(), Some(Span::new(7, 3)));
}

#[test]
fn test_leading_index_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        declare_params(b);
        let zero = b.int(0);
        let index = b.index_fragment(zero);
        let indexed = b.access("params", vec![index]);
        let stmt = b.expr_stmt(indexed);
        let body = b.block(vec![stmt]);
        let main = b.entry_point("Main", Stage::RayGeneration, Vec::new(), body);
        b.push(Decl::EntryPoint(main));
    });
    assert_eq!(codes(&mut lowered), vec![ErrorCode::E2002]);
}

#[test]
fn test_unknown_member_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        declare_params(b);
        let missing = b.member_fragment("alpha");
        let read = b.access("params", vec![missing]);
        let stmt = b.expr_stmt(read);
        let body = b.block(vec![stmt]);
        let main = b.entry_point("Main", Stage::RayGeneration, Vec::new(), body);
        b.push(Decl::EntryPoint(main));
    });
    assert_eq!(codes(&mut lowered), vec![ErrorCode::E2003]);
}

#[test]
fn test_nested_struct_member_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        let x = b.member("x", Type::primitive(Primitive::Float));
        let inner = b.structure("Inner", vec![x]);
        b.push(Decl::Struct(inner));
        let inner_ty = b.struct_type("Inner");
        let nested = b.member("inner", inner_ty);
        let outer = b.structure("Outer", vec![nested]);
        b.push(Decl::Struct(outer));
        let outer_ty = b.struct_type("Outer");
        let global = b.global("settings", outer_ty);
        b.push(Decl::GlobalParam(global));
    });
    assert_eq!(codes(&mut lowered), vec![ErrorCode::E2001]);
    assert!(lowered.output.is_empty());
    // The global is left in place for later phases to report on.
    assert_eq!(lowered.ast.global_params().count(), 1);
}

#[test]
fn test_non_struct_globals_pass_through() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        let global = b.global("exposure", Type::primitive(Primitive::Float));
        b.push(Decl::GlobalParam(global));
    });
    assert_eq!(codes(&mut lowered), vec![]);
    assert!(lowered.output.is_empty());
    let names: Vec<_> = lowered
        .ast
        .global_params()
        .map(|g| interner.lookup(g.symbol.name))
        .collect();
    assert_eq!(names, vec!["exposure"]);
}

#[test]
fn test_generated_name_taken_by_global_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        b.at(3, 1);
        declare_params(b);
        b.at(9, 1);
        let taken = b.global("params_color", Type::primitive(Primitive::Float));
        b.push(Decl::GlobalParam(taken));
    });
    let diagnostics = lowered.diagnostics.flush();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E2004);
    assert_eq!(diagnostics[0].primary_span(), Some(Span::new(3, 1)));
    let spans: Vec<_> = diagnostics[0].labels.iter().map(|l| l.span).collect();
    assert_eq!(spans, vec![Some(Span::new(3, 1)), Some(Span::new(9, 1))]);

    // Nothing is split, so the sidecar cannot list two `params_color`s.
    assert!(lowered.output.is_empty());
    let names: Vec<_> = lowered
        .ast
        .global_params()
        .map(|g| interner.lookup(g.symbol.name))
        .collect();
    assert_eq!(names, vec!["params", "params_color"]);
}

#[test]
fn test_generated_name_shadowed_by_local_is_rejected() {
    let interner = StringInterner::new();
    let (mut lowered, _) = run(&interner, |b| {
        declare_params(b);
        let member = b.member_fragment("data");
        let read = b.access("params", vec![member]);
        let read = b.expr_stmt(read);
        let local = b.variable("params_data", float4(), None);
        let local = b.declare(local);
        let body = b.block(vec![local, read]);
        let main = b.entry_point("Main", Stage::RayGeneration, Vec::new(), body);
        b.push(Decl::EntryPoint(main));
    });
    let found = codes(&mut lowered);
    assert!(found.contains(&ErrorCode::E2004), "{found:?}");
}
