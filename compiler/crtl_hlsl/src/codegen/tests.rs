#![expect(clippy::unwrap_used, reason = "tests unwrap freely")]

use super::*;
use crtl_diagnostic::ErrorCode;
use crtl_ir::ast::{BinaryOp, Primitive, ResourceAccess};
use crtl_ir::AstBuilder;
use crtl_lower::{expand_struct_globals, rename_entry_point_params};
use crtl_resolve::resolve;
use pretty_assertions::assert_eq;

use crate::registers::RegisterClass;

fn float4() -> Type {
    Type::vector(Primitive::Float, 4)
}

fn int() -> Type {
    Type::primitive(Primitive::Int)
}

/// Resolve, lower and generate. `extra_builtins` are declared as builtins
/// alongside the standard catalogue.
fn compile_with(
    interner: &StringInterner,
    extra_builtins: &[&str],
    options: &CodegenOptions,
    build: impl FnOnce(&mut AstBuilder<'_>),
) -> Generated {
    let mut b = AstBuilder::new(interner);
    let mut builtins = b.builtin_declarations();
    for name in extra_builtins {
        let id = b.fresh_id();
        let name = b.name(name);
        builtins.push(Function::new(id, name, None, Vec::new(), Type::void(), None));
    }
    build(&mut b);
    let ast = b.finish();

    let config = DiagnosticConfig::unlimited();
    let mut xref = resolve(&ast, &builtins, interner, config);
    assert!(xref.has_errors().is_none(), "{:?}", xref.diagnostics());
    let expanded = expand_struct_globals(ast, &mut xref, interner, config);
    assert!(expanded.has_errors().is_none());
    let renamed = rename_entry_point_params(expanded.ast, &mut xref, interner, config);
    assert!(renamed.has_errors().is_none());
    generate(&renamed.ast, &xref, interner, options, config)
}

fn compile(interner: &StringInterner, build: impl FnOnce(&mut AstBuilder<'_>)) -> Generated {
    compile_with(interner, &[], &CodegenOptions::default(), build)
}

fn codes(generated: &mut Generated) -> Vec<ErrorCode> {
    generated.diagnostics.flush().iter().map(|d| d.code).collect()
}

/// `float4 color;` global and `raygeneration RayGen(Params params)` whose
/// struct is `{ float4 color; Buffer<float4> data; }`.
fn scenario(b: &mut AstBuilder<'_>, body: impl FnOnce(&mut AstBuilder<'_>) -> Vec<Stmt>) {
    let global = b.global("color", float4());
    b.push(Decl::GlobalParam(global));

    let color = b.member("color", float4());
    let data = b.member("data", Type::buffer(float4(), ResourceAccess::ReadOnly));
    let decl = b.structure("Params", vec![color, data]);
    b.push(Decl::Struct(decl));

    let params_ty = b.struct_type("Params");
    let params = b.param("params", params_ty);
    let stmts = body(b);
    let body = b.block(stmts);
    let entry = b.entry_point("RayGen", Stage::RayGeneration, vec![params], body);
    b.push(Decl::EntryPoint(entry));
}

#[test]
fn test_end_to_end_bindings() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        scenario(b, |b| {
            // float4 c = params.color * color;
            let member = b.member_fragment("color");
            let tint = b.access("params", vec![member]);
            let color = b.var("color");
            let product = b.binary(BinaryOp::Mul, tint, color);
            let c = b.variable("c", float4(), Some(product));
            let decl = b.declare(c);
            // params.data[0] = c;
            let data = b.member_fragment("data");
            let zero = b.int(0);
            let index = b.index_fragment(zero);
            let target = b.access("params", vec![data, index]);
            let c = b.var("c");
            let store = b.assign(target, c);
            let store = b.expr_stmt(store);
            vec![decl, store]
        });
    });
    assert_eq!(codes(&mut generated), vec![]);

    let bindings: Vec<_> = generated.bindings.iter().collect();
    assert_eq!(bindings.len(), 2);
    let BindingKind::Value(color) = &bindings[0].kind else {
        panic!("`color` should be a value binding");
    };
    assert_eq!(interner.lookup(bindings[0].output_name), "color");
    assert_eq!(
        (color.binding.class, color.binding.space, color.binding.slot),
        (RegisterClass::Cbv, 0, 0)
    );

    let split = bindings[1].as_split().unwrap();
    assert_eq!(interner.lookup(bindings[1].output_name), "RayGen_params");
    let cb = split.constant_buffer.as_ref().unwrap();
    assert_eq!((cb.binding.class, cb.binding.slot), (RegisterClass::Cbv, 1));
    let data = &split.members[1];
    assert_eq!(
        (data.binding.class, data.binding.space, data.binding.slot),
        (RegisterClass::Srv, 0, 0)
    );

    let expected = "\
cbuffer color_cb : register(b0, space0)
{
    float4 color;
};

struct Params
{
    float4 color;
    StructuredBuffer<float4> data;
};

cbuffer RayGen_params_cb : register(b1, space0)
{
    float4 RayGen_params_color;
};
StructuredBuffer<float4> RayGen_params_data : register(t0, space0);

[shader(\"raygeneration\")]
void RayGen()
{
    float4 c = RayGen_params_color * color;
    RayGen_params_data[0] = c;
}
";
    assert_eq!(generated.source, expected);
}

#[test]
fn test_control_flow_layout() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        let n_param = b.param("n", int());

        let zero = b.int(0);
        let acc = b.variable("acc", int(), Some(zero));
        let decl_acc = b.declare(acc);

        let zero = b.int(0);
        let i = b.variable("i", int(), Some(zero));
        let init = b.declare(i);
        let i = b.var("i");
        let n = b.var("n");
        let cond = b.binary(BinaryOp::Lt, i, n);
        let i = b.var("i");
        let one = b.int(1);
        let next = b.binary(BinaryOp::Add, i, one);
        let i = b.var("i");
        let advance = b.assign(i, next);

        let i = b.var("i");
        let two = b.int(2);
        let big = b.binary(BinaryOp::Gt, i, two);
        let acc = b.var("acc");
        let i = b.var("i");
        let sum = b.binary(BinaryOp::Add, acc, i);
        let acc = b.var("acc");
        let add = b.assign(acc, sum);
        let add = b.expr_stmt(add);
        let acc = b.var("acc");
        let one = b.int(1);
        let diff = b.binary(BinaryOp::Sub, acc, one);
        let acc = b.var("acc");
        let sub = b.assign(acc, diff);
        let sub = b.expr_stmt(sub);
        let branch = b.if_else(big, add, Some(sub));
        let body = b.block_stmt(vec![branch]);
        let for_loop = b.for_loop(Some(init), Some(cond), Some(advance), Some(body));

        let acc = b.var("acc");
        let hundred = b.int(100);
        let over = b.binary(BinaryOp::Gt, acc, hundred);
        let acc = b.var("acc");
        let two = b.int(2);
        let half = b.binary(BinaryOp::Div, acc, two);
        let acc = b.var("acc");
        let halve = b.assign(acc, half);
        let halve = b.expr_stmt(halve);
        let while_loop = b.while_loop(over, Some(halve));

        let acc = b.var("acc");
        let ret = b.ret(Some(acc));
        let body = b.block(vec![decl_acc, for_loop, while_loop, ret]);
        let f = b.function("count", vec![n_param], int(), body);
        b.push(Decl::Function(f));
    });
    assert_eq!(codes(&mut generated), vec![]);
    let expected = "\
int count(int n)
{
    int acc = 0;
    for (int i = 0; i < n; i = i + 1)
    {
        if (i > 2)
        {
            acc = acc + i;
        }
        else
        {
            acc = acc - 1;
        }
    }
    while (acc > 100)
    {
        acc = acc / 2;
    }
    return acc;
}
";
    assert_eq!(generated.source, expected);
}

#[test]
fn test_nested_binary_operands_are_parenthesized() {
    let interner = StringInterner::new();
    let generated = compile(&interner, |b| {
        let x = b.param("x", int());
        let left = b.var("x");
        let one = b.int(1);
        let sum = b.binary(BinaryOp::Add, left, one);
        let two = b.int(2);
        let product = b.binary(BinaryOp::Mul, sum, two);
        let negated = b.unary(crtl_ir::UnaryOp::Negate, product);
        let ret = b.ret(Some(negated));
        let body = b.block(vec![ret]);
        let f = b.function("f", vec![x], int(), body);
        b.push(Decl::Function(f));
    });
    assert!(generated.source.contains("return -((x + 1) * 2);"));
}

#[test]
fn test_builtin_calls_are_translated() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        // uint3 pixel = dispatch_rays_index();
        let call = b.call("dispatch_rays_index", Vec::new(), Vec::new());
        let pixel = b.variable("pixel", Type::vector(Primitive::Uint, 3), Some(call));
        let pixel = b.declare(pixel);
        // float4 m = mix(a, b, 0.5) with a trailing `.x` chain.
        let a = b.float(0.0);
        let c = b.float(1.0);
        let t = b.float(0.5);
        let x = b.member_fragment("x");
        let mix = b.call("mix", vec![a, c, t], vec![x]);
        let m = b.variable("m", Type::primitive(Primitive::Float), Some(mix));
        let m = b.declare(m);
        // make_ray(...)
        let args = (0..4).map(|_| b.float(1.0)).collect();
        let ray = b.call("make_ray", args, Vec::new());
        let r = b.variable("r", Type::new(TypeKind::Ray), Some(ray));
        let r = b.declare(r);
        let body = b.block(vec![pixel, m, r]);
        let entry = b.entry_point("Main", Stage::RayGeneration, Vec::new(), body);
        b.push(Decl::EntryPoint(entry));
    });
    assert_eq!(codes(&mut generated), vec![]);
    let source = &generated.source;
    assert!(source.contains("uint3 pixel = DispatchRaysIndex();"), "{source}");
    assert!(source.contains("float m = lerp(0.0, 1.0, 0.5).x;"), "{source}");
    assert!(
        source.contains("RayDesc r = crtl_make_ray(1.0, 1.0, 1.0, 1.0);"),
        "{source}"
    );
    assert!(source.starts_with("RayDesc crtl_make_ray("), "{source}");
}

#[test]
fn test_unrecognized_builtin() {
    let interner = StringInterner::new();
    let mut generated = compile_with(
        &interner,
        &["printf"],
        &CodegenOptions::default(),
        |b| {
            let call = b.call("printf", Vec::new(), Vec::new());
            let stmt = b.expr_stmt(call);
            let body = b.block(vec![stmt]);
            let entry = b.entry_point("Main", Stage::Miss, Vec::new(), body);
            b.push(Decl::EntryPoint(entry));
        },
    );
    assert_eq!(codes(&mut generated), vec![ErrorCode::E4001]);
}

#[test]
fn test_compute_thread_group_size() {
    let interner = StringInterner::new();
    let options = CodegenOptions {
        threads: [64, 1, 1],
    };
    let generated = compile_with(&interner, &[], &options, |b| {
        let body = b.block(Vec::new());
        let entry = b.entry_point("Clear", Stage::Compute, Vec::new(), body);
        b.push(Decl::EntryPoint(entry));
    });
    assert_eq!(
        generated.source,
        "[numthreads(64, 1, 1)]\nvoid Clear(uint3 crtl_thread_id : SV_DispatchThreadID)\n{\n}\n"
    );
}

#[test]
fn test_bare_split_parameter_is_rejected() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        scenario(b, |b| {
            let whole = b.var("params");
            vec![b.expr_stmt(whole)]
        });
    });
    assert_eq!(codes(&mut generated), vec![ErrorCode::E3003]);
}

#[test]
fn test_unknown_split_member_is_rejected() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        scenario(b, |b| {
            let alpha = b.member_fragment("alpha");
            let read = b.access("params", vec![alpha]);
            vec![b.expr_stmt(read)]
        });
    });
    assert_eq!(codes(&mut generated), vec![ErrorCode::E2003]);
}

#[test]
fn test_unbindable_parameter() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        let ray = b.global("ray", Type::new(TypeKind::Ray));
        b.push(Decl::GlobalParam(ray));
    });
    assert_eq!(codes(&mut generated), vec![ErrorCode::E3001]);
    assert!(generated.bindings.is_empty());
}

#[test]
fn test_mismatched_entry_point_type() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        let body = b.block(Vec::new());
        let mut entry = b.entry_point("Hit", Stage::ClosestHit, Vec::new(), body);
        entry.stage = Stage::AnyHit;
        b.push(Decl::EntryPoint(entry));
    });
    assert_eq!(codes(&mut generated), vec![ErrorCode::E3002]);
}

#[test]
fn test_resource_arrays_and_uavs() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        let texture = Type::texture(float4(), ResourceAccess::ReadOnly, 2);
        let maps = b.global("maps", Type::array(texture.clone(), Some(4)));
        b.push(Decl::GlobalParam(maps));
        let all = b.global("all", Type::array(texture, None));
        b.push(Decl::GlobalParam(all));
        let target = Type::texture(float4(), ResourceAccess::ReadWrite, 2);
        let output = b.global("output", target);
        b.push(Decl::GlobalParam(output));
        let scene = b.global("scene", Type::new(TypeKind::AccelerationStructure));
        b.push(Decl::GlobalParam(scene));
    });
    assert_eq!(codes(&mut generated), vec![]);
    let expected = "\
Texture2D<float4> maps[4] : register(t0, space0);

Texture2D<float4> all[] : register(t0, space1);

RWTexture2D<float4> output : register(u0, space0);

RaytracingAccelerationStructure scene : register(t0, space2);
";
    assert_eq!(generated.source, expected);
}

#[test]
fn test_nested_negation_is_not_a_decrement() {
    let interner = StringInterner::new();
    let generated = compile(&interner, |b| {
        // float f(float x) { float y = -(-x); return -(-5); }
        let x = b.param("x", Type::primitive(Primitive::Float));
        let read = b.var("x");
        let inner = b.unary(crtl_ir::UnaryOp::Negate, read);
        let outer = b.unary(crtl_ir::UnaryOp::Negate, inner);
        let y = b.variable("y", Type::primitive(Primitive::Float), Some(outer));
        let y = b.declare(y);
        let five = b.int(-5);
        let negated = b.unary(crtl_ir::UnaryOp::Negate, five);
        let ret = b.ret(Some(negated));
        let body = b.block(vec![y, ret]);
        let f = b.function("f", vec![x], int(), body);
        b.push(Decl::Function(f));
    });
    let source = &generated.source;
    assert!(source.contains("float y = -(-x);"), "{source}");
    assert!(source.contains("return -(-5);"), "{source}");
    assert!(!source.contains("--"), "{source}");
}

#[test]
fn test_non_finite_literals_use_bit_patterns() {
    assert_eq!(constant(Constant::Float(f32::INFINITY)), "asfloat(0x7f800000)");
    assert_eq!(constant(Constant::Float(f32::NEG_INFINITY)), "asfloat(0xff800000)");
    assert_eq!(constant(Constant::Float(f32::NAN)), "asfloat(0x7fc00000)");
    assert_eq!(
        constant(Constant::Double(f64::INFINITY)),
        "asdouble(0x00000000, 0x7ff00000)"
    );
    assert_eq!(constant(Constant::Float(1.5)), "1.5");
}

#[test]
fn test_compute_ray_index_reads_thread_id() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        // uint3 id = dispatch_rays_index();
        let call = b.call("dispatch_rays_index", Vec::new(), Vec::new());
        let id = b.variable("id", Type::vector(Primitive::Uint, 3), Some(call));
        let id = b.declare(id);
        let body = b.block(vec![id]);
        let entry = b.entry_point("Main", Stage::Compute, Vec::new(), body);
        b.push(Decl::EntryPoint(entry));
    });
    assert_eq!(codes(&mut generated), vec![]);
    assert_eq!(
        generated.source,
        "[numthreads(8, 8, 1)]
void Main(uint3 crtl_thread_id : SV_DispatchThreadID)
{
    uint3 id = crtl_thread_id;
}
"
    );
}

#[test]
fn test_ray_only_builtin_in_compute_is_rejected() {
    let interner = StringInterner::new();
    let mut generated = compile(&interner, |b| {
        let call = b.call("dispatch_rays_dimensions", Vec::new(), Vec::new());
        let size = b.variable("size", Type::vector(Primitive::Uint, 3), Some(call));
        let size = b.declare(size);
        let body = b.block(vec![size]);
        let entry = b.entry_point("Main", Stage::Compute, Vec::new(), body);
        b.push(Decl::EntryPoint(entry));
    });
    assert_eq!(codes(&mut generated), vec![ErrorCode::E4003]);
}
