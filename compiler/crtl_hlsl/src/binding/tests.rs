#![expect(clippy::unwrap_used, reason = "tests unwrap freely")]

use super::*;
use crtl_diagnostic::ErrorCode;
use crtl_ir::ast::{Primitive, TypeKind};
use crtl_ir::AstBuilder;
use pretty_assertions::assert_eq;

fn float4() -> Type {
    Type::vector(Primitive::Float, 4)
}

fn param<'a>(interner: &StringInterner, name: &str, ty: &'a Type) -> Param<'a> {
    Param {
        decl: NodeId::new(100),
        name: interner.intern(name),
        span: None,
        ty,
    }
}

fn value_binding(binding: &ParamBinding) -> Binding {
    match &binding.kind {
        BindingKind::Value(value) => value.binding,
        BindingKind::Split(_) => panic!("expected a value binding"),
    }
}

#[test]
fn test_placement_table() {
    assert_eq!(placement(&float4()), Some(Placement::Constant));
    assert_eq!(
        placement(&Type::buffer(float4(), ResourceAccess::ReadOnly)),
        Some(Placement::Resource {
            class: RegisterClass::Srv,
            count: Some(1)
        })
    );
    assert_eq!(
        placement(&Type::texture(float4(), ResourceAccess::ReadWrite, 2)),
        Some(Placement::Resource {
            class: RegisterClass::Uav,
            count: Some(1)
        })
    );
    assert_eq!(
        placement(&Type::new(TypeKind::AccelerationStructure)),
        Some(Placement::Resource {
            class: RegisterClass::Srv,
            count: Some(1)
        })
    );
    assert_eq!(
        placement(&Type::array(float4(), Some(8))),
        Some(Placement::Constant)
    );
    assert_eq!(placement(&Type::array(float4(), None)), None);
    assert_eq!(placement(&Type::new(TypeKind::Ray)), None);
    assert_eq!(placement(&Type::void()), None);
}

#[test]
fn test_resource_arrays() {
    let interner = StringInterner::new();
    let mut alloc = RegisterAllocator::new();
    let texture = Type::texture(float4(), ResourceAccess::ReadOnly, 2);

    let sized = Type::array(texture.clone(), Some(4));
    let sized = bind_value(&mut alloc, &param(&interner, "maps", &sized), &interner).unwrap();
    let sized = value_binding(&sized);
    assert_eq!((sized.space, sized.slot, sized.count), (0, 0, Some(4)));

    let unbounded = Type::array(texture, None);
    let unbounded =
        bind_value(&mut alloc, &param(&interner, "all", &unbounded), &interner).unwrap();
    let unbounded = value_binding(&unbounded);
    assert_eq!((unbounded.space, unbounded.slot, unbounded.count), (1, 0, None));
}

#[test]
fn test_unbindable_value() {
    let interner = StringInterner::new();
    let mut alloc = RegisterAllocator::new();
    let ray = Type::new(TypeKind::Ray);
    let problem = bind_value(&mut alloc, &param(&interner, "r", &ray), &interner).unwrap_err();
    assert_eq!(
        problem.into_diagnostic(&interner).code,
        ErrorCode::E3001
    );
}

#[test]
fn test_struct_split_shares_one_constant_buffer() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let color = b.member("color", float4());
    let data = b.member("data", Type::buffer(float4(), ResourceAccess::ReadOnly));
    let exposure = b.member("exposure", Type::primitive(Primitive::Float));
    let decl = b.structure("Params", vec![color, data, exposure]);
    let ty = b.struct_type("Params");

    let mut alloc = RegisterAllocator::new();
    alloc.bind(RegisterClass::Cbv, 1);
    let bound = bind_split(&mut alloc, &param(&interner, "params", &ty), &decl, &interner).unwrap();
    let split = bound.as_split().unwrap();

    let cb = split.constant_buffer.as_ref().unwrap();
    assert_eq!(interner.lookup(cb.name), "params_cb");
    assert_eq!((cb.binding.class, cb.binding.slot), (RegisterClass::Cbv, 1));
    let contents: Vec<_> = cb.contents.iter().map(|n| interner.lookup(*n)).collect();
    assert_eq!(contents, vec!["params_color", "params_exposure"]);

    let members: Vec<_> = split
        .members
        .iter()
        .map(|m| (interner.lookup(m.output_name), m.binding.class, m.binding.slot))
        .collect();
    assert_eq!(
        members,
        vec![
            ("params_color", RegisterClass::Cbv, 1),
            ("params_data", RegisterClass::Srv, 0),
            ("params_exposure", RegisterClass::Cbv, 1),
        ]
    );
    assert_eq!(alloc.peek(RegisterClass::Cbv), (0, 2));
}

#[test]
fn test_resource_only_struct_has_no_constant_buffer() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let scene = b.member("scene", Type::new(TypeKind::AccelerationStructure));
    let decl = b.structure("World", vec![scene]);
    let ty = b.struct_type("World");

    let mut alloc = RegisterAllocator::new();
    let bound = bind_split(&mut alloc, &param(&interner, "world", &ty), &decl, &interner).unwrap();
    assert!(bound.as_split().unwrap().constant_buffer.is_none());
    assert_eq!(alloc.peek(RegisterClass::Cbv), (0, 0));
}

#[test]
fn test_nested_struct_is_rejected_before_allocation() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let color = b.member("color", float4());
    let inner_ty = b.struct_type("Inner");
    let inner = b.member("inner", inner_ty);
    let decl = b.structure("Outer", vec![color, inner]);
    let ty = b.struct_type("Outer");

    let mut alloc = RegisterAllocator::new();
    let problems =
        bind_split(&mut alloc, &param(&interner, "outer", &ty), &decl, &interner).unwrap_err();
    let codes: Vec<_> = problems
        .iter()
        .map(|p| p.into_diagnostic(&interner).code)
        .collect();
    assert_eq!(codes, vec![ErrorCode::E3004]);
    assert_eq!(alloc.peek(RegisterClass::Cbv), (0, 0));
}
