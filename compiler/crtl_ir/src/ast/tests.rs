use super::*;
use crate::{AstBuilder, NodeKind, NodeRef, StringInterner};

#[test]
fn test_modifier_conflicts() {
    assert_eq!(Modifiers::empty().conflict(), None);
    assert_eq!((Modifiers::CONST | Modifiers::IN).conflict(), None);
    assert_eq!((Modifiers::IN | Modifiers::OUT).conflict(), None);
    assert_eq!(
        (Modifiers::CONST | Modifiers::OUT).conflict(),
        Some(ModifierConflict::ConstWritable)
    );
    assert_eq!(
        (Modifiers::CONST | Modifiers::INOUT).conflict(),
        Some(ModifierConflict::ConstWritable)
    );
    assert_eq!(
        (Modifiers::INOUT | Modifiers::IN).conflict(),
        Some(ModifierConflict::InOutRedundant)
    );
}

#[test]
fn test_type_categories() {
    assert!(Type::vector(Primitive::Float, 4).is_numeric());
    assert!(Type::matrix(Primitive::Float, 4, 4).is_numeric());
    assert!(!Type::void().is_numeric());
    let buffer = Type::buffer(Type::vector(Primitive::Float, 4), ResourceAccess::ReadOnly);
    assert!(buffer.is_resource());
    assert!(!buffer.is_numeric());
    assert!(Type::new(TypeKind::AccelerationStructure).is_resource());
    assert!(!Type::new(TypeKind::Ray).is_resource());
}

#[test]
fn test_type_display() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let cases = [
        (Type::vector(Primitive::Float, 4), "float4"),
        (Type::matrix(Primitive::Float, 3, 4), "float3x4"),
        (
            Type::buffer(Type::vector(Primitive::Float, 4), ResourceAccess::ReadWrite),
            "RWBuffer<float4>",
        ),
        (
            Type::texture(Type::vector(Primitive::Float, 4), ResourceAccess::ReadOnly, 2),
            "Texture2D<float4>",
        ),
        (
            Type::array(
                Type::texture(Type::vector(Primitive::Float, 4), ResourceAccess::ReadOnly, 2),
                None,
            ),
            "Texture2D<float4>[]",
        ),
        (b.struct_type("Params"), "Params"),
    ];
    for (ty, expected) in cases {
        assert_eq!(ty.display(&interner).to_string(), expected);
    }
}

#[test]
fn test_function_signature_is_inferred() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let a = b.param("a", Type::primitive(Primitive::Int));
    let body = b.block(Vec::new());
    let f = b.function("f", vec![a], Type::primitive(Primitive::Float), body);
    let sig = f.signature().map(|s| s.params.len());
    assert_eq!(sig, Some(1));
    assert_eq!(f.return_type(), Some(&Type::primitive(Primitive::Float)));
    assert!(!f.is_builtin());
}

#[test]
fn test_builtins_have_no_source_reference() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let builtins = b.builtin_declarations();
    assert!(!builtins.is_empty());
    assert!(builtins.iter().all(Function::is_builtin));
}

#[test]
fn test_node_ids_are_unique_across_tree() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let color = b.global("color", Type::vector(Primitive::Float, 4));
    b.push(Decl::GlobalParam(color));
    let x = b.var("color");
    let init = b.variable("c", Type::vector(Primitive::Float, 4), Some(x));
    let decl = b.declare(init);
    let body = b.block(vec![decl]);
    let entry = b.entry_point("RayGen", Stage::RayGeneration, Vec::new(), body);
    b.push(Decl::EntryPoint(entry));
    let ast = b.finish();

    let mut ids = Vec::new();
    for decl in &ast.decls {
        NodeRef::Decl(decl).for_each_descendant(&mut |node| {
            if let Some(id) = node.id() {
                ids.push(id);
            }
        });
    }
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(crate::node::count_nodes(&ast.decls), 7);
}

#[test]
fn test_node_children() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let one = b.int(1);
    let two = b.int(2);
    let sum = b.binary(BinaryOp::Add, one, two);
    let node = NodeRef::Expr(&sum);
    assert_eq!(node.kind(), NodeKind::Binary);
    let kinds: Vec<_> = node.children().into_iter().map(NodeRef::kind).collect();
    assert_eq!(kinds, vec![NodeKind::Constant, NodeKind::Constant]);
}

#[test]
fn test_stage_names() {
    for stage in Stage::ALL {
        assert_eq!(Stage::from_name(stage.as_str()), Some(stage));
    }
    assert_eq!(Stage::from_name("vertex"), None);
}
