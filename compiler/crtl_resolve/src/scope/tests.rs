use super::*;

fn binding(decl: u32, name: Name) -> Binding {
    Binding {
        decl: NodeId::new(decl),
        name,
        span: None,
        kind: DeclKind::Local,
        is_builtin: false,
        state: BindingState::Declared,
        read: false,
    }
}

#[test]
fn test_lookup_prefers_innermost() {
    let x = Name::from_raw(1);
    let mut stack = ScopeStack::new();
    assert!(stack.declare(binding(10, x)).is_ok());
    stack.push();
    assert!(stack.declare(binding(20, x)).is_ok());

    assert_eq!(stack.lookup(x).map(|b| b.decl), Some(NodeId::new(20)));
    assert_eq!(stack.lookup_global(x).map(|b| b.decl), Some(NodeId::new(10)));

    assert!(stack.pop().is_some());
    assert_eq!(stack.lookup(x).map(|b| b.decl), Some(NodeId::new(10)));
}

#[test]
fn test_declare_rejects_same_scope_duplicate() {
    let x = Name::from_raw(1);
    let mut stack = ScopeStack::new();
    assert!(stack.declare(binding(10, x)).is_ok());
    let existing = stack.declare(binding(11, x));
    assert_eq!(existing.map_err(|b| b.decl), Err(NodeId::new(10)));
}

#[test]
fn test_define_and_read_tracking() {
    let x = Name::from_raw(1);
    let mut stack = ScopeStack::new();
    stack.push();
    assert!(stack.declare(binding(10, x)).is_ok());
    assert_eq!(stack.lookup(x).map(|b| b.state), Some(BindingState::Declared));
    stack.define(x);
    assert_eq!(stack.lookup(x).map(|b| b.state), Some(BindingState::Defined));

    assert!(stack.lookup_read(x).is_some());
    let popped = stack.pop().map(Scope::into_bindings).unwrap_or_default();
    assert!(popped[0].read);
}

#[test]
fn test_global_scope_is_never_popped() {
    let mut stack = ScopeStack::new();
    assert!(stack.pop().is_none());
    assert_eq!(stack.depth(), 1);
}
