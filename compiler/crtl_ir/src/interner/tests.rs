use super::*;

#[test]
fn test_intern_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("color");
    let b = interner.intern("color");
    let c = interner.intern("data");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), "color");
    assert_eq!(interner.lookup(c), "data");
}

#[test]
fn test_empty_is_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert!(interner.is_empty());
    interner.intern("x");
    assert!(!interner.is_empty());
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_intern_joined() {
    let interner = StringInterner::new();
    let params = interner.intern("params");
    let color = interner.intern("color");
    let joined = interner.intern_joined(params, color);
    assert_eq!(interner.lookup(joined), "params_color");
    assert_eq!(interner.get("params_color"), Some(joined));
}

#[test]
fn test_get_does_not_intern() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert_eq!(interner.len(), 1);
}
