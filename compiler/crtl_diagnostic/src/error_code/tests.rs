use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E2002.as_str(), "E2002");
}

#[test]
fn test_all_variants_classified() {
    for code in ErrorCode::ALL {
        let classes = [
            code.is_resolution_error(),
            code.is_lowering_error(),
            code.is_binding_error(),
            code.is_codegen_error(),
            code.is_internal_error(),
            code.is_warning(),
        ];
        assert_eq!(
            classes.iter().filter(|c| **c).count(),
            1,
            "{code} must belong to exactly one pass"
        );
    }
}

#[test]
fn test_from_str() {
    assert_eq!("e3001".parse::<ErrorCode>(), Ok(ErrorCode::E3001));
    assert_eq!("W1001".parse::<ErrorCode>(), Ok(ErrorCode::W1001));
    assert!("E0000".parse::<ErrorCode>().is_err());
}

#[test]
fn test_all_is_unique() {
    let mut codes: Vec<_> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), ErrorCode::ALL.len());
}
