use super::*;
use pretty_assertions::assert_eq;

fn error_at(code: ErrorCode, line: u32, message: &str) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(message)
        .with_label(Some(Span::new(line, 1)), "here")
}

#[test]
fn test_flush_sorts_by_position_with_generated_last() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.emit_error(
        Diagnostic::error(ErrorCode::E9001)
            .with_message("synthesized")
            .with_label(None, "here"),
    );
    queue.emit_error(error_at(ErrorCode::E1001, 9, "late"));
    queue.emit_error(error_at(ErrorCode::E1001, 2, "early"));

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["early", "late", "synthesized"]);
}

#[test]
fn test_has_errors_ignores_warnings() {
    let mut queue = DiagnosticQueue::new();
    queue.push(Diagnostic::warning(ErrorCode::W1001).with_message("unused"));
    assert!(queue.has_errors().is_none());
    assert_eq!(queue.warning_count(), 1);

    queue.emit_error(error_at(ErrorCode::E1002, 1, "duplicate"));
    assert!(queue.has_errors().is_some());
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn test_error_limit_drops_and_summarizes() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    assert!(queue.push(error_at(ErrorCode::E1001, 1, "a")));
    assert!(queue.push(error_at(ErrorCode::E1001, 2, "b")));
    assert!(queue.limit_reached());
    assert!(!queue.push(error_at(ErrorCode::E1001, 3, "c")));
    assert_eq!(queue.error_count(), 3);

    let flushed = queue.flush();
    assert_eq!(flushed.len(), 3);
    assert_eq!(flushed[2].code, ErrorCode::E9002);
    assert!(queue.has_errors().is_none());
}

#[test]
fn test_deduplicate_identical() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.push(error_at(ErrorCode::E1001, 4, "undefined `x`")));
    assert!(!queue.push(error_at(ErrorCode::E1001, 4, "undefined `x`")));
    assert!(queue.push(error_at(ErrorCode::E1001, 5, "undefined `x`")));
    assert_eq!(queue.into_vec().len(), 2);
}

#[test]
fn test_absorb_keeps_error_flag() {
    let mut pass = DiagnosticQueue::new();
    pass.emit_error(error_at(ErrorCode::E2002, 1, "direct reference"));

    let mut total = DiagnosticQueue::new();
    total.absorb(pass);
    assert!(total.has_errors().is_some());
    assert_eq!(total.peek().count(), 1);
}
