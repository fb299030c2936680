//! Diagnostic queue: the error sink each pass reports into.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical diagnostics at the same position
//! - Position-sorted flushing (synthesized nodes last)
//! - `ErrorGuaranteed` proof that errors were emitted

use crtl_ir::Span;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// A config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting and sorting diagnostics.
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.emit_error(diagnostic);
/// if queue.has_errors().is_some() { /* halt */ }
/// let sorted = queue.flush();
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Errors reported, including any filtered out of the output.
    error_count: usize,
    /// Errors kept in `diagnostics`.
    shown_errors: usize,
    /// Errors dropped by the limit.
    suppressed: usize,
    warning_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic of any severity.
    ///
    /// Returns `true` if it was queued, `false` if it was filtered. A
    /// filtered error still sets the had-error flag.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error {
            self.error_count += 1;
            if self.limit_reached() {
                self.suppressed += 1;
                return false;
            }
        } else {
            self.warning_count += 1;
        }

        if self.config.deduplicate && self.diagnostics.contains(&diag) {
            return false;
        }

        if is_error {
            self.shown_errors += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a {}", diag.severity);
        self.push(diag);
        ErrorGuaranteed::new()
    }

    /// Move every diagnostic from `other` into this queue.
    pub fn absorb(&mut self, other: DiagnosticQueue) {
        for diag in other.diagnostics {
            self.push(diag);
        }
        self.error_count += other.suppressed;
        self.suppressed += other.suppressed;
    }

    /// Whether further errors will be dropped from the output.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.shown_errors >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// The pass's had-error flag, with proof if set.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Sort diagnostics by position and return them, resetting the queue.
    ///
    /// The sort is stable, so diagnostics at the same position (and all
    /// synthesized-node diagnostics) keep their emission order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| Span::sort_key(d.primary_span()));
        if self.suppressed > 0 {
            result.push(too_many_errors(self.config.error_limit, self.suppressed));
        }
        self.error_count = 0;
        self.shown_errors = 0;
        self.suppressed = 0;
        self.warning_count = 0;
        result
    }

    /// Consume the queue, returning sorted diagnostics.
    pub fn into_vec(mut self) -> Vec<Diagnostic> {
        self.flush()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, dropped: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!(
            "error limit of {limit} reached; {dropped} further error(s) not shown"
        ))
        .with_note("use --error-limit to increase the limit")
}

#[cfg(test)]
mod tests;
