//! Source references.
//!
//! The front end hands the compiler line/column positions rather than byte
//! offsets, so a [`Span`] is a 1-based `(line, column)` pair. Nodes the
//! lowering passes synthesize carry no span at all (`Option<Span>::None`).

use std::fmt;

/// 1-based line/column position of a node in the source file.
///
/// Layout: 8 bytes total.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(C)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Span { line, column }
    }

    /// Sort key for an optional span. Synthesized nodes sort last.
    #[inline]
    pub fn sort_key(span: Option<Span>) -> (u32, u32) {
        span.map_or((u32::MAX, u32::MAX), |s| (s.line, s.column))
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
