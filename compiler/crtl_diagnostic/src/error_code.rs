//! Error codes for all compiler diagnostics.
//!
//! The first digit of an `E` code names the pass that reports it.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the pass:
/// - E1xxx: Resolution errors
/// - E2xxx: Lowering errors (struct-global expansion, renaming)
/// - E3xxx: Binding errors
/// - E4xxx: Code generation errors
/// - E9xxx: Internal compiler errors
/// - W1xxx: Warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Resolution Errors (E1xxx)
    /// Undefined reference
    E1001,
    /// Duplicate declaration in one scope
    E1002,
    /// Variable read before its initializer was resolved
    E1003,
    /// Call to a name that is not a function
    E1004,
    /// Invalid type modifier combination
    E1005,
    /// Struct type annotation does not name a struct
    E1006,
    /// Expression refers to a name that is not a value
    E1007,

    // Lowering Errors (E2xxx)
    /// Struct global has a struct-typed member
    E2001,
    /// Direct reference to an expanded struct global
    E2002,
    /// Access to a member the struct does not declare
    E2003,
    /// Generated name is already declared
    E2004,

    // Binding Errors (E3xxx)
    /// Parameter type has no binding on the target
    E3001,
    /// Declaration symbol carries the wrong kind of type
    E3002,
    /// Bare use of a split struct parameter
    E3003,
    /// Struct parameter has a struct-typed member
    E3004,

    // Code Generation Errors (E4xxx)
    /// Builtin with no target translation
    E4001,
    /// Type with no target spelling
    E4002,
    /// Builtin not available in the calling entry point's stage
    E4003,

    // Internal Errors (E9xxx)
    /// Rewrite pass lost a mandatory child
    E9001,
    /// Too many errors
    E9002,

    // Warnings
    /// Local variable or parameter never read
    W1001,
}

impl ErrorCode {
    /// All variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::W1001,
    ];

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::W1001 => "W1001",
        }
    }

    pub fn is_resolution_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_lowering_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_binding_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_codegen_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    /// Check if this is an internal compiler error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001 | ErrorCode::E9002)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W1001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests;
