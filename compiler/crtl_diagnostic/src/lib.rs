//! Diagnostic system for compiler passes.
//!
//! Every diagnostic carries:
//! - An error code for searchability
//! - A message (what went wrong)
//! - Labels pointing at source positions (where it went wrong)
//! - Notes and suggestions (why, and how to fix it)
//!
//! Nodes synthesized by the lowering passes have no source position; their
//! labels carry `None` and render as `<generated>`.
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that at least one error was
//! emitted into a [`DiagnosticQueue`]:
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn expand(..) -> Result<Ast, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
