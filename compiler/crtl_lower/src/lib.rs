//! Lowering passes that run between resolution and code generation.
//!
//! - [`expand_struct_globals`] splits every struct-typed global parameter
//!   into one global per member and reroutes `g.member` references.
//! - [`rename_entry_point_params`] prefixes entry-point parameters with the
//!   entry point's name so they can share the target's global namespace.
//!
//! Both passes own the tree for their duration and hand back a new one
//! together with the map the metadata emitter needs. Both keep the
//! resolver's cross-reference valid for the tree they return, and both
//! reject a generated name that is already declared.

mod expand;
mod names;
mod problem;
mod rename;

use crtl_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use crtl_ir::Ast;

pub use expand::{expand_struct_globals, ExpandedGlobal, ExpandedMember, ExpansionMap};
pub use problem::LowerProblem;
pub use rename::{rename_entry_point_params, RenameMap, RenamedParam};

/// A lowered tree plus the pass's product and diagnostics.
#[derive(Debug)]
pub struct Lowered<T> {
    pub ast: Ast,
    pub output: T,
    pub diagnostics: DiagnosticQueue,
}

impl<T> Lowered<T> {
    /// The pass's had-error flag.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.diagnostics.has_errors()
    }
}
