//! Resolver output: the cross-reference tables.

use rustc_hash::FxHashMap;

use crtl_diagnostic::{Diagnostic, ErrorGuaranteed};
use crtl_ir::{Name, NodeId, Span};

/// What kind of declaration a name is bound to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Function,
    EntryPoint,
    GlobalParam,
    Struct,
    /// Top-level `Variable`.
    GlobalVariable,
    /// Function or entry-point parameter.
    Parameter,
    Local,
}

impl DeclKind {
    /// Whether a `Variable` expression may refer to this declaration.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            DeclKind::GlobalParam | DeclKind::GlobalVariable | DeclKind::Parameter | DeclKind::Local
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::EntryPoint => "entry point",
            DeclKind::GlobalParam => "global parameter",
            DeclKind::Struct => "struct",
            DeclKind::GlobalVariable => "global variable",
            DeclKind::Parameter => "parameter",
            DeclKind::Local => "local variable",
        }
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of a declaration that references can be bound to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclInfo {
    pub kind: DeclKind,
    pub name: Name,
    /// `None` for builtins and synthesized declarations.
    pub span: Option<Span>,
    pub is_builtin: bool,
}

/// Cross-reference produced by [`resolve`](crate::resolve).
///
/// Keyed by [`NodeId`]. Passes that replace referenced nodes keep it
/// consistent through [`invalidate`](Self::invalidate) and the `bind_*`
/// methods.
#[derive(Debug, Default)]
pub struct ResolverPassResult {
    /// Struct type usage -> struct declaration.
    pub struct_types: FxHashMap<NodeId, NodeId>,
    /// Variable expression -> variable declaration.
    pub variables: FxHashMap<NodeId, NodeId>,
    /// Call expression -> function declaration.
    pub calls: FxHashMap<NodeId, NodeId>,
    /// Every declaration a reference can point to.
    pub declarations: FxHashMap<NodeId, DeclInfo>,
    diagnostics: Vec<Diagnostic>,
    error: Option<ErrorGuaranteed>,
}

impl ResolverPassResult {
    pub(crate) fn set_diagnostics(
        &mut self,
        diagnostics: Vec<Diagnostic>,
        error: Option<ErrorGuaranteed>,
    ) {
        self.diagnostics = diagnostics;
        self.error = error;
    }

    /// The pass's had-error flag.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.error
    }

    /// Diagnostics reported by the pass, sorted by position.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Move the diagnostics out, leaving the had-error flag in place.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn struct_decl(&self, struct_ref: NodeId) -> Option<NodeId> {
        self.struct_types.get(&struct_ref).copied()
    }

    pub fn variable_decl(&self, expr: NodeId) -> Option<NodeId> {
        self.variables.get(&expr).copied()
    }

    pub fn callee(&self, expr: NodeId) -> Option<NodeId> {
        self.calls.get(&expr).copied()
    }

    pub fn declaration(&self, decl: NodeId) -> Option<&DeclInfo> {
        self.declarations.get(&decl)
    }

    /// Declaration info of the function a call resolves to.
    pub fn callee_info(&self, expr: NodeId) -> Option<&DeclInfo> {
        self.callee(expr).and_then(|d| self.declaration(d))
    }

    /// Drop every entry keyed by `id`, as a reference or a declaration.
    ///
    /// References still pointing at a dropped declaration are left in place;
    /// the caller rebinds or invalidates them.
    pub fn invalidate(&mut self, id: NodeId) {
        self.struct_types.remove(&id);
        self.variables.remove(&id);
        self.calls.remove(&id);
        self.declarations.remove(&id);
    }

    pub fn register_declaration(&mut self, decl: NodeId, info: DeclInfo) {
        self.declarations.insert(decl, info);
    }

    pub fn bind_variable(&mut self, expr: NodeId, decl: NodeId) {
        self.variables.insert(expr, decl);
    }

    pub fn bind_struct_type(&mut self, struct_ref: NodeId, decl: NodeId) {
        self.struct_types.insert(struct_ref, decl);
    }

    pub fn bind_call(&mut self, expr: NodeId, decl: NodeId) {
        self.calls.insert(expr, decl);
    }
}
