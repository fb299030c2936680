//! Resolution problem definitions.
//!
//! The resolver records [`ResolveProblem`]s while walking and renders them
//! with [`ResolveProblem::into_diagnostic`] once names can be looked up.

use crtl_diagnostic::{Diagnostic, ErrorCode};
use crtl_ir::ast::ModifierConflict;
use crtl_ir::{Name, Span, StringInterner};

use crate::DeclKind;

/// Which lookup failed for an undefined name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Namespace {
    Value,
    Function,
    Type,
}

impl Namespace {
    fn noun(self) -> &'static str {
        match self {
            Namespace::Value => "variable",
            Namespace::Function => "function",
            Namespace::Type => "struct type",
        }
    }
}

/// Problems found during name resolution.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ResolveProblem {
    UndefinedReference {
        span: Option<Span>,
        name: Name,
        namespace: Namespace,
    },

    /// Two declarations share a name in one scope.
    DuplicateDeclaration {
        span: Option<Span>,
        name: Name,
        /// `None` when the first declaration is a builtin.
        first_span: Option<Span>,
        first_is_builtin: bool,
    },

    /// A variable referenced between its declaration and the end of its
    /// initializer.
    ReadBeforeDefined {
        span: Option<Span>,
        name: Name,
        declared_at: Option<Span>,
    },

    CallToNonFunction {
        span: Option<Span>,
        name: Name,
        kind: DeclKind,
        declared_at: Option<Span>,
    },

    InvalidModifiers {
        span: Option<Span>,
        conflict: ModifierConflict,
    },

    /// A struct type annotation names something that is not a struct.
    NotAStruct {
        span: Option<Span>,
        name: Name,
        kind: DeclKind,
    },

    /// A variable expression names a function, entry point or struct.
    NotAValue {
        span: Option<Span>,
        name: Name,
        kind: DeclKind,
    },

    UnusedVariable {
        span: Option<Span>,
        name: Name,
        kind: DeclKind,
    },
}

impl ResolveProblem {
    pub fn span(&self) -> Option<Span> {
        match self {
            ResolveProblem::UndefinedReference { span, .. }
            | ResolveProblem::DuplicateDeclaration { span, .. }
            | ResolveProblem::ReadBeforeDefined { span, .. }
            | ResolveProblem::CallToNonFunction { span, .. }
            | ResolveProblem::InvalidModifiers { span, .. }
            | ResolveProblem::NotAStruct { span, .. }
            | ResolveProblem::NotAValue { span, .. }
            | ResolveProblem::UnusedVariable { span, .. } => *span,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ResolveProblem::UnusedVariable { .. })
    }

    /// Convert this problem into a diagnostic.
    #[cold]
    pub fn into_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        match self {
            ResolveProblem::UndefinedReference {
                span,
                name,
                namespace,
            } => {
                let name = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E1001)
                    .with_message(format!("undefined {} `{name}`", namespace.noun()))
                    .with_label(*span, "not found in this scope")
            }

            ResolveProblem::DuplicateDeclaration {
                span,
                name,
                first_span,
                first_is_builtin,
            } => {
                let name = interner.lookup(*name);
                let diag = Diagnostic::error(ErrorCode::E1002)
                    .with_message(format!("duplicate declaration of `{name}`"))
                    .with_label(*span, "redeclared here");
                if *first_is_builtin {
                    diag.with_note(format!("`{name}` is a builtin function"))
                } else {
                    diag.with_secondary_label(*first_span, "first declared here")
                }
            }

            ResolveProblem::ReadBeforeDefined {
                span,
                name,
                declared_at,
            } => {
                let name = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E1003)
                    .with_message(format!("`{name}` is read before it is defined"))
                    .with_label(*span, "read here")
                    .with_secondary_label(*declared_at, "declared here")
                    .with_note("a variable is defined only after its initializer")
            }

            ResolveProblem::CallToNonFunction {
                span,
                name,
                kind,
                declared_at,
            } => {
                let name = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E1004)
                    .with_message(format!("`{name}` is a {kind}, not a function"))
                    .with_label(*span, "called here")
                    .with_secondary_label(*declared_at, format!("{kind} declared here"))
            }

            ResolveProblem::InvalidModifiers { span, conflict } => {
                Diagnostic::error(ErrorCode::E1005)
                    .with_message("invalid modifier combination")
                    .with_label(*span, conflict.to_string())
            }

            ResolveProblem::NotAStruct { span, name, kind } => {
                let name = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E1006)
                    .with_message(format!("`{name}` is a {kind}, not a struct type"))
                    .with_label(*span, "expected a struct type")
            }

            ResolveProblem::NotAValue { span, name, kind } => {
                let name = interner.lookup(*name);
                Diagnostic::error(ErrorCode::E1007)
                    .with_message(format!("`{name}` is a {kind}, not a value"))
                    .with_label(*span, "used as a value here")
            }

            ResolveProblem::UnusedVariable { span, name, kind } => {
                let name = interner.lookup(*name);
                Diagnostic::warning(ErrorCode::W1001)
                    .with_message(format!("unused {kind} `{name}`"))
                    .with_label(*span, "never read")
                    .with_suggestion(format!("remove `{name}` or read it"))
            }
        }
    }
}
