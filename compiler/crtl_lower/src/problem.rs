//! Lowering problem definitions.

use crtl_diagnostic::{Diagnostic, ErrorCode};
use crtl_ir::rewrite::RewriteViolation;
use crtl_ir::{Name, Span, StringInterner};

/// Problems found by the lowering passes.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum LowerProblem {
    /// A struct global whose struct has a struct-typed member.
    NestedStructMember {
        span: Option<Span>,
        global: Name,
        member: Name,
        member_span: Option<Span>,
    },

    /// An expanded struct global used as a whole, or indexed directly.
    DirectReference { span: Option<Span>, global: Name },

    /// `g.m` where the struct of `g` has no member `m`.
    UnknownMember {
        span: Option<Span>,
        global: Name,
        member: Name,
    },

    /// A generated name that is already taken at global scope.
    NameCollision {
        span: Option<Span>,
        /// The declaration being renamed or split.
        source: Name,
        generated: Name,
        /// The declaration already holding `generated`.
        existing_span: Option<Span>,
    },

    /// A struct global whose type did not resolve to a struct declaration.
    UnresolvedStruct { span: Option<Span>, global: Name },

    /// A rewrite lost a mandatory child.
    Violation(RewriteViolation),
}

impl LowerProblem {
    #[cold]
    pub fn into_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        match self {
            LowerProblem::NestedStructMember {
                span,
                global,
                member,
                member_span,
            } => {
                let global = interner.lookup(*global);
                let member = interner.lookup(*member);
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "cannot expand global `{global}`: member `{member}` is itself a struct"
                    ))
                    .with_label(*span, "struct global declared here")
                    .with_secondary_label(*member_span, "nested struct member")
                    .with_note("struct globals are split one level deep")
            }

            LowerProblem::DirectReference { span, global } => {
                let global = interner.lookup(*global);
                Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "struct global `{global}` cannot be used as a whole"
                    ))
                    .with_label(*span, "referenced here")
                    .with_note(format!(
                        "`{global}` is split into one global per member"
                    ))
                    .with_suggestion(format!("access a member, as in `{global}.<member>`"))
            }

            LowerProblem::UnknownMember {
                span,
                global,
                member,
            } => {
                let global = interner.lookup(*global);
                let member = interner.lookup(*member);
                Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!("`{global}` has no member `{member}`"))
                    .with_label(*span, "unknown member")
            }

            LowerProblem::NameCollision {
                span,
                source,
                generated,
                existing_span,
            } => {
                let source = interner.lookup(*source);
                let generated = interner.lookup(*generated);
                Diagnostic::error(ErrorCode::E2004)
                    .with_message(format!(
                        "lowering `{source}` produces `{generated}`, which is already declared"
                    ))
                    .with_label(*span, format!("`{source}` becomes `{generated}`"))
                    .with_secondary_label(*existing_span, format!("`{generated}` declared here"))
                    .with_suggestion(format!("rename `{generated}` or `{source}`"))
            }

            LowerProblem::UnresolvedStruct { span, global } => {
                let global = interner.lookup(*global);
                Diagnostic::error(ErrorCode::E9001)
                    .with_message(format!(
                        "internal error: struct type of `{global}` has no resolved declaration"
                    ))
                    .with_label(*span, "declared here")
            }

            LowerProblem::Violation(violation) => Diagnostic::error(ErrorCode::E9001)
                .with_message(format!("internal error: {violation}"))
                .with_label(violation.span, "while lowering this node"),
        }
    }
}
