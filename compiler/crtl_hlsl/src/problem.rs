//! Binding and code generation problem definitions.

use crtl_diagnostic::{Diagnostic, ErrorCode};
use crtl_ir::{Name, Span, Stage, StringInterner};

/// Problems found while binding parameters and emitting HLSL.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CodegenProblem {
    /// A parameter whose type has no register binding.
    UnsupportedParamType {
        span: Option<Span>,
        param: Name,
        ty: String,
    },

    /// A function or entry point whose symbol type does not match its kind.
    MismatchedEntryPointType {
        span: Option<Span>,
        name: Name,
        expected: &'static str,
    },

    /// A split struct parameter used other than through `param.member`.
    SplitStructUse { span: Option<Span>, param: Name },

    /// A struct parameter with a struct-typed member.
    NestedStructParam {
        span: Option<Span>,
        param: Name,
        member: Name,
    },

    /// `param.member` where the parameter's struct has no such member.
    UnknownMember {
        span: Option<Span>,
        param: Name,
        member: Name,
    },

    /// A call to a builtin declaration with no HLSL translation.
    UnrecognizedBuiltin { span: Option<Span>, name: Name },

    /// A builtin called from an entry point whose stage lacks it.
    BuiltinUnavailable {
        span: Option<Span>,
        name: Name,
        stage: Stage,
    },

    /// A type with no HLSL spelling.
    UnsupportedType { span: Option<Span>, ty: String },

    /// A reference with no cross-reference entry.
    Unresolved { span: Option<Span>, name: Name },
}

impl CodegenProblem {
    #[cold]
    pub fn into_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        match self {
            CodegenProblem::UnsupportedParamType { span, param, ty } => {
                Diagnostic::error(ErrorCode::E3001)
                    .with_message(format!(
                        "parameter `{}` of type `{ty}` cannot be bound to a register",
                        interner.lookup(*param)
                    ))
                    .with_label(*span, "unsupported parameter type")
                    .with_note(
                        "parameters must be numeric, a buffer, a texture, an acceleration \
                         structure, an array of those, or a struct of those",
                    )
            }

            CodegenProblem::MismatchedEntryPointType {
                span,
                name,
                expected,
            } => Diagnostic::error(ErrorCode::E3002)
                .with_message(format!(
                    "`{}` does not carry {expected} type",
                    interner.lookup(*name)
                ))
                .with_label(*span, "declared here"),

            CodegenProblem::SplitStructUse { span, param } => {
                let param = interner.lookup(*param);
                Diagnostic::error(ErrorCode::E3003)
                    .with_message(format!("struct parameter `{param}` cannot be used as a whole"))
                    .with_label(*span, "used here")
                    .with_note(format!("`{param}` is bound member by member"))
                    .with_suggestion(format!("access a member, as in `{param}.<member>`"))
            }

            CodegenProblem::NestedStructParam {
                span,
                param,
                member,
            } => Diagnostic::error(ErrorCode::E3004)
                .with_message(format!(
                    "struct parameter `{}` has struct member `{}`",
                    interner.lookup(*param),
                    interner.lookup(*member)
                ))
                .with_label(*span, "parameter declared here")
                .with_note("struct parameters are split one level deep"),

            CodegenProblem::UnknownMember {
                span,
                param,
                member,
            } => Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "`{}` has no member `{}`",
                    interner.lookup(*param),
                    interner.lookup(*member)
                ))
                .with_label(*span, "unknown member"),

            CodegenProblem::UnrecognizedBuiltin { span, name } => {
                Diagnostic::error(ErrorCode::E4001)
                    .with_message(format!(
                        "builtin `{}` has no HLSL translation",
                        interner.lookup(*name)
                    ))
                    .with_label(*span, "called here")
            }

            CodegenProblem::BuiltinUnavailable { span, name, stage } => {
                Diagnostic::error(ErrorCode::E4003)
                    .with_message(format!(
                        "builtin `{}` is not available in {} entry points",
                        interner.lookup(*name),
                        stage.as_str()
                    ))
                    .with_label(*span, "called here")
            }

            CodegenProblem::UnsupportedType { span, ty } => Diagnostic::error(ErrorCode::E4002)
                .with_message(format!("type `{ty}` is not supported by the HLSL backend"))
                .with_label(*span, "used here"),

            CodegenProblem::Unresolved { span, name } => Diagnostic::error(ErrorCode::E9001)
                .with_message(format!(
                    "internal error: `{}` has no resolved declaration",
                    interner.lookup(*name)
                ))
                .with_label(*span, "referenced here"),
        }
    }
}
