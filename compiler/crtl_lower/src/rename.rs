//! Entry-point parameter renaming.
//!
//! Code generation hoists entry-point parameters to the target's global
//! scope, where two entry points taking `color` would collide. Every
//! parameter `p` of entry point `E` is renamed to `E_p` in place (its
//! `NodeId` is kept, so the cross-reference stays valid), and every
//! reference bound to it is updated to the new text. An `E_p` that is
//! already declared at global scope, generated for another parameter, or
//! declared as a local of `E` is an error.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crtl_diagnostic::{DiagnosticConfig, DiagnosticQueue};
use crtl_ir::ast::{Access, Ast, Decl, EntryPoint, Expr, ExprKind};
use crtl_ir::rewrite::{self, DeclResult, ExprResult, RewriteViolation, Rewriter, Rewritten};
use crtl_ir::{Name, NodeId, NodeRef, StringInterner};
use crtl_resolve::ResolverPassResult;

use crate::names::{LocalNames, TakenNames};
use crate::{LowerProblem, Lowered};

/// One renamed entry-point parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenamedParam {
    /// The parameter's declaration.
    pub decl: NodeId,
    pub entry_point: Name,
    /// Name as written in the source.
    pub source_name: Name,
    /// Name in the generated code.
    pub output_name: Name,
}

/// Renamed parameters in declaration order, keyed by declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenameMap {
    params: Vec<RenamedParam>,
    by_decl: FxHashMap<NodeId, usize>,
}

impl RenameMap {
    fn insert(&mut self, param: RenamedParam) {
        self.by_decl.insert(param.decl, self.params.len());
        self.params.push(param);
    }

    pub fn get(&self, decl: NodeId) -> Option<&RenamedParam> {
        self.by_decl.get(&decl).map(|&i| &self.params[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenamedParam> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Rename entry-point parameters to `<entry point>_<parameter>`.
///
/// Must run after [`crtl_resolve::resolve`]. Declaration info in `xref` is
/// updated to the new names; no binding changes.
#[tracing::instrument(level = "debug", skip_all)]
pub fn rename_entry_point_params(
    ast: Ast,
    xref: &mut ResolverPassResult,
    interner: &StringInterner,
    config: DiagnosticConfig,
) -> Lowered<RenameMap> {
    let (decls, ids) = ast.into_parts();
    let mut renamer = Renamer {
        taken: TakenNames::new(&decls),
        xref,
        interner,
        map: RenameMap::default(),
        problems: Vec::new(),
    };
    let decls = rewrite::rewrite_decls(&mut renamer, decls);
    let Renamer { map, problems, .. } = renamer;

    let mut diagnostics = DiagnosticQueue::with_config(config);
    for problem in &problems {
        diagnostics.emit_error(problem.into_diagnostic(interner));
    }
    debug!(renamed = map.len(), "entry-point parameters renamed");

    Lowered {
        ast: Ast::new(decls, ids),
        output: map,
        diagnostics,
    }
}

struct Renamer<'a> {
    taken: TakenNames,
    xref: &'a mut ResolverPassResult,
    interner: &'a StringInterner,
    map: RenameMap,
    problems: Vec<LowerProblem>,
}

impl Renamer<'_> {
    fn rename_params(&mut self, entry: &mut EntryPoint) {
        let entry_name = entry.symbol.name;
        let locals = LocalNames::collect(entry.body.stmts.iter().map(NodeRef::Stmt));
        for param in &mut entry.params {
            let source_name = param.symbol.name;
            let output_name = self.interner.intern_joined(entry_name, source_name);
            let span = param.symbol.span;
            let claim = self.taken.claim(output_name, span, &locals, self.interner);
            if let Err(existing_span) = claim {
                self.problems.push(LowerProblem::NameCollision {
                    span,
                    source: source_name,
                    generated: output_name,
                    existing_span,
                });
            }
            param.symbol.name = output_name;
            if let Some(info) = self.xref.declarations.get_mut(&param.id) {
                info.name = output_name;
            }
            trace!(
                from = self.interner.lookup(source_name),
                to = self.interner.lookup(output_name),
                "renamed parameter"
            );
            self.map.insert(RenamedParam {
                decl: param.id,
                entry_point: entry_name,
                source_name,
                output_name,
            });
        }
    }

    /// New text for a reference, if it is bound to a renamed parameter.
    fn renamed(&self, expr: &Expr) -> Option<Name> {
        let decl = self.xref.variable_decl(expr.id)?;
        self.map.get(decl).map(|p| p.output_name)
    }
}

impl Rewriter for Renamer<'_> {
    fn violation(&mut self, violation: RewriteViolation) {
        self.problems.push(LowerProblem::Violation(violation));
    }

    /// Only entry-point bodies can see entry-point parameters.
    fn rewrite_decl(&mut self, decl: Decl) -> DeclResult {
        match decl {
            Decl::EntryPoint(mut entry) => {
                self.rename_params(&mut entry);
                Rewritten::One(Decl::EntryPoint(rewrite::walk_entry_point(self, entry)))
            }
            other => Rewritten::One(other),
        }
    }

    fn rewrite_variable_ref(&mut self, mut expr: Expr) -> ExprResult {
        if let Some(name) = self.renamed(&expr) {
            expr.kind = ExprKind::Variable(name);
        }
        ExprResult::One(expr)
    }

    fn rewrite_access(&mut self, expr: Expr) -> ExprResult {
        let Expr { id, span, kind } = expr;
        let ExprKind::Access(Access { base, chain }) = kind else {
            return ExprResult::One(Expr::new(id, span, kind));
        };
        let ExprResult::One(base) = self.rewrite_variable_ref(*base) else {
            return ExprResult::Removed;
        };
        let Some(chain) = rewrite::rewrite_chain(self, chain, id, span) else {
            return ExprResult::Removed;
        };
        ExprResult::One(Expr::new(
            id,
            span,
            ExprKind::Access(Access {
                base: Box::new(base),
                chain,
            }),
        ))
    }

    fn rewrite_call(&mut self, expr: Expr) -> ExprResult {
        let ExprResult::One(expr) = rewrite::walk_call(self, expr) else {
            return ExprResult::Removed;
        };
        let Expr { id, span, kind } = expr;
        let ExprKind::Call(mut call) = kind else {
            return ExprResult::One(Expr::new(id, span, kind));
        };
        let Some(chain) = rewrite::rewrite_chain(self, std::mem::take(&mut call.chain), id, span)
        else {
            return ExprResult::Removed;
        };
        call.chain = chain;
        ExprResult::One(Expr::new(id, span, ExprKind::Call(call)))
    }
}

#[cfg(test)]
mod tests;
