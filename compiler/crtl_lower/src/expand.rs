//! Struct-global expansion.
//!
//! `Params params;` with `struct Params { float4 color; Buffer<float4> data; }`
//! becomes
//!
//! ```text
//! float4 params_color;
//! Buffer<float4> params_data;
//! ```
//!
//! and every `params.color...` becomes `params_color...`. A reference to
//! `params` that does not start with a member access has no lowering and is
//! reported as an error, as is a generated name that is already declared.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crtl_diagnostic::{DiagnosticConfig, DiagnosticQueue};
use crtl_ir::ast::{Access, Ast, Decl, Expr, ExprKind, Fragment, GlobalParam, Struct, Symbol};
use crtl_ir::rewrite::{
    self, DeclResult, ExprResult, RewriteViolation, Rewriter, Rewritten,
};
use crtl_ir::{Name, NodeId, NodeIdGen, Span, StringInterner};
use crtl_resolve::{DeclInfo, DeclKind, ResolverPassResult};

use crate::names::{LocalNames, TakenNames};
use crate::{LowerProblem, Lowered};

/// One member of an expanded global.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedMember {
    pub member: Name,
    /// The synthesized global.
    pub global: NodeId,
    pub global_name: Name,
}

/// An expanded struct global and the globals that replace it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedGlobal {
    pub original: NodeId,
    pub original_name: Name,
    /// In struct member order.
    pub members: Vec<ExpandedMember>,
}

impl ExpandedGlobal {
    pub fn member(&self, name: Name) -> Option<&ExpandedMember> {
        self.members.iter().find(|m| m.member == name)
    }
}

/// Every struct global the pass expanded, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionMap {
    globals: Vec<ExpandedGlobal>,
    by_original: FxHashMap<NodeId, usize>,
}

impl ExpansionMap {
    fn insert(&mut self, global: ExpandedGlobal) {
        self.by_original.insert(global.original, self.globals.len());
        self.globals.push(global);
    }

    /// Expansion of the global declared as `original`.
    pub fn get(&self, original: NodeId) -> Option<&ExpandedGlobal> {
        self.by_original.get(&original).map(|&i| &self.globals[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpandedGlobal> {
        self.globals.iter()
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}

/// Split struct-typed global parameters into per-member globals.
///
/// `xref` is updated in place: the removed globals and rerouted references
/// are invalidated, and the synthesized globals and `Variable` expressions
/// are registered.
#[tracing::instrument(level = "debug", skip_all)]
pub fn expand_struct_globals(
    ast: Ast,
    xref: &mut ResolverPassResult,
    interner: &StringInterner,
    config: DiagnosticConfig,
) -> Lowered<ExpansionMap> {
    let (decls, mut ids) = ast.into_parts();
    let structs: FxHashMap<NodeId, Struct> = decls
        .iter()
        .filter_map(|d| match d {
            Decl::Struct(s) => Some((s.id, s.clone())),
            _ => None,
        })
        .collect();

    let mut problems = Vec::new();
    let mut map = ExpansionMap::default();
    let mut replacements = FxHashMap::default();
    let mut taken = TakenNames::new(&decls);
    let locals = LocalNames::in_bodies(&decls);

    for decl in &decls {
        let Decl::GlobalParam(global) = decl else {
            continue;
        };
        let Some(struct_ref) = global.symbol.ty.as_struct() else {
            continue;
        };
        let Some(decl) = xref
            .struct_decl(struct_ref.id)
            .and_then(|id| structs.get(&id))
        else {
            problems.push(LowerProblem::UnresolvedStruct {
                span: global.symbol.span,
                global: global.symbol.name,
            });
            continue;
        };
        let names = Names {
            taken: &mut taken,
            locals: &locals,
            interner,
        };
        if let Some((expanded, new_globals)) =
            expand_one(global, decl, names, &mut ids, xref, &mut problems)
        {
            replacements.insert(global.id, new_globals);
            map.insert(expanded);
        }
    }

    let mut expander = Expander {
        map: &map,
        replacements,
        xref,
        ids: &mut ids,
        problems,
    };
    let decls = rewrite::rewrite_decls(&mut expander, decls);
    let problems = expander.problems;

    // Rewriting looks references up through the originals, so they go last.
    for expanded in map.iter() {
        xref.invalidate(expanded.original);
    }

    let mut diagnostics = DiagnosticQueue::with_config(config);
    for problem in &problems {
        diagnostics.emit_error(problem.into_diagnostic(interner));
    }
    debug!(
        expanded = map.len(),
        globals = map.iter().map(|g| g.members.len()).sum::<usize>(),
        errors = problems.len(),
        "struct globals expanded"
    );

    Lowered {
        ast: Ast::new(decls, ids),
        output: map,
        diagnostics,
    }
}

struct Names<'n> {
    taken: &'n mut TakenNames,
    locals: &'n LocalNames,
    interner: &'n StringInterner,
}

/// Build the replacement globals for one struct global.
fn expand_one(
    global: &GlobalParam,
    decl: &Struct,
    names: Names<'_>,
    ids: &mut NodeIdGen,
    xref: &mut ResolverPassResult,
    problems: &mut Vec<LowerProblem>,
) -> Option<(ExpandedGlobal, Vec<GlobalParam>)> {
    let interner = names.interner;
    let nested: Vec<_> = decl
        .members
        .iter()
        .filter(|m| m.symbol.ty.as_struct().is_some())
        .collect();
    if !nested.is_empty() {
        for member in nested {
            problems.push(LowerProblem::NestedStructMember {
                span: global.symbol.span,
                global: global.symbol.name,
                member: member.symbol.name,
                member_span: member.symbol.span,
            });
        }
        return None;
    }

    let mut generated = Vec::with_capacity(decl.members.len());
    let mut collided = false;
    for member in &decl.members {
        let name = interner.intern_joined(global.symbol.name, member.symbol.name);
        let claim = names.taken.claim(name, global.symbol.span, names.locals, interner);
        if let Err(existing_span) = claim {
            problems.push(LowerProblem::NameCollision {
                span: global.symbol.span,
                source: global.symbol.name,
                generated: name,
                existing_span,
            });
            collided = true;
        }
        generated.push(name);
    }
    if collided {
        return None;
    }

    let mut expanded = ExpandedGlobal {
        original: global.id,
        original_name: global.symbol.name,
        members: Vec::with_capacity(decl.members.len()),
    };
    let mut new_globals = Vec::with_capacity(decl.members.len());
    for (member, name) in decl.members.iter().zip(generated) {
        let id = ids.fresh();
        xref.register_declaration(
            id,
            DeclInfo {
                kind: DeclKind::GlobalParam,
                name,
                span: None,
                is_builtin: false,
            },
        );
        trace!(?id, name = interner.lookup(name), "synthesized global");
        new_globals.push(GlobalParam {
            id,
            symbol: Symbol::new(name, None, member.symbol.ty.clone()),
        });
        expanded.members.push(ExpandedMember {
            member: member.symbol.name,
            global: id,
            global_name: name,
        });
    }
    if let Some(struct_ref) = global.symbol.ty.as_struct() {
        xref.invalidate(struct_ref.id);
    }
    Some((expanded, new_globals))
}

struct Expander<'a> {
    map: &'a ExpansionMap,
    replacements: FxHashMap<NodeId, Vec<GlobalParam>>,
    xref: &'a mut ResolverPassResult,
    ids: &'a mut NodeIdGen,
    problems: Vec<LowerProblem>,
}

impl<'a> Expander<'a> {
    /// Expansion of the global a `Variable` expression refers to, if any.
    fn expansion_of(&self, var: &Expr) -> Option<&'a ExpandedGlobal> {
        let map = self.map;
        self.xref.variable_decl(var.id).and_then(|decl| map.get(decl))
    }

    /// Rewrite the index expressions of a chain, reporting violations.
    fn chain(&mut self, chain: Vec<Fragment>, owner: NodeId, span: Option<Span>) -> Vec<Fragment> {
        rewrite::rewrite_chain(self, chain, owner, span).unwrap_or_default()
    }

    /// `g.m rest...` on an expanded `g` becomes `g_m rest...`.
    fn reroute(&mut self, expr_id: NodeId, span: Option<Span>, access: Access) -> ExprResult {
        let Access { base, chain } = access;
        let Some(expanded) = self.expansion_of(&base) else {
            let chain = self.chain(chain, expr_id, span);
            return ExprResult::One(Expr::new(
                expr_id,
                span,
                ExprKind::Access(Access { base, chain }),
            ));
        };

        let mut fragments = chain.into_iter();
        let Some(Fragment::Member {
            name: member,
            span: member_span,
        }) = fragments.next()
        else {
            self.problems.push(LowerProblem::DirectReference {
                span: base.span,
                global: expanded.original_name,
            });
            return ExprResult::One(Expr::new(
                expr_id,
                span,
                ExprKind::Access(Access {
                    base,
                    chain: Vec::new(),
                }),
            ));
        };
        let Some(target) = expanded.member(member) else {
            self.problems.push(LowerProblem::UnknownMember {
                span: member_span.or(span),
                global: expanded.original_name,
                member,
            });
            return ExprResult::One(*base);
        };

        self.xref.invalidate(base.id);
        let var_id = self.ids.fresh();
        self.xref.bind_variable(var_id, target.global);
        let var = Expr::new(var_id, base.span, ExprKind::Variable(target.global_name));

        let rest: Vec<_> = fragments.collect();
        if rest.is_empty() {
            return ExprResult::One(var);
        }
        let rest = self.chain(rest, expr_id, span);
        ExprResult::One(Expr::new(
            expr_id,
            span,
            ExprKind::Access(Access {
                base: Box::new(var),
                chain: rest,
            }),
        ))
    }
}

impl Rewriter for Expander<'_> {
    fn violation(&mut self, violation: RewriteViolation) {
        self.problems.push(LowerProblem::Violation(violation));
    }

    fn rewrite_global_param(&mut self, global: GlobalParam) -> DeclResult {
        match self.replacements.remove(&global.id) {
            Some(globals) => Rewritten::Many(globals.into_iter().map(Decl::GlobalParam).collect()),
            None => Rewritten::One(Decl::GlobalParam(global)),
        }
    }

    fn rewrite_variable_ref(&mut self, expr: Expr) -> ExprResult {
        if let Some(expanded) = self.expansion_of(&expr) {
            self.problems.push(LowerProblem::DirectReference {
                span: expr.span,
                global: expanded.original_name,
            });
        }
        ExprResult::One(expr)
    }

    fn rewrite_access(&mut self, expr: Expr) -> ExprResult {
        let Expr { id, span, kind } = expr;
        match kind {
            ExprKind::Access(access) => self.reroute(id, span, access),
            other => ExprResult::One(Expr::new(id, span, other)),
        }
    }

    fn rewrite_call(&mut self, expr: Expr) -> ExprResult {
        let ExprResult::One(expr) = rewrite::walk_call(self, expr) else {
            return ExprResult::Removed;
        };
        let Expr { id, span, kind } = expr;
        match kind {
            ExprKind::Call(mut call) => {
                call.chain = self.chain(std::mem::take(&mut call.chain), id, span);
                ExprResult::One(Expr::new(id, span, ExprKind::Call(call)))
            }
            other => ExprResult::One(Expr::new(id, span, other)),
        }
    }
}

#[cfg(test)]
mod tests;
