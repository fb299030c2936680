//! Names a lowering pass must not generate.
//!
//! Both passes synthesize global names by joining two source names with
//! `_`. A joined name can land on a name the program already declares, or on
//! one generated earlier, and the target would then see two declarations, or
//! a local shadowing the generated global. [`TakenNames`] records every
//! global name as it is claimed so such collisions are reported instead.

use rustc_hash::FxHashMap;

use crtl_ir::ast::Decl;
use crtl_ir::{Builtin, Name, NodeRef, Span, StringInterner};

/// Global-scope names, each with where it was declared.
pub(crate) struct TakenNames {
    globals: FxHashMap<Name, Option<Span>>,
}

impl TakenNames {
    pub(crate) fn new(decls: &[Decl]) -> Self {
        let globals = decls
            .iter()
            .map(|d| (d.symbol().name, d.symbol().span))
            .collect();
        TakenNames { globals }
    }

    /// Reserve `name` for a global generated from the declaration at `span`.
    ///
    /// On collision returns the span of the declaration already holding the
    /// name (`None` for builtins and generated globals).
    pub(crate) fn claim(
        &mut self,
        name: Name,
        span: Option<Span>,
        locals: &LocalNames,
        interner: &StringInterner,
    ) -> Result<(), Option<Span>> {
        if let Some(existing) = self.globals.get(&name).or_else(|| locals.get(name)) {
            return Err(*existing);
        }
        if Builtin::from_name(interner.lookup(name)).is_some() {
            return Err(None);
        }
        self.globals.insert(name, span);
        Ok(())
    }
}

/// Variables declared inside bodies, which would shadow a generated global.
#[derive(Default)]
pub(crate) struct LocalNames {
    names: FxHashMap<Name, Option<Span>>,
}

impl LocalNames {
    /// Every variable declared at or below `roots`.
    pub(crate) fn collect<'a>(roots: impl IntoIterator<Item = NodeRef<'a>>) -> Self {
        let mut names = FxHashMap::default();
        for root in roots {
            root.for_each_descendant(&mut |node| {
                if let NodeRef::Variable(var) = node {
                    names.entry(var.symbol.name).or_insert(var.symbol.span);
                }
            });
        }
        LocalNames { names }
    }

    /// Locals and parameters of every function body, and the locals of
    /// every entry-point body. Entry-point parameters are hoisted under new
    /// names, so they are not included.
    pub(crate) fn in_bodies(decls: &[Decl]) -> Self {
        let mut roots = Vec::new();
        for decl in decls {
            match decl {
                Decl::Function(_) => roots.push(NodeRef::Decl(decl)),
                Decl::EntryPoint(entry) => roots.extend(entry.body.stmts.iter().map(NodeRef::Stmt)),
                _ => {}
            }
        }
        LocalNames::collect(roots)
    }

    fn get(&self, name: Name) -> Option<&Option<Span>> {
        self.names.get(&name)
    }
}
