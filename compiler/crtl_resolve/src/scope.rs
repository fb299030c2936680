//! Lexical scope stack.
//!
//! The bottom scope is global. Local bindings are two-phase: a binding is
//! *declared* (visible, but reading it is an error) until its initializer
//! has been resolved, then *defined*.

use rustc_hash::FxHashMap;

use crtl_ir::{Name, NodeId, Span};

use crate::DeclKind;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum BindingState {
    Declared,
    Defined,
}

#[derive(Clone, Debug)]
pub(crate) struct Binding {
    pub decl: NodeId,
    pub name: Name,
    pub span: Option<Span>,
    pub kind: DeclKind,
    pub is_builtin: bool,
    pub state: BindingState,
    pub read: bool,
}

#[derive(Default, Debug)]
pub(crate) struct Scope {
    /// Bindings in declaration order.
    bindings: Vec<Binding>,
    index: FxHashMap<Name, usize>,
}

impl Scope {
    pub fn get(&self, name: Name) -> Option<&Binding> {
        self.index.get(&name).map(|&i| &self.bindings[i])
    }

    fn get_mut(&mut self, name: Name) -> Option<&mut Binding> {
        self.index.get(&name).map(|&i| &mut self.bindings[i])
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }
}

/// Stack of scopes, innermost last. Never empty.
pub(crate) struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn innermost(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Add a binding to the innermost scope.
    ///
    /// On a name clash returns the existing binding and leaves the scope
    /// unchanged.
    pub fn declare(&mut self, binding: Binding) -> Result<(), Binding> {
        let scope = self.innermost();
        if let Some(existing) = scope.get(binding.name) {
            return Err(existing.clone());
        }
        scope.index.insert(binding.name, scope.bindings.len());
        scope.bindings.push(binding);
        Ok(())
    }

    /// Mark the innermost binding of `name` as defined.
    pub fn define(&mut self, name: Name) {
        if let Some(binding) = self.innermost().get_mut(name) {
            binding.state = BindingState::Defined;
        }
    }

    /// Find `name`, innermost scope first.
    pub fn lookup(&self, name: Name) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Find `name` and record that it was read.
    pub fn lookup_read(&mut self, name: Name) -> Option<&Binding> {
        let scope = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.index.contains_key(&name))?;
        let binding = scope.get_mut(name)?;
        binding.read = true;
        Some(binding)
    }

    /// Find `name` in the global scope only.
    pub fn lookup_global(&self, name: Name) -> Option<&Binding> {
        self.scopes[0].get(name)
    }
}

#[cfg(test)]
mod tests;
