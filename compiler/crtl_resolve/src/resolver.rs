//! The resolver pass.

use tracing::{debug, trace};

use crtl_diagnostic::{DiagnosticConfig, DiagnosticQueue};
use crtl_ir::ast::{
    Ast, Block, Call, Decl, EntryPoint, Expr, ExprKind, Function, GlobalParam, Stmt, StructMember,
    Symbol, Variable,
};
use crtl_ir::visitor::{self, Visitor};
use crtl_ir::{Name, NodeId, Span, StringInterner, StructRef};

use crate::scope::{Binding, BindingState, ScopeStack};
use crate::{DeclInfo, DeclKind, Namespace, ResolveProblem, ResolverPassResult};

/// Resolve every name reference in `ast`.
///
/// `builtins` are pre-seeded into the global scope; they must be numbered
/// from the same id generator as `ast`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn resolve(
    ast: &Ast,
    builtins: &[Function],
    interner: &StringInterner,
    config: DiagnosticConfig,
) -> ResolverPassResult {
    let mut resolver = Resolver::new();

    for builtin in builtins {
        resolver.declare_global(builtin.id, builtin.symbol.name, None, DeclKind::Function, true);
    }
    for decl in &ast.decls {
        let kind = match decl {
            Decl::Function(_) => DeclKind::Function,
            Decl::EntryPoint(_) => DeclKind::EntryPoint,
            Decl::GlobalParam(_) => DeclKind::GlobalParam,
            Decl::Struct(_) => DeclKind::Struct,
            Decl::Variable(_) => DeclKind::GlobalVariable,
        };
        resolver.declare_global(decl.id(), decl.name(), decl.symbol().span, kind, false);
    }

    // Top-level initializers first, in order, so bodies see defined globals.
    for decl in &ast.decls {
        if let Decl::Variable(var) = decl {
            resolver.check_modifiers(&var.symbol);
            resolver.visit_type(&var.symbol.ty);
            if let Some(init) = &var.init {
                resolver.visit_expr(init);
            }
            resolver.scopes.define(var.symbol.name);
        }
    }
    for decl in &ast.decls {
        if !matches!(decl, Decl::Variable(_)) {
            resolver.visit_decl(decl);
        }
    }

    resolver.finish(interner, config)
}

struct Resolver {
    scopes: ScopeStack,
    result: ResolverPassResult,
    problems: Vec<ResolveProblem>,
}

impl Resolver {
    fn new() -> Self {
        Resolver {
            scopes: ScopeStack::new(),
            result: ResolverPassResult::default(),
            problems: Vec::new(),
        }
    }

    fn finish(mut self, interner: &StringInterner, config: DiagnosticConfig) -> ResolverPassResult {
        let mut queue = DiagnosticQueue::with_config(config);
        for problem in &self.problems {
            let diag = problem.into_diagnostic(interner);
            if problem.is_warning() {
                queue.push(diag);
            } else {
                queue.emit_error(diag);
            }
        }
        let error = queue.has_errors();
        debug!(
            variables = self.result.variables.len(),
            calls = self.result.calls.len(),
            struct_types = self.result.struct_types.len(),
            problems = self.problems.len(),
            "resolution finished"
        );
        self.result.set_diagnostics(queue.flush(), error);
        self.result
    }

    fn declare_global(
        &mut self,
        decl: NodeId,
        name: Name,
        span: Option<Span>,
        kind: DeclKind,
        is_builtin: bool,
    ) {
        // Top-level variables become readable once their initializer is resolved.
        let state = if kind == DeclKind::GlobalVariable {
            BindingState::Declared
        } else {
            BindingState::Defined
        };
        self.declare(decl, name, span, kind, is_builtin, state);
    }

    fn declare(
        &mut self,
        decl: NodeId,
        name: Name,
        span: Option<Span>,
        kind: DeclKind,
        is_builtin: bool,
        state: BindingState,
    ) {
        let binding = Binding {
            decl,
            name,
            span,
            kind,
            is_builtin,
            state,
            read: false,
        };
        match self.scopes.declare(binding) {
            Ok(()) => {
                trace!(?decl, ?kind, "declared");
                self.result.register_declaration(
                    decl,
                    DeclInfo {
                        kind,
                        name,
                        span,
                        is_builtin,
                    },
                );
            }
            Err(first) => self.problems.push(ResolveProblem::DuplicateDeclaration {
                span,
                name,
                first_span: first.span,
                first_is_builtin: first.is_builtin,
            }),
        }
    }

    /// Report a forbidden modifier combination on a declared symbol.
    fn check_modifiers(&mut self, symbol: &Symbol) {
        if let Some(conflict) = symbol.ty.modifiers.conflict() {
            self.problems.push(ResolveProblem::InvalidModifiers {
                span: symbol.span,
                conflict,
            });
        }
    }

    fn declare_param(&mut self, param: &Variable) {
        self.check_modifiers(&param.symbol);
        self.visit_type(&param.symbol.ty);
        self.declare(
            param.id,
            param.symbol.name,
            param.symbol.span,
            DeclKind::Parameter,
            false,
            BindingState::Defined,
        );
    }

    /// Pop a scope, warning about locals and parameters never read.
    fn pop_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        for binding in scope.into_bindings() {
            if !binding.read && matches!(binding.kind, DeclKind::Local | DeclKind::Parameter) {
                self.problems.push(ResolveProblem::UnusedVariable {
                    span: binding.span,
                    name: binding.name,
                    kind: binding.kind,
                });
            }
        }
    }

    /// Statements of a body, in the scope that already holds the parameters.
    fn visit_body(&mut self, body: &Block) {
        for stmt in &body.stmts {
            self.visit_stmt(stmt);
        }
    }

    /// Bind a `Variable` expression. `is_read` is false for a plain
    /// assignment target.
    fn resolve_value(&mut self, expr: &Expr, name: Name, is_read: bool) {
        let Some(binding) = self.scopes.lookup(name) else {
            self.problems.push(ResolveProblem::UndefinedReference {
                span: expr.span,
                name,
                namespace: Namespace::Value,
            });
            return;
        };

        if !binding.kind.is_value() {
            self.problems.push(ResolveProblem::NotAValue {
                span: expr.span,
                name,
                kind: binding.kind,
            });
            return;
        }
        if binding.state == BindingState::Declared {
            self.problems.push(ResolveProblem::ReadBeforeDefined {
                span: expr.span,
                name,
                declared_at: binding.span,
            });
            return;
        }

        let decl = binding.decl;
        if is_read {
            self.scopes.lookup_read(name);
        }
        self.result.bind_variable(expr.id, decl);
    }
}

impl<'ast> Visitor<'ast> for Resolver {
    fn visit_function(&mut self, function: &'ast Function) {
        self.scopes.push();
        for param in &function.params {
            self.declare_param(param);
        }
        if let Some(ret) = function.return_type() {
            self.visit_type(ret);
        }
        if let Some(body) = &function.body {
            self.visit_body(body);
        }
        self.pop_scope();
    }

    fn visit_entry_point(&mut self, entry: &'ast EntryPoint) {
        self.scopes.push();
        for param in &entry.params {
            self.declare_param(param);
        }
        self.visit_body(&entry.body);
        self.pop_scope();
    }

    fn visit_block(&mut self, block: &'ast Block) {
        self.scopes.push();
        visitor::walk_block(self, block);
        self.pop_scope();
    }

    fn visit_for(
        &mut self,
        _stmt: &'ast Stmt,
        init: Option<&'ast Stmt>,
        cond: Option<&'ast Expr>,
        advance: Option<&'ast Expr>,
        body: Option<&'ast Stmt>,
    ) {
        self.scopes.push();
        visitor::walk_for(self, init, cond, advance, body);
        self.pop_scope();
    }

    fn visit_var_decl(&mut self, _stmt: &'ast Stmt, var: &'ast Variable) {
        self.check_modifiers(&var.symbol);
        self.visit_type(&var.symbol.ty);
        self.declare(
            var.id,
            var.symbol.name,
            var.symbol.span,
            DeclKind::Local,
            false,
            BindingState::Declared,
        );
        if let Some(init) = &var.init {
            self.visit_expr(init);
        }
        self.scopes.define(var.symbol.name);
    }

    fn visit_variable_ref(&mut self, expr: &'ast Expr, name: Name) {
        self.resolve_value(expr, name, true);
    }

    fn visit_assignment(&mut self, _expr: &'ast Expr, target: &'ast Expr, value: &'ast Expr) {
        if let ExprKind::Variable(name) = &target.kind {
            self.resolve_value(target, *name, false);
        } else {
            self.visit_expr(target);
        }
        self.visit_expr(value);
    }

    fn visit_call(&mut self, expr: &'ast Expr, call: &'ast Call) {
        match self.scopes.lookup_global(call.callee) {
            None => self.problems.push(ResolveProblem::UndefinedReference {
                span: expr.span,
                name: call.callee,
                namespace: Namespace::Function,
            }),
            Some(binding) if binding.kind != DeclKind::Function => {
                self.problems.push(ResolveProblem::CallToNonFunction {
                    span: expr.span,
                    name: call.callee,
                    kind: binding.kind,
                    declared_at: binding.span,
                });
            }
            Some(binding) => {
                let decl = binding.decl;
                self.result.bind_call(expr.id, decl);
            }
        }
        visitor::walk_call(self, call);
    }

    fn visit_global_param(&mut self, global: &'ast GlobalParam) {
        self.check_modifiers(&global.symbol);
        self.visit_type(&global.symbol.ty);
    }

    fn visit_struct_member(&mut self, member: &'ast StructMember) {
        self.check_modifiers(&member.symbol);
        self.visit_type(&member.symbol.ty);
    }

    fn visit_struct_ref(&mut self, struct_ref: &'ast StructRef) {
        match self.scopes.lookup_global(struct_ref.name) {
            None => self.problems.push(ResolveProblem::UndefinedReference {
                span: struct_ref.span,
                name: struct_ref.name,
                namespace: Namespace::Type,
            }),
            Some(binding) if binding.kind != DeclKind::Struct => {
                self.problems.push(ResolveProblem::NotAStruct {
                    span: struct_ref.span,
                    name: struct_ref.name,
                    kind: binding.kind,
                });
            }
            Some(binding) => {
                let decl = binding.decl;
                self.result.bind_struct_type(struct_ref.id, decl);
            }
        }
    }
}
