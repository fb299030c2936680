//! HLSL source generation.
//!
//! One pass over the lowered tree. Parameters are bound as they are met:
//! global parameters where they are declared, entry-point parameters just
//! before their entry point, where they are hoisted to global scope. The
//! allocator is threaded through the whole pass, so bindings follow
//! declaration order.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crtl_diagnostic::{DiagnosticConfig, DiagnosticQueue, ErrorGuaranteed};
use crtl_ir::ast::{
    Ast, Block, Constant, Decl, EntryPoint, Expr, ExprKind, Fragment, Function, GlobalParam,
    Modifiers, Stage, Stmt, StmtKind, Struct, StructRef, Type, TypeKind, Variable,
};
use crtl_ir::{Builtin, Name, NodeId, Span, StringInterner};
use crtl_resolve::ResolverPassResult;

use crate::binding::{self, BindingKind, BindingTable, Param, ParamBinding, SplitStruct};
use crate::intrinsics;
use crate::problem::CodegenProblem;
use crate::registers::RegisterAllocator;
use crate::types::{self, UnsupportedType};
use crate::writer::SourceWriter;

/// Knobs for the HLSL backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenOptions {
    /// `[numthreads(x, y, z)]` for compute entry points.
    pub threads: [u32; 3],
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions { threads: [8, 8, 1] }
    }
}

/// Output of [`generate`].
#[derive(Debug)]
pub struct Generated {
    pub source: String,
    pub bindings: BindingTable,
    pub diagnostics: DiagnosticQueue,
}

impl Generated {
    /// The pass's had-error flag.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.diagnostics.has_errors()
    }
}

/// Emit HLSL for a resolved, lowered tree.
#[tracing::instrument(level = "debug", skip_all)]
pub fn generate(
    ast: &Ast,
    xref: &ResolverPassResult,
    interner: &StringInterner,
    options: &CodegenOptions,
    config: DiagnosticConfig,
) -> Generated {
    let mut gen = Generator {
        xref,
        interner,
        options,
        structs: ast.structs().map(|s| (s.id, s)).collect(),
        alloc: RegisterAllocator::new(),
        out: SourceWriter::new(),
        bindings: BindingTable::default(),
        split_params: FxHashMap::default(),
        helpers: Vec::new(),
        stage: None,
        problems: Vec::new(),
    };
    for decl in &ast.decls {
        gen.decl(decl);
    }
    gen.finish(config)
}

struct Generator<'a> {
    xref: &'a ResolverPassResult,
    interner: &'a StringInterner,
    options: &'a CodegenOptions,
    structs: FxHashMap<NodeId, &'a Struct>,
    alloc: RegisterAllocator,
    out: SourceWriter,
    bindings: BindingTable,
    /// Entry-point parameters bound member by member.
    split_params: FxHashMap<NodeId, (Name, SplitStruct)>,
    /// Prelude definitions, in first-use order.
    helpers: Vec<&'static str>,
    /// Stage of the entry point being emitted.
    stage: Option<Stage>,
    problems: Vec<CodegenProblem>,
}

impl<'a> Generator<'a> {
    fn finish(self, config: DiagnosticConfig) -> Generated {
        let mut source = SourceWriter::new();
        for helper in &self.helpers {
            source.raw(helper);
            source.blank();
        }
        source.raw(&self.out.finish());

        let mut diagnostics = DiagnosticQueue::with_config(config);
        for problem in &self.problems {
            diagnostics.emit_error(problem.into_diagnostic(self.interner));
        }
        debug!(
            bindings = self.bindings.len(),
            helpers = self.helpers.len(),
            errors = self.problems.len(),
            "hlsl generated"
        );
        Generated {
            source: source.finish(),
            bindings: self.bindings,
            diagnostics,
        }
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn type_error(&mut self, ty: &Type, span: Option<Span>) {
        self.problems.push(CodegenProblem::UnsupportedType {
            span,
            ty: ty.display(self.interner).to_string(),
        });
    }

    fn declarator(&mut self, ty: &Type, name: Name, span: Option<Span>) -> String {
        let text = self.name(name);
        match types::declarator(ty, text, self.interner) {
            Ok(decl) => decl,
            Err(UnsupportedType) => {
                self.type_error(ty, span);
                format!("/* unsupported */ {text}")
            }
        }
    }

    fn type_name(&mut self, ty: &Type, span: Option<Span>) -> String {
        match types::type_name(ty, self.interner) {
            Ok(name) => name,
            Err(UnsupportedType) => {
                self.type_error(ty, span);
                "/* unsupported */".to_owned()
            }
        }
    }

    fn struct_of(&self, struct_ref: &StructRef) -> Option<&'a Struct> {
        self.xref
            .struct_decl(struct_ref.id)
            .and_then(|decl| self.structs.get(&decl).copied())
    }

    // Declarations

    fn decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::Struct(s) => self.struct_decl(s),
            Decl::GlobalParam(g) => self.global_param(g),
            Decl::Variable(v) => self.global_variable(v),
            Decl::Function(f) => self.function(f),
            Decl::EntryPoint(e) => self.entry_point(e),
        }
    }

    fn struct_decl(&mut self, decl: &Struct) {
        let name = self.name(decl.symbol.name);
        self.out.blank();
        self.out.line(&format!("struct {name}"));
        self.out.open();
        for member in &decl.members {
            let line = self.declarator(&member.symbol.ty, member.symbol.name, member.symbol.span);
            self.out.line(&format!("{line};"));
        }
        self.out.close(";");
    }

    fn global_param(&mut self, global: &GlobalParam) {
        let param = Param {
            decl: global.id,
            name: global.symbol.name,
            span: global.symbol.span,
            ty: &global.symbol.ty,
        };
        if let Some(binding) = self.bind(&param) {
            self.emit_binding(&binding, global.symbol.span);
            self.bindings.insert(binding);
        }
    }

    /// Bind a parameter, recording problems instead of a binding on failure.
    fn bind(&mut self, param: &Param<'_>) -> Option<ParamBinding> {
        let result = match param.ty.as_struct() {
            Some(struct_ref) => match self.struct_of(struct_ref) {
                Some(decl) => binding::bind_split(&mut self.alloc, param, decl, self.interner),
                None => Err(vec![CodegenProblem::Unresolved {
                    span: struct_ref.span,
                    name: struct_ref.name,
                }]),
            },
            None => binding::bind_value(&mut self.alloc, param, self.interner)
                .map_err(|problem| vec![problem]),
        };
        match result {
            Ok(binding) => {
                trace!(name = self.name(binding.output_name), "bound parameter");
                Some(binding)
            }
            Err(problems) => {
                self.problems.extend(problems);
                None
            }
        }
    }

    fn emit_binding(&mut self, binding: &ParamBinding, span: Option<Span>) {
        self.out.blank();
        match &binding.kind {
            BindingKind::Value(value) if value.in_constant_buffer() => {
                let name = self.name(binding.output_name);
                self.out
                    .line(&format!("cbuffer {name}_cb : {}", value.binding));
                self.out.open();
                let line = self.declarator(&value.ty, binding.output_name, span);
                self.out.line(&format!("{line};"));
                self.out.close(";");
            }
            BindingKind::Value(value) => {
                let line = self.declarator(&value.ty, binding.output_name, span);
                self.out.line(&format!("{line} : {};", value.binding));
            }
            BindingKind::Split(split) => {
                if let Some(cb) = &split.constant_buffer {
                    let name = self.name(cb.name);
                    self.out.line(&format!("cbuffer {name} : {}", cb.binding));
                    self.out.open();
                    let held = split
                        .members
                        .iter()
                        .filter(|m| cb.contents.contains(&m.output_name));
                    for member in held {
                        let line = self.declarator(&member.ty, member.output_name, span);
                        self.out.line(&format!("{line};"));
                    }
                    self.out.close(";");
                }
                for member in &split.members {
                    let in_cb = split
                        .constant_buffer
                        .as_ref()
                        .is_some_and(|cb| cb.contents.contains(&member.output_name));
                    if !in_cb {
                        let line = self.declarator(&member.ty, member.output_name, span);
                        self.out.line(&format!("{line} : {};", member.binding));
                    }
                }
            }
        }
    }

    fn global_variable(&mut self, var: &Variable) {
        let decl = self.declarator(&var.symbol.ty, var.symbol.name, var.symbol.span);
        let constness = if var.symbol.ty.modifiers.contains(Modifiers::CONST) {
            "const "
        } else {
            ""
        };
        self.out.blank();
        match &var.init {
            Some(init) => {
                let init = self.expr(init);
                self.out
                    .line(&format!("static {constness}{decl} = {init};"));
            }
            None => self.out.line(&format!("static {constness}{decl};")),
        }
    }

    fn function(&mut self, function: &Function) {
        // Builtins have no body to emit.
        let Some(body) = &function.body else {
            return;
        };
        let Some(ret) = function.return_type() else {
            self.problems.push(CodegenProblem::MismatchedEntryPointType {
                span: function.symbol.span,
                name: function.symbol.name,
                expected: "a function",
            });
            return;
        };
        let ret = self.type_name(ret, function.symbol.span);
        let params: Vec<_> = function
            .params
            .iter()
            .map(|p| {
                let decl = self.declarator(&p.symbol.ty, p.symbol.name, p.symbol.span);
                format!("{}{decl}", types::qualifiers(p.symbol.ty.modifiers))
            })
            .collect();
        let name = self.name(function.symbol.name);
        self.out.blank();
        self.out
            .line(&format!("{ret} {name}({})", params.join(", ")));
        self.block(body);
    }

    fn entry_point(&mut self, entry: &EntryPoint) {
        let stage_matches = matches!(
            &entry.symbol.ty.kind,
            TypeKind::EntryPoint(sig) if sig.stage == entry.stage
        );
        if !stage_matches {
            self.problems.push(CodegenProblem::MismatchedEntryPointType {
                span: entry.symbol.span,
                name: entry.symbol.name,
                expected: "an entry-point",
            });
            return;
        }

        for param in &entry.params {
            let request = Param {
                decl: param.id,
                name: param.symbol.name,
                span: param.symbol.span,
                ty: &param.symbol.ty,
            };
            let Some(binding) = self.bind(&request) else {
                continue;
            };
            self.emit_binding(&binding, param.symbol.span);
            if let Some(split) = binding.as_split() {
                self.split_params
                    .insert(param.id, (binding.output_name, split.clone()));
            }
            self.bindings.insert(binding);
        }

        self.out.blank();
        match entry.stage {
            Stage::Compute => {
                let [x, y, z] = self.options.threads;
                self.out.line(&format!("[numthreads({x}, {y}, {z})]"));
            }
            stage => self
                .out
                .line(&format!("[shader(\"{}\")]", stage.as_str())),
        }
        let name = self.name(entry.symbol.name);
        let inputs = match entry.stage {
            Stage::Compute => {
                format!("uint3 {} : SV_DispatchThreadID", intrinsics::COMPUTE_THREAD_ID)
            }
            _ => String::new(),
        };
        self.out.line(&format!("void {name}({inputs})"));
        self.stage = Some(entry.stage);
        self.block(&entry.body);
        self.stage = None;
    }

    // Statements

    fn block(&mut self, block: &Block) {
        self.out.open();
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        self.out.close("");
    }

    /// A branch or loop body, always braced.
    fn body(&mut self, stmt: Option<&Stmt>) {
        match stmt.map(|s| &s.kind) {
            Some(StmtKind::Block(block)) => self.block(block),
            Some(_) => {
                self.out.open();
                if let Some(stmt) = stmt {
                    self.stmt(stmt);
                }
                self.out.close("");
            }
            None => {
                self.out.open();
                self.out.close("");
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => self.block(block),
            StmtKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.expr(cond);
                self.out.line(&format!("if ({cond})"));
                self.body(Some(then_branch));
                if let Some(else_branch) = else_branch {
                    self.out.line("else");
                    self.body(Some(else_branch));
                }
            }
            StmtKind::While { cond, body } => {
                let cond = self.expr(cond);
                self.out.line(&format!("while ({cond})"));
                self.body(body.as_deref());
            }
            StmtKind::For {
                init,
                cond,
                advance,
                body,
            } => {
                let init = init
                    .as_deref()
                    .map(|s| self.inline_stmt(s))
                    .unwrap_or_default();
                let cond = cond.as_ref().map(|c| self.expr(c)).unwrap_or_default();
                let advance = advance.as_ref().map(|a| self.expr(a)).unwrap_or_default();
                self.out
                    .line(&format!("for ({init}; {cond}; {advance})"));
                self.body(body.as_deref());
            }
            StmtKind::Return(Some(value)) => {
                let value = self.expr(value);
                self.out.line(&format!("return {value};"));
            }
            StmtKind::Return(None) => self.out.line("return;"),
            StmtKind::VariableDeclaration(_) | StmtKind::Expression(_) => {
                let text = self.inline_stmt(stmt);
                self.out.line(&format!("{text};"));
            }
        }
    }

    /// A declaration or expression statement without its `;`.
    fn inline_stmt(&mut self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::VariableDeclaration(var) => {
                let constness = if var.symbol.ty.modifiers.contains(Modifiers::CONST) {
                    "const "
                } else {
                    ""
                };
                let decl = self.declarator(&var.symbol.ty, var.symbol.name, var.symbol.span);
                match &var.init {
                    Some(init) => format!("{constness}{decl} = {}", self.expr(init)),
                    None => format!("{constness}{decl}"),
                }
            }
            StmtKind::Expression(expr) => self.expr(expr),
            _ => String::new(),
        }
    }

    // Expressions

    /// Operands that need parentheses to keep their grouping.
    fn operand(&mut self, expr: &Expr) -> String {
        let text = self.expr(expr);
        match expr.kind {
            ExprKind::Binary { .. } | ExprKind::Assignment { .. } => format!("({text})"),
            _ => text,
        }
    }

    fn expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Unary { op, operand } => {
                let text = self.operand(operand);
                // `-(-x)` must not print as the decrement `--x`.
                if matches!(operand.kind, ExprKind::Unary { .. }) || text.starts_with('-') {
                    format!("{}({text})", op.as_symbol())
                } else {
                    format!("{}{text}", op.as_symbol())
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.operand(left);
                let right = self.operand(right);
                format!("{left} {} {right}", op.as_symbol())
            }
            ExprKind::Variable(name) => {
                if let Some((output, _)) = self.split_member(expr, None) {
                    self.problems.push(CodegenProblem::SplitStructUse {
                        span: expr.span,
                        param: output,
                    });
                }
                self.name(*name).to_owned()
            }
            ExprKind::Constant(value) => constant(*value),
            ExprKind::Call(call) => {
                let (callee, is_call) = self.callee(expr, call.callee);
                let args: Vec<_> = call.args.iter().map(|a| self.expr(a)).collect();
                let chain = self.chain(&call.chain);
                if is_call {
                    format!("{callee}({}){chain}", args.join(", "))
                } else {
                    format!("{callee}{chain}")
                }
            }
            ExprKind::Access(access) => self.access(expr, &access.base, &access.chain),
            ExprKind::Assignment { target, value } => {
                let target = self.expr(target);
                let value = self.expr(value);
                format!("{target} = {value}")
            }
        }
    }

    /// For a reference to a split parameter: the parameter's output name,
    /// and the output name of `member` if its struct has that member.
    fn split_member(&self, var: &Expr, member: Option<Name>) -> Option<(Name, Option<Name>)> {
        let decl = self.xref.variable_decl(var.id)?;
        let (output, split) = self.split_params.get(&decl)?;
        let member = member.and_then(|m| split.member(m)).map(|m| m.output_name);
        Some((*output, member))
    }

    /// Callee text, translating builtins, and whether it takes the
    /// argument list.
    fn callee(&mut self, expr: &Expr, name: Name) -> (String, bool) {
        let Some(info) = self.xref.callee_info(expr.id).copied() else {
            self.problems.push(CodegenProblem::Unresolved {
                span: expr.span,
                name,
            });
            return (self.name(name).to_owned(), true);
        };
        let text = self.name(info.name);
        if !info.is_builtin {
            return (text.to_owned(), true);
        }
        let Some(builtin) = Builtin::from_name(text) else {
            self.problems.push(CodegenProblem::UnrecognizedBuiltin {
                span: expr.span,
                name: info.name,
            });
            return (text.to_owned(), true);
        };
        let translation = match self.stage {
            Some(Stage::Compute) => intrinsics::compute_intrinsic(builtin),
            _ => Some(intrinsics::intrinsic(builtin)),
        };
        let Some(intrinsic) = translation else {
            self.problems.push(CodegenProblem::BuiltinUnavailable {
                span: expr.span,
                name: info.name,
                stage: Stage::Compute,
            });
            return (text.to_owned(), true);
        };
        if let Some(helper) = intrinsic.helper {
            if !self.helpers.contains(&helper) {
                self.helpers.push(helper);
            }
        }
        (intrinsic.name.to_owned(), intrinsic.is_call)
    }

    fn access(&mut self, expr: &Expr, base: &Expr, chain: &[Fragment]) -> String {
        let (first, first_span) = match chain.first() {
            Some(Fragment::Member { name, span }) => (Some(*name), *span),
            _ => (None, None),
        };
        let Some((output, member)) = self.split_member(base, first) else {
            let base = self.expr(base);
            return format!("{base}{}", self.chain(chain));
        };
        match (first, member) {
            (Some(_), Some(member)) => {
                let rest = self.chain(&chain[1..]);
                format!("{}{rest}", self.name(member))
            }
            (Some(name), None) => {
                self.problems.push(CodegenProblem::UnknownMember {
                    span: first_span.or(expr.span),
                    param: output,
                    member: name,
                });
                String::new()
            }
            (None, _) => {
                self.problems.push(CodegenProblem::SplitStructUse {
                    span: base.span,
                    param: output,
                });
                String::new()
            }
        }
    }

    fn chain(&mut self, chain: &[Fragment]) -> String {
        let mut out = String::new();
        for fragment in chain {
            match fragment {
                Fragment::Member { name, .. } => {
                    out.push('.');
                    out.push_str(self.name(*name));
                }
                Fragment::Index(index) => {
                    let index = self.expr(index);
                    out.push('[');
                    out.push_str(&index);
                    out.push(']');
                }
            }
        }
        out
    }
}

fn constant(value: Constant) -> String {
    match value {
        Constant::Bool(b) => b.to_string(),
        Constant::Int(i) => i.to_string(),
        // HLSL has no infinity or NaN literals; spell their bit patterns.
        Constant::Float(f) if f.is_nan() => "asfloat(0x7fc00000)".to_owned(),
        Constant::Float(f) if f.is_infinite() => {
            let bits = if f.is_sign_positive() { "0x7f800000" } else { "0xff800000" };
            format!("asfloat({bits})")
        }
        Constant::Float(f) => format!("{f:?}"),
        Constant::Double(d) if d.is_nan() => "asdouble(0x00000000, 0x7ff80000)".to_owned(),
        Constant::Double(d) if d.is_infinite() => {
            let high = if d.is_sign_positive() { "0x7ff00000" } else { "0xfff00000" };
            format!("asdouble(0x00000000, {high})")
        }
        Constant::Double(d) => format!("{d:?}L"),
    }
}

#[cfg(test)]
mod tests;
