//! The compilation pipeline.
//!
//! Passes run strictly in order; each pass's had-error flag is checked
//! before the next one starts.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crtl_diagnostic::{Diagnostic, DiagnosticQueue};
use crtl_hlsl::{emit_metadata, generate, Metadata};
use crtl_ir::node::count_nodes;
use crtl_ir::StringInterner;
use crtl_lower::{expand_struct_globals, rename_entry_point_params, Lowered};
use crtl_resolve::resolve;

use crate::error::{CompileError, Phase};
use crate::frontend::{build_program, ParseTree, Program};
use crate::options::CompileOptions;

/// Both artifacts of a successful compilation.
#[derive(Clone, Debug)]
pub struct Compiled {
    pub source: String,
    pub metadata: Metadata,
    /// Warnings from every pass.
    pub warnings: Vec<Diagnostic>,
}

impl Compiled {
    pub fn metadata_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(&self.metadata)
        } else {
            serde_json::to_string(&self.metadata)
        }
    }
}

/// Run every pass over `program`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(
    program: Program,
    interner: &StringInterner,
    options: &CompileOptions,
) -> Result<Compiled, CompileError> {
    let config = options.diagnostic_config();
    let mut reported = Vec::new();
    debug!(
        decls = program.ast.decls.len(),
        nodes = count_nodes(&program.ast.decls),
        "program built"
    );

    let mut xref = resolve(&program.ast, &program.builtins, interner, config);
    let failed = xref.has_errors().is_some();
    reported.extend(xref.take_diagnostics());
    if failed {
        return Err(halt(Phase::Resolve, reported));
    }

    let Lowered {
        ast,
        output: expansions,
        mut diagnostics,
    } = expand_struct_globals(program.ast, &mut xref, interner, config);
    checkpoint(Phase::Expand, &mut diagnostics, &mut reported)?;

    let Lowered {
        ast,
        output: renames,
        mut diagnostics,
    } = rename_entry_point_params(ast, &mut xref, interner, config);
    checkpoint(Phase::Rename, &mut diagnostics, &mut reported)?;

    let mut generated = generate(&ast, &xref, interner, &options.codegen(), config);
    checkpoint(Phase::Generate, &mut generated.diagnostics, &mut reported)?;

    let metadata = emit_metadata(&ast, &generated.bindings, &expansions, &renames, interner);
    debug!(
        lowered_nodes = count_nodes(&ast.decls),
        bytes = generated.source.len(),
        bindings = generated.bindings.len(),
        warnings = reported.len(),
        "compilation finished"
    );
    Ok(Compiled {
        source: generated.source,
        metadata,
        warnings: reported,
    })
}

fn halt(phase: Phase, diagnostics: Vec<Diagnostic>) -> CompileError {
    info!(%phase, "pipeline halted");
    CompileError::Halted { phase, diagnostics }
}

/// Move a pass's diagnostics into `reported`, halting if it had errors.
fn checkpoint(
    phase: Phase,
    queue: &mut DiagnosticQueue,
    reported: &mut Vec<Diagnostic>,
) -> Result<(), CompileError> {
    let failed = queue.has_errors().is_some();
    reported.extend(queue.flush());
    if failed {
        return Err(halt(phase, std::mem::take(reported)));
    }
    Ok(())
}

/// Compile a JSON parse tree.
pub fn compile_json(text: &str, options: &CompileOptions) -> Result<Compiled, CompileError> {
    let tree: ParseTree = serde_json::from_str(text)?;
    let interner = StringInterner::new();
    let program = build_program(&tree, &interner)?;
    compile(program, &interner, options)
}

/// Compile the JSON parse tree stored at `path`.
pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<Compiled, CompileError> {
    let text = fs::read_to_string(path).map_err(|source| CompileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    compile_json(&text, options)
}

/// Write the artifacts where `options` says. Source goes to stdout when no
/// output path is set.
pub fn write_outputs(compiled: &Compiled, options: &CompileOptions) -> Result<(), CompileError> {
    match &options.output {
        Some(path) => write(path, &compiled.source)?,
        None => print!("{}", compiled.source),
    }
    if let Some(path) = options.metadata_path() {
        let mut json = compiled
            .metadata_json(options.pretty)
            .map_err(CompileError::Metadata)?;
        json.push('\n');
        write(&path, &json)?;
    }
    Ok(())
}

fn write(path: &Path, contents: &str) -> Result<(), CompileError> {
    fs::write(path, contents).map_err(|source| CompileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
