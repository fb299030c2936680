//! CRTL compiler CLI.

use std::io::IsTerminal;
use std::process::ExitCode;

use crtl_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use crtl_diagnostic::Diagnostic;
use crtlc::{compile_file, write_outputs, CompileError, Invocation};

fn print_usage() {
    eprintln!("Usage: crtlc <parse-tree.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o <path>            Write HLSL here (default: stdout)");
    eprintln!("  --metadata <path>    Write binding metadata here (default: next to -o)");
    eprintln!("  --threads=x,y,z      Compute thread-group size (default: 8,8,1)");
    eprintln!("  --pretty             Pretty-print the metadata");
    eprintln!("  --error-limit=<n>    Errors reported per pass, 0 for no limit (default: 20)");
}

fn report(file: &str, diagnostics: &[Diagnostic]) {
    let stderr = std::io::stderr();
    let is_tty = stderr.is_terminal();
    let mut emitter = TerminalEmitter::stderr(ColorMode::Auto, is_tty).with_file(file);
    emitter.emit_all(diagnostics);
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    if errors > 0 {
        emitter.emit_summary(errors, warnings);
    }
    emitter.flush();
}

fn main() -> ExitCode {
    crtlc::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return ExitCode::FAILURE;
    }
    let invocation = match Invocation::parse(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let file = invocation.input.display().to_string();
    let result = compile_file(&invocation.input, &invocation.options)
        .and_then(|compiled| {
            report(&file, &compiled.warnings);
            write_outputs(&compiled, &invocation.options)
        });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CompileError::Halted { diagnostics, .. }) => {
            report(&file, &diagnostics);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
