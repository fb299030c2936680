//! Compiler options and command-line parsing.

use std::path::{Path, PathBuf};

use crtl_diagnostic::DiagnosticConfig;
use crtl_hlsl::CodegenOptions;

/// Knobs for one compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Where to write HLSL; stdout when unset.
    pub output: Option<PathBuf>,
    /// Where to write the metadata sidecar; next to `output` with a
    /// `.json` extension when unset.
    pub metadata: Option<PathBuf>,
    /// Compute-stage thread-group size.
    pub threads: [u32; 3],
    /// Pretty-print the sidecar.
    pub pretty: bool,
    /// Errors kept per pass (0 = unlimited).
    pub error_limit: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            output: None,
            metadata: None,
            threads: CodegenOptions::default().threads,
            pretty: false,
            error_limit: DiagnosticConfig::default().error_limit,
        }
    }
}

impl CompileOptions {
    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.error_limit,
            ..DiagnosticConfig::default()
        }
    }

    pub fn codegen(&self) -> CodegenOptions {
        CodegenOptions {
            threads: self.threads,
        }
    }

    /// The sidecar path, if one is written.
    pub fn metadata_path(&self) -> Option<PathBuf> {
        self.metadata
            .clone()
            .or_else(|| self.output.as_deref().map(|out| out.with_extension("json")))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing input file")]
    MissingInput,
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
    #[error("`{0}` expects a value")]
    MissingValue(&'static str),
    #[error("invalid thread-group size `{0}`, expected `x,y,z` with each at least 1")]
    InvalidThreads(String),
    #[error("invalid error limit `{0}`")]
    InvalidErrorLimit(String),
}

/// A parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub input: PathBuf,
    pub options: CompileOptions,
}

impl Invocation {
    /// Parse arguments, not including the program name.
    pub fn parse(args: &[String]) -> Result<Invocation, UsageError> {
        let mut input = None;
        let mut options = CompileOptions::default();
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            if arg == "-o" {
                let path = args.next().ok_or(UsageError::MissingValue("-o"))?;
                options.output = Some(PathBuf::from(path));
            } else if arg == "--metadata" {
                let path = args.next().ok_or(UsageError::MissingValue("--metadata"))?;
                options.metadata = Some(PathBuf::from(path));
            } else if let Some(value) = arg.strip_prefix("--threads=") {
                options.threads = parse_threads(value)?;
            } else if let Some(value) = arg.strip_prefix("--error-limit=") {
                options.error_limit = value
                    .parse()
                    .map_err(|_| UsageError::InvalidErrorLimit(value.to_owned()))?;
            } else if arg == "--pretty" {
                options.pretty = true;
            } else if !arg.starts_with('-') && input.is_none() {
                input = Some(PathBuf::from(arg));
            } else {
                return Err(UsageError::UnexpectedArgument(arg.clone()));
            }
        }
        let input = input.ok_or(UsageError::MissingInput)?;
        Ok(Invocation { input, options })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

fn parse_threads(value: &str) -> Result<[u32; 3], UsageError> {
    let invalid = || UsageError::InvalidThreads(value.to_owned());
    let parts: Vec<u32> = value
        .split(',')
        .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] if [*x, *y, *z].iter().all(|n| *n > 0) => Ok([*x, *y, *z]),
        _ => Err(invalid()),
    }
}
