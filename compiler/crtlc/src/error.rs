//! Driver errors.
//!
//! User-facing problems in the program travel as diagnostics; a
//! [`CompileError::Halted`] carries every diagnostic reported up to and
//! including the pass that stopped the pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crtl_diagnostic::Diagnostic;

use crate::frontend::FrontendError;

/// Pipeline phase, for reporting where compilation stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Resolve,
    Expand,
    Rename,
    Generate,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Resolve => "name resolution",
            Phase::Expand => "struct global expansion",
            Phase::Rename => "entry point parameter renaming",
            Phase::Generate => "code generation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed parse tree: {0}")]
    ParseTree(#[from] serde_json::Error),
    #[error("cannot serialize metadata: {0}")]
    Metadata(#[source] serde_json::Error),
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error("{phase} failed")]
    Halted {
        phase: Phase,
        diagnostics: Vec<Diagnostic>,
    },
}

impl CompileError {
    /// Diagnostics to show the user, if compilation halted on them.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::Halted { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}
