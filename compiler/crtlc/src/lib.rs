//! CRTL compiler driver.
//!
//! Reads the parse tree produced by the external front end, replays it into
//! an AST and runs the pipeline:
//!
//! ```text
//! parse tree -> resolve -> expand struct globals -> rename entry point
//!            params -> generate HLSL -> emit metadata
//! ```
//!
//! Each pass reports into its own diagnostic queue; the driver stops at the
//! first pass that reported an error.

mod error;
pub mod frontend;
mod options;
mod pipeline;

use std::sync::Once;

pub use error::{CompileError, Phase};
pub use frontend::{build_program, FrontendError, ParseTree, Program};
pub use options::{CompileOptions, Invocation, UsageError};
pub use pipeline::{compile, compile_file, compile_json, write_outputs, Compiled};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Safe to call more than once. Nothing is installed unless `RUST_LOG` is
/// set, e.g. `RUST_LOG=crtl_lower=debug` or `RUST_LOG=crtl_hlsl=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(HierarchicalLayer::new(2).with_targets(true))
                .init();
        }
    });
}
