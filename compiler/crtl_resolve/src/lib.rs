//! Name resolution for CRTL.
//!
//! A single read-only pass over the [`Ast`](crtl_ir::Ast) that binds every
//! name reference to the declaration it denotes. The output,
//! [`ResolverPassResult`], is the cross-reference every later pass consumes:
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `struct_types` | [`StructRef`](crtl_ir::StructRef) id | `Struct` declaration id |
//! | `variables` | `Variable` expression id | variable/parameter/global declaration id |
//! | `calls` | `FunctionCall` expression id | `Function` declaration id |
//!
//! Resolution errors are accumulated; check
//! [`ResolverPassResult::has_errors`] before running the next pass.

mod problem;
mod resolver;
mod result;
mod scope;

pub use problem::{Namespace, ResolveProblem};
pub use resolver::resolve;
pub use result::{DeclInfo, DeclKind, ResolverPassResult};
