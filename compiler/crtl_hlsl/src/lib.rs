//! HLSL backend for CRTL.
//!
//! Takes the lowered tree (struct globals expanded, entry-point parameters
//! renamed) and produces two artifacts:
//! - HLSL source text ([`generate`])
//! - a binding metadata record ([`emit_metadata`]) that maps every
//!   parameter, by its source name, to the registers it was given
//!
//! Register assignment lives in [`RegisterAllocator`]; the policy that maps
//! parameter types onto register classes lives in the `binding` module.

mod binding;
mod codegen;
mod intrinsics;
mod metadata;
mod problem;
mod registers;
mod types;
mod writer;

pub use binding::{
    BindingKind, BindingTable, BoundMember, BoundValue, ConstantBuffer, ParamBinding, SplitStruct,
};
pub use codegen::{generate, CodegenOptions, Generated};
pub use intrinsics::{compute_intrinsic, intrinsic, Intrinsic, COMPUTE_THREAD_ID};
pub use metadata::{
    emit_metadata, BindingInfo, ConstantBufferEntry, ConstantBufferInfo, EntryPointInfo,
    ExpandedGlobalInfo, MemberInfo, Metadata, ParamInfo, StructParamInfo, ValueParamInfo,
};
pub use problem::CodegenProblem;
pub use registers::{Binding, RegisterAllocator, RegisterClass};
pub use types::{type_name, UnsupportedType};
