//! Catalogue of builtin functions.
//!
//! Builtins are pre-seeded into the resolver's global scope as body-less
//! [`Function`](crate::ast::Function)s with no source reference. The code
//! generator maps each one to target syntax.

use crate::ast::{Primitive, Type, TypeKind};

/// Builtin functions, identified by their CRTL name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Builtin {
    // Ray dispatch
    DispatchRaysIndex,
    DispatchRaysDimensions,
    WorldRayOrigin,
    WorldRayDirection,
    RayTMin,
    RayTCurrent,
    InstanceIndex,
    PrimitiveIndex,
    TraceRay,
    MakeRay,
    IgnoreHit,
    AcceptHitAndEndSearch,
    // Math
    Dot,
    Cross,
    Normalize,
    Length,
    Min,
    Max,
    Clamp,
    Mix,
    Sqrt,
    Abs,
    Saturate,
}

impl Builtin {
    pub const ALL: &'static [Builtin] = &[
        Builtin::DispatchRaysIndex,
        Builtin::DispatchRaysDimensions,
        Builtin::WorldRayOrigin,
        Builtin::WorldRayDirection,
        Builtin::RayTMin,
        Builtin::RayTCurrent,
        Builtin::InstanceIndex,
        Builtin::PrimitiveIndex,
        Builtin::TraceRay,
        Builtin::MakeRay,
        Builtin::IgnoreHit,
        Builtin::AcceptHitAndEndSearch,
        Builtin::Dot,
        Builtin::Cross,
        Builtin::Normalize,
        Builtin::Length,
        Builtin::Min,
        Builtin::Max,
        Builtin::Clamp,
        Builtin::Mix,
        Builtin::Sqrt,
        Builtin::Abs,
        Builtin::Saturate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::DispatchRaysIndex => "dispatch_rays_index",
            Builtin::DispatchRaysDimensions => "dispatch_rays_dimensions",
            Builtin::WorldRayOrigin => "world_ray_origin",
            Builtin::WorldRayDirection => "world_ray_direction",
            Builtin::RayTMin => "ray_t_min",
            Builtin::RayTCurrent => "ray_t_current",
            Builtin::InstanceIndex => "instance_index",
            Builtin::PrimitiveIndex => "primitive_index",
            Builtin::TraceRay => "trace_ray",
            Builtin::MakeRay => "make_ray",
            Builtin::IgnoreHit => "ignore_hit",
            Builtin::AcceptHitAndEndSearch => "accept_hit_and_end_search",
            Builtin::Dot => "dot",
            Builtin::Cross => "cross",
            Builtin::Normalize => "normalize",
            Builtin::Length => "length",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Clamp => "clamp",
            Builtin::Mix => "mix",
            Builtin::Sqrt => "sqrt",
            Builtin::Abs => "abs",
            Builtin::Saturate => "saturate",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// Declared result type. Math builtins are generic over their argument
    /// and are declared as `float`; no expression-level type checking
    /// consumes this.
    pub fn return_type(self) -> Type {
        match self {
            Builtin::DispatchRaysIndex | Builtin::DispatchRaysDimensions => {
                Type::vector(Primitive::Uint, 3)
            }
            Builtin::WorldRayOrigin | Builtin::WorldRayDirection | Builtin::Cross => {
                Type::vector(Primitive::Float, 3)
            }
            Builtin::InstanceIndex | Builtin::PrimitiveIndex => Type::primitive(Primitive::Uint),
            Builtin::TraceRay | Builtin::IgnoreHit | Builtin::AcceptHitAndEndSearch => Type::void(),
            Builtin::MakeRay => Type::new(TypeKind::Ray),
            Builtin::RayTMin
            | Builtin::RayTCurrent
            | Builtin::Dot
            | Builtin::Normalize
            | Builtin::Length
            | Builtin::Min
            | Builtin::Max
            | Builtin::Clamp
            | Builtin::Mix
            | Builtin::Sqrt
            | Builtin::Abs
            | Builtin::Saturate => Type::primitive(Primitive::Float),
        }
    }
}
