//! Builtin call translation.
//!
//! Every [`Builtin`] maps to an HLSL intrinsic or to a helper defined in the
//! generated prelude. The table is closed: a builtin declaration whose name
//! is not a [`Builtin`] has no translation.
//!
//! Compute entry points have no ray-tracing intrinsics. There the ray index
//! reads the thread id the entry point receives as `SV_DispatchThreadID`,
//! and builtins with no compute counterpart have no translation.

use crtl_ir::Builtin;

/// HLSL spelling of one builtin.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Intrinsic {
    /// Callee name in the generated source.
    pub name: &'static str,
    /// Prelude definition `name` depends on.
    pub helper: Option<&'static str>,
    /// Called with the argument list; `false` for plain values.
    pub is_call: bool,
}

/// Compute entry-point parameter bound to `SV_DispatchThreadID`.
pub const COMPUTE_THREAD_ID: &str = "crtl_thread_id";

const MAKE_RAY_HELPER: &str = "\
RayDesc crtl_make_ray(float3 origin, float3 direction, float tmin, float tmax)
{
    RayDesc ray;
    ray.Origin = origin;
    ray.Direction = direction;
    ray.TMin = tmin;
    ray.TMax = tmax;
    return ray;
}
";

const TRACE_RAY_HELPER: &str = "\
#define crtl_trace_ray(scene, ray, payload) \\
    TraceRay(scene, RAY_FLAG_NONE, 0xFF, 0, 1, 0, ray, payload)
";

const fn plain(name: &'static str) -> Intrinsic {
    Intrinsic {
        name,
        helper: None,
        is_call: true,
    }
}

pub fn intrinsic(builtin: Builtin) -> Intrinsic {
    match builtin {
        Builtin::DispatchRaysIndex => plain("DispatchRaysIndex"),
        Builtin::DispatchRaysDimensions => plain("DispatchRaysDimensions"),
        Builtin::WorldRayOrigin => plain("WorldRayOrigin"),
        Builtin::WorldRayDirection => plain("WorldRayDirection"),
        Builtin::RayTMin => plain("RayTMin"),
        Builtin::RayTCurrent => plain("RayTCurrent"),
        Builtin::InstanceIndex => plain("InstanceIndex"),
        Builtin::PrimitiveIndex => plain("PrimitiveIndex"),
        Builtin::TraceRay => Intrinsic {
            name: "crtl_trace_ray",
            helper: Some(TRACE_RAY_HELPER),
            is_call: true,
        },
        Builtin::MakeRay => Intrinsic {
            name: "crtl_make_ray",
            helper: Some(MAKE_RAY_HELPER),
            is_call: true,
        },
        Builtin::IgnoreHit => plain("IgnoreHit"),
        Builtin::AcceptHitAndEndSearch => plain("AcceptHitAndEndSearch"),
        Builtin::Dot => plain("dot"),
        Builtin::Cross => plain("cross"),
        Builtin::Normalize => plain("normalize"),
        Builtin::Length => plain("length"),
        Builtin::Min => plain("min"),
        Builtin::Max => plain("max"),
        Builtin::Clamp => plain("clamp"),
        Builtin::Mix => plain("lerp"),
        Builtin::Sqrt => plain("sqrt"),
        Builtin::Abs => plain("abs"),
        Builtin::Saturate => plain("saturate"),
    }
}

/// Translation inside a compute entry point, `None` for ray-tracing-only
/// builtins.
pub fn compute_intrinsic(builtin: Builtin) -> Option<Intrinsic> {
    match builtin {
        Builtin::DispatchRaysIndex => Some(Intrinsic {
            name: COMPUTE_THREAD_ID,
            helper: None,
            is_call: false,
        }),
        Builtin::DispatchRaysDimensions
        | Builtin::WorldRayOrigin
        | Builtin::WorldRayDirection
        | Builtin::RayTMin
        | Builtin::RayTCurrent
        | Builtin::InstanceIndex
        | Builtin::PrimitiveIndex
        | Builtin::TraceRay
        | Builtin::IgnoreHit
        | Builtin::AcceptHitAndEndSearch => None,
        other => Some(intrinsic(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ray_builtins_map_to_dxr_intrinsics() {
        assert_eq!(intrinsic(Builtin::DispatchRaysIndex).name, "DispatchRaysIndex");
        assert_eq!(intrinsic(Builtin::RayTCurrent).name, "RayTCurrent");
        assert_eq!(intrinsic(Builtin::Mix).name, "lerp");
    }

    #[test]
    fn test_helpers_define_their_name() {
        for builtin in Builtin::ALL {
            let translation = intrinsic(*builtin);
            if let Some(helper) = translation.helper {
                assert!(helper.contains(translation.name), "{builtin:?}");
            }
        }
    }

    #[test]
    fn test_compute_translation() {
        assert_eq!(
            compute_intrinsic(Builtin::DispatchRaysIndex),
            Some(Intrinsic {
                name: COMPUTE_THREAD_ID,
                helper: None,
                is_call: false,
            })
        );
        assert_eq!(compute_intrinsic(Builtin::TraceRay), None);
        assert_eq!(compute_intrinsic(Builtin::DispatchRaysDimensions), None);
        assert_eq!(
            compute_intrinsic(Builtin::Normalize),
            Some(intrinsic(Builtin::Normalize))
        );
    }
}
