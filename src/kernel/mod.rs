//! The path-tracing kernel: RNG, ray-primitive intersection, MIS, and the
//! CPU reference shading integrator, plus (behind the `gpu` feature) the
//! wgpu compute pipeline and its WGSL source.

pub mod counters;
pub mod intersect;
pub mod mis;
pub mod rng;
pub mod shading;

#[cfg(feature = "gpu")]
pub mod compute;

pub use counters::{Counter, Counters};
pub use intersect::{intersect_aabb, intersect_sphere, intersect_triangle, Hit, Ray};
pub use mis::power_heuristic;
pub use rng::Rng;
pub use shading::{trace_path, LightTable, ShadingConfig};

#[cfg(feature = "gpu")]
pub use compute::PathTraceKernel;
