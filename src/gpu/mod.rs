//! GPU-facing byte layouts and (behind the `gpu` feature) device resource
//! creation. The layouts module has no wgpu dependency so the BVH/scene
//! test suite can assert on packed byte sizes without a GPU feature build.

pub mod layout;

#[cfg(feature = "gpu")]
pub mod resources;

pub use layout::{pack_sphere, pack_triangle, pack_spheres, pack_triangles, GpuSphere, GpuTriangle, Uniforms};

#[cfg(feature = "gpu")]
pub use resources::{AccumulationTextures, SceneBuffers};
