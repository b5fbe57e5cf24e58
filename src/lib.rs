//! # pathtracer
//!
//! A progressive, unbiased Monte-Carlo path tracer for scenes made of
//! spheres and triangle meshes, built around an SAH-partitioned BVH and a
//! wgpu compute kernel.
//!
//! ## Modules
//!
//! - [`error`] — error types shared across scene loading and GPU setup
//! - [`material`] — the diffuse/specular/emissive surface material
//! - [`scene`] — camera, primitives, OBJ mesh and JSON manifest loading
//! - [`bvh`] — SAH BVH build, GPU-facing flattening, stats, debug wireframe
//! - [`gpu`] — packed GPU byte layouts and (behind `gpu`) device resources
//! - [`kernel`] — RNG, intersection, MIS, the CPU reference integrator, and
//!   (behind `gpu`) the compute pipeline and WGSL kernel
//! - [`accumulate`] — progressive accumulation of the kernel's estimate
//! - [`overlay`] — the BVH debug wireframe pass
//! - [`controller`] — per-frame orchestration (behind `gpu`)
//! - [`ui`] — the render controls a host application exposes
//!
//! The BVH builder, scene loader, and CPU reference kernel build and test
//! without the `gpu` feature; everything that touches a wgpu device is
//! gated behind it.

pub mod accumulate;
pub mod bvh;
pub mod error;
pub mod gpu;
pub mod kernel;
pub mod material;
pub mod overlay;
pub mod scene;
pub mod ui;

#[cfg(feature = "gpu")]
pub mod controller;

pub use error::{Error, Result};

/// Common imports for building and rendering a scene.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::material::Material;
    pub use crate::scene::{load_scene, Camera, Scene, Sphere, Triangle};
    pub use crate::ui::Controls;

    #[cfg(feature = "gpu")]
    pub use crate::controller::Controller;
}
