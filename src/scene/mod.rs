//! Scene data model: camera, primitives, mesh/manifest loading.

pub mod camera;
pub mod manifest;
pub mod mesh;
pub mod types;

pub use camera::Camera;
pub use manifest::load_scene;
pub use types::{BoundingBox, Scene, Sphere, Triangle};
