//! GPU-facing byte layouts. Contractual: the kernel reads these unchanged,
//! so field order and padding must match exactly, not just `size_of`.

use bytemuck::{Pod, Zeroable};

use crate::scene::camera::Camera;
use crate::scene::types::{Sphere, Triangle};

/// Sphere slot, 64 bytes:
/// `center(12) radius(4) color(12) smoothness(4) emissionColor(12)
///  emissionStrength(4) specularProbability(4) padding(12)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuSphere {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub smoothness: f32,
    pub emission_color: [f32; 3],
    pub emission_strength: f32,
    pub specular_probability: f32,
    pub _pad: [f32; 3],
}

const _: () = assert!(std::mem::size_of::<GpuSphere>() == 64);

impl From<Sphere> for GpuSphere {
    fn from(s: Sphere) -> Self {
        pack_sphere(&s)
    }
}

pub fn pack_sphere(s: &Sphere) -> GpuSphere {
    GpuSphere {
        center: s.center.to_array(),
        radius: s.radius,
        color: s.material.color.to_array(),
        smoothness: s.material.smoothness,
        emission_color: s.material.emission_color.to_array(),
        emission_strength: s.material.emission_strength,
        specular_probability: s.material.specular_probability,
        _pad: [0.0; 3],
    }
}

/// Triangle slot, 96 bytes:
/// `v0(12) pad(4) v1(12) pad(4) v2(12) pad(4) color(12) pad(4)
///  emissionColor(12) emissionStrength(4) smoothness(4)
///  specularProbability(4) pad(8)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuTriangle {
    pub v0: [f32; 3],
    pub _pad0: f32,
    pub v1: [f32; 3],
    pub _pad1: f32,
    pub v2: [f32; 3],
    pub _pad2: f32,
    pub color: [f32; 3],
    pub _pad3: f32,
    pub emission_color: [f32; 3],
    pub emission_strength: f32,
    pub smoothness: f32,
    pub specular_probability: f32,
    pub _pad4: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<GpuTriangle>() == 96);

pub fn pack_triangle(t: &Triangle) -> GpuTriangle {
    GpuTriangle {
        v0: t.v0.to_array(),
        _pad0: 0.0,
        v1: t.v1.to_array(),
        _pad1: 0.0,
        v2: t.v2.to_array(),
        _pad2: 0.0,
        color: t.material.color.to_array(),
        _pad3: 0.0,
        emission_color: t.material.emission_color.to_array(),
        emission_strength: t.material.emission_strength,
        smoothness: t.material.smoothness,
        specular_probability: t.material.specular_probability,
        _pad4: [0.0; 2],
    }
}

/// Per-frame uniforms, 80 bytes:
/// `camPos(12) pad(4) camRot(12) pad(4) fov(4) near(4) far(4) pad(8)
///  frameIndex(4) pad(4) resW(4) resH(4) samples(4) debug(4)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Uniforms {
    pub cam_pos: [f32; 3],
    pub _pad0: f32,
    pub cam_rot: [f32; 3],
    pub _pad1: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub _pad2: f32,
    pub frame_index: u32,
    pub _pad3: u32,
    pub res_w: u32,
    pub res_h: u32,
    pub samples: u32,
    pub debug: u32,
}

const _: () = assert!(std::mem::size_of::<Uniforms>() == 80);

impl Uniforms {
    pub fn new(camera: &Camera, frame_index: u32, res_w: u32, res_h: u32, samples: u32, debug: bool) -> Self {
        Self {
            cam_pos: camera.position.to_array(),
            _pad0: 0.0,
            cam_rot: camera.rotation.to_array(),
            _pad1: 0.0,
            fov: camera.fov,
            near: camera.near_plane,
            far: camera.far_plane,
            _pad2: 0.0,
            frame_index,
            _pad3: 0,
            res_w,
            res_h,
            samples,
            debug: debug as u32,
        }
    }
}

/// Pack a whole material-carrying triangle/sphere list into byte slices
/// ready for storage-buffer upload, in the order given.
pub fn pack_spheres(spheres: &[Sphere]) -> Vec<GpuSphere> {
    spheres.iter().map(pack_sphere).collect()
}

pub fn pack_triangles(triangles: &[Triangle]) -> Vec<GpuTriangle> {
    triangles.iter().map(pack_triangle).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use glam::Vec3;

    #[test]
    fn sizes_match_contract() {
        assert_eq!(std::mem::size_of::<GpuSphere>(), 64);
        assert_eq!(std::mem::size_of::<GpuTriangle>(), 96);
        assert_eq!(std::mem::size_of::<Uniforms>(), 80);
    }

    #[test]
    fn pack_sphere_round_trips_fields() {
        let s = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5, Material::diffuse(Vec3::new(0.1, 0.2, 0.3))).unwrap();
        let gpu = pack_sphere(&s);
        assert_eq!(gpu.center, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.radius, 0.5);
        assert_eq!(gpu.color, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn uniforms_carry_camera_and_frame_state() {
        let cam = Camera::default();
        let u = Uniforms::new(&cam, 7, 1920, 1080, 4, true);
        assert_eq!(u.frame_index, 7);
        assert_eq!(u.res_w, 1920);
        assert_eq!(u.res_h, 1080);
        assert_eq!(u.samples, 4);
        assert_eq!(u.debug, 1);
    }
}
