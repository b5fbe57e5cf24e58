//! Core scene data model: spheres, triangles, bounding boxes, and the scene
//! as a whole. Order of `spheres`/`triangles` is preserved from loading and
//! is observable through deterministic BVH/light-sampling indices.

use glam::Vec3;

use crate::error::{Error, Result};
use crate::material::Material;
use crate::scene::camera::Camera;

/// Axis-aligned bounding box. `min <= max` componentwise; a box with no
/// contents (e.g. an empty triangle list) is the degenerate point at the
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    #[inline]
    pub fn grow_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn grow(&mut self, other: &BoundingBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[inline]
    pub fn contains_point(&self, p: Vec3, eps: f32) -> bool {
        p.x >= self.min.x - eps
            && p.y >= self.min.y - eps
            && p.z >= self.min.z - eps
            && p.x <= self.max.x + eps
            && p.y <= self.max.y + eps
            && p.z <= self.max.z + eps
    }

    /// `2*(w*h + w*d + h*d)` over the box's extents.
    #[inline]
    pub fn surface_area(&self) -> f32 {
        let e = (self.max - self.min).max(Vec3::ZERO);
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::ZERO
    }
}

/// A sphere primitive. `radius` is strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(Error::InvalidRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            material,
        })
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min: self.center - Vec3::splat(self.radius),
            max: self.center + Vec3::splat(self.radius),
        }
    }
}

/// A world-space triangle. Winding is counter-clockwise for the
/// outward-facing normal `normalize((v1-v0) x (v2-v0))`; back faces are
/// culled by the kernel, not rejected here.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub material: Material,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Result<Self> {
        let normal = (v1 - v0).cross(v2 - v0);
        if normal.length_squared() < 1e-12 {
            return Err(Error::DegenerateTriangle);
        }
        Ok(Self { v0, v1, v2, material })
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalize()
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    #[inline]
    pub fn area(&self) -> f32 {
        (self.v1 - self.v0).cross(self.v2 - self.v0).length() * 0.5
    }

    pub fn bounds(&self) -> BoundingBox {
        let mut b = BoundingBox::EMPTY;
        b.grow_point(self.v0);
        b.grow_point(self.v1);
        b.grow_point(self.v2);
        b
    }
}

/// A fully loaded, world-space scene ready for BVH construction and GPU
/// upload. Sphere/triangle order is preserved from the manifest.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub spheres: Vec<Sphere>,
    pub triangles: Vec<Triangle>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            spheres: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Bounding box of every sphere and triangle in the scene.
    pub fn bounds(&self) -> BoundingBox {
        let mut b = BoundingBox::EMPTY;
        for s in &self.spheres {
            b.grow(&s.bounds());
        }
        for t in &self.triangles {
            b.grow(&t.bounds());
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_rejects_nonpositive_radius() {
        assert!(Sphere::new(Vec3::ZERO, 0.0, Material::default()).is_err());
        assert!(Sphere::new(Vec3::ZERO, -1.0, Material::default()).is_err());
    }

    #[test]
    fn triangle_rejects_colinear_vertices() {
        let v0 = Vec3::ZERO;
        let v1 = Vec3::new(1.0, 0.0, 0.0);
        let v2 = Vec3::new(2.0, 0.0, 0.0);
        assert!(Triangle::new(v0, v1, v2, Material::default()).is_err());
    }

    #[test]
    fn triangle_normal_is_ccw_outward() {
        let t = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Material::default(),
        )
        .unwrap();
        assert!((t.normal() - Vec3::Z).length() < 1e-6);
    }
}
