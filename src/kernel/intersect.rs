//! Ray-primitive intersection routines shared by the CPU reference
//! integrator and mirrored in the WGSL kernel.
//!
//! Epsilons are load-bearing, not arbitrary: `0.001` for ray-plane/t-min,
//! `0.0001` for the triangle determinant, `0.01` for self-intersection
//! offset and the sphere near-root cutoff.

use glam::Vec3;

use crate::scene::types::{BoundingBox, Sphere, Triangle};

pub const T_MIN: f32 = 0.001;
pub const TRIANGLE_DET_EPS: f32 = 0.0001;
pub const SPHERE_T_MIN: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// A surface hit: distance along the ray, world-space position, normal
/// (facing the ray), and the surface's material.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
    pub emission_color: Vec3,
    pub emission_strength: f32,
    pub smoothness: f32,
    pub specular_probability: f32,
    /// `Some(area)` for a triangle hit (needed for the true light pdf of a
    /// BRDF-sampled emissive hit); `None` for a sphere hit.
    pub area: Option<f32>,
}

/// Möller–Trumbore ray-triangle intersection. Back-faces (`dot(normal, dir)
/// > 0`) are culled. Returns the closest hit with `t > T_MIN`.
pub fn intersect_triangle(ray: &Ray, tri: &Triangle) -> Option<Hit> {
    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;
    let normal = edge1.cross(edge2).normalize();

    if normal.dot(ray.dir) > 0.0 {
        return None;
    }

    let pvec = ray.dir.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < TRIANGLE_DET_EPS {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - tri.v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    if t <= T_MIN {
        return None;
    }

    Some(Hit {
        t,
        point: ray.at(t),
        normal,
        color: tri.material.color,
        emission_color: tri.material.emission_color,
        emission_strength: tri.material.emission_strength,
        smoothness: tri.material.smoothness,
        specular_probability: tri.material.specular_probability,
        area: Some(tri.area()),
    })
}

/// Ray-sphere intersection, both roots tested; the smaller root above
/// `SPHERE_T_MIN` wins.
///
/// `preserve_legacy_bug`: the original source's second-root branch stores
/// `t1` in the hit record instead of `t2`. `true` reproduces that behavior
/// byte-for-byte (the hit distance is still `t2`, only the recorded `t`
/// field is wrong); `false` records the correct `t2`.
pub fn intersect_sphere(ray: &Ray, sphere: &Sphere, preserve_legacy_bug: bool) -> Option<Hit> {
    let oc = ray.origin - sphere.center;
    let a = ray.dir.dot(ray.dir);
    let b = 2.0 * oc.dot(ray.dir);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    let recorded_t = if t1 > SPHERE_T_MIN {
        t1
    } else if t2 > SPHERE_T_MIN {
        if preserve_legacy_bug {
            t1
        } else {
            t2
        }
    } else {
        return None;
    };

    let hit_t = if t1 > SPHERE_T_MIN { t1 } else { t2 };
    let point = ray.at(hit_t);
    let normal = (point - sphere.center).normalize();

    Some(Hit {
        t: recorded_t,
        point,
        normal,
        color: sphere.material.color,
        emission_color: sphere.material.emission_color,
        emission_strength: sphere.material.emission_strength,
        smoothness: sphere.material.smoothness,
        specular_probability: sphere.material.specular_probability,
        area: None,
    })
}

/// Slab test against an AABB; returns `(t_enter, t_exit)` clamped to a
/// near plane of `T_MIN`, or `None` on a miss.
pub fn intersect_aabb(ray: &Ray, b: &BoundingBox) -> Option<(f32, f32)> {
    let inv_dir = Vec3::ONE / ray.dir;
    let t0 = (b.min - ray.origin) * inv_dir;
    let t1 = (b.max - ray.origin) * inv_dir;

    let tmin = t0.min(t1);
    let tmax = t0.max(t1);

    let t_enter = tmin.x.max(tmin.y).max(tmin.z).max(T_MIN);
    let t_exit = tmax.x.min(tmax.y).min(tmax.z);

    if t_enter > t_exit {
        None
    } else {
        Some((t_enter, t_exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn moller_trumbore_hits_analytic_point() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Material::default(),
        )
        .unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersect_triangle(&ray, &tri).expect("should hit");
        assert!((hit.t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn moller_trumbore_culls_back_face() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Material::default(),
        )
        .unwrap();
        // Approach from behind: normal faces +z, ray travels -z from behind
        // the plane (origin at z = -5, moving further -z) never reaches the
        // front face, and approaching from -z toward +z hits the back.
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&ray, &tri).is_none());
    }

    #[test]
    fn moller_trumbore_reports_miss_below_t_min() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Material::default(),
        )
        .unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0005), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersect_triangle(&ray, &tri).is_none());
    }

    #[test]
    fn sphere_legacy_bug_records_wrong_t_on_second_root() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, Material::default()).unwrap();
        // Ray origin inside the sphere: only the second root (exiting the
        // sphere) is ahead of the ray, forcing the "second root" branch.
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));

        let buggy = intersect_sphere(&ray, &sphere, true).unwrap();
        let fixed = intersect_sphere(&ray, &sphere, false).unwrap();

        // Both agree on the actual hit point (t2, the exiting root).
        assert!((buggy.point - fixed.point).length() < 1e-5);
        // But the legacy path records the wrong (negative, behind-origin) t.
        assert!(buggy.t < 0.0);
        assert!(fixed.t > 0.0);
    }

    #[test]
    fn aabb_slab_test_hits_unit_box() {
        let b = BoundingBox { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let (t_enter, t_exit) = intersect_aabb(&ray, &b).unwrap();
        assert!((t_enter - 4.0).abs() < 1e-5);
        assert!((t_exit - 6.0).abs() < 1e-5);
    }

    #[test]
    fn aabb_slab_test_misses_box_beside_ray() {
        let b = BoundingBox { min: Vec3::new(10.0, -1.0, -1.0), max: Vec3::new(12.0, 1.0, 1.0) };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersect_aabb(&ray, &b).is_none());
    }
}
