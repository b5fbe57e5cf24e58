//! Scene manifest (JSON) parsing and model-to-world-space conversion.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::material::Material;
use crate::scene::camera::Camera;
use crate::scene::mesh::{self, FaceWarning};
use crate::scene::types::{Scene, Sphere, Triangle};

fn vec3_deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec3, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let [x, y, z]: [f32; 3] = Deserialize::deserialize(deserializer)?;
    Ok(Vec3::new(x, y, z))
}

#[derive(Debug, Deserialize)]
struct ManifestMaterial {
    #[serde(default, deserialize_with = "vec3_opt")]
    color: Option<Vec3>,
    #[serde(default, deserialize_with = "vec3_opt")]
    emission_color: Option<Vec3>,
    #[serde(default)]
    emission_strength: Option<f32>,
    #[serde(default)]
    smoothness: Option<f32>,
    #[serde(default)]
    specular_probability: Option<f32>,
}

fn vec3_opt<'de, D>(deserializer: D) -> std::result::Result<Option<Vec3>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Option<[f32; 3]> = Deserialize::deserialize(deserializer)?;
    Ok(v.map(|[x, y, z]| Vec3::new(x, y, z)))
}

impl ManifestMaterial {
    fn into_material(self) -> Material {
        let default = Material::default();
        Material {
            color: self.color.unwrap_or(default.color),
            emission_color: self.emission_color.unwrap_or(default.emission_color),
            emission_strength: self.emission_strength.unwrap_or(default.emission_strength),
            smoothness: self.smoothness.unwrap_or(default.smoothness),
            specular_probability: self
                .specular_probability
                .unwrap_or(default.specular_probability),
        }
        .clamped()
    }
}

#[derive(Debug, Deserialize)]
struct ManifestSphere {
    #[serde(deserialize_with = "vec3_deserialize")]
    center: Vec3,
    radius: f32,
    #[serde(flatten)]
    material: ManifestMaterial,
}

#[derive(Debug, Deserialize)]
struct ManifestTriangle {
    #[serde(deserialize_with = "vec3_deserialize")]
    v0: Vec3,
    #[serde(deserialize_with = "vec3_deserialize")]
    v1: Vec3,
    #[serde(deserialize_with = "vec3_deserialize")]
    v2: Vec3,
    #[serde(flatten)]
    material: ManifestMaterial,
}

#[derive(Debug, Deserialize)]
struct ManifestModel {
    path: String,
    #[serde(deserialize_with = "vec3_deserialize")]
    position: Vec3,
    #[serde(deserialize_with = "vec3_deserialize")]
    rotation: Vec3,
    #[serde(deserialize_with = "vec3_deserialize")]
    scale: Vec3,
    #[serde(flatten)]
    material: ManifestMaterial,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    camera: Camera,
    #[serde(default)]
    spheres: Vec<ManifestSphere>,
    #[serde(default)]
    triangles: Vec<ManifestTriangle>,
    #[serde(default)]
    models: Vec<ManifestModel>,
}

/// Model matrix: `translate * rotate_x * rotate_y * rotate_z * scale`,
/// applied to a column vector.
pub fn model_matrix(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_x(rotation_degrees.x.to_radians())
        * Mat4::from_rotation_y(rotation_degrees.y.to_radians())
        * Mat4::from_rotation_z(rotation_degrees.z.to_radians())
        * Mat4::from_scale(scale)
}

/// Load a scene manifest plus every referenced mesh file from disk.
///
/// `mesh_base` resolves `models[].path` relative to the manifest's
/// directory when the path is not absolute — mirroring how the asset
/// layer would resolve a model URL against the manifest's own URL.
#[tracing::instrument(skip_all, fields(manifest = %manifest_path.as_ref().display()))]
pub fn load_scene(manifest_path: impl AsRef<Path>) -> Result<Scene> {
    let manifest_path = manifest_path.as_ref();
    let text = std::fs::read_to_string(manifest_path).map_err(|source| Error::ManifestIo {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    let manifest: Manifest = serde_json::from_str(&text).map_err(|source| Error::ManifestParse {
        path: manifest_path.to_path_buf(),
        source,
    })?;

    let base_dir = manifest_path.parent().map(Path::to_path_buf).unwrap_or_default();
    build_scene(manifest, &base_dir)
}

fn resolve_mesh_path(base_dir: &Path, model_path: &str) -> PathBuf {
    let p = Path::new(model_path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn build_scene(manifest: Manifest, base_dir: &Path) -> Result<Scene> {
    let mut scene = Scene::new(manifest.camera);

    for s in manifest.spheres {
        match Sphere::new(s.center, s.radius, s.material.into_material()) {
            Ok(sphere) => scene.spheres.push(sphere),
            Err(e) => tracing::warn!("skipping sphere: {e}"),
        }
    }

    for t in manifest.triangles {
        match Triangle::new(t.v0, t.v1, t.v2, t.material.into_material()) {
            Ok(tri) => scene.triangles.push(tri),
            Err(e) => tracing::warn!("skipping triangle: {e}"),
        }
    }

    for m in manifest.models {
        let mesh_path = resolve_mesh_path(base_dir, &m.path);
        let text = std::fs::read_to_string(&mesh_path).map_err(|source| Error::MeshIo {
            path: mesh_path.clone(),
            source,
        })?;
        let raw = mesh::parse_obj(&text).map_err(|e| Error::MeshParse {
            path: mesh_path.clone(),
            line: e.line,
            reason: e.reason,
        })?;
        let (mesh_tris, warnings) = raw.triangulate();
        for w in &warnings {
            match w {
                FaceWarning::TooFewVertices { line } => {
                    tracing::warn!("{}: face at index {line} has fewer than 3 vertices, skipped", mesh_path.display());
                }
                FaceWarning::IndexOutOfRange { line, index } => {
                    tracing::warn!(
                        "{}: face at index {line} references out-of-range vertex {index}, skipped",
                        mesh_path.display()
                    );
                }
            }
        }

        let transform = model_matrix(m.position, m.rotation, m.scale);
        let material = m.material.into_material();

        for tri in mesh_tris {
            let v0 = transform.transform_point3(raw.positions[tri.indices[0]]);
            let v1 = transform.transform_point3(raw.positions[tri.indices[1]]);
            let v2 = transform.transform_point3(raw.positions[tri.indices[2]]);
            match Triangle::new(v0, v1, v2, material) {
                Ok(world_tri) => scene.triangles.push(world_tri),
                Err(e) => tracing::warn!("{}: skipping degenerate triangle: {e}", mesh_path.display()),
            }
        }
    }

    Ok(scene)
}
