//! CPU-only debug tool: loads a scene manifest, builds and reports on its
//! BVH, and renders a small preview with the CPU reference integrator to a
//! PPM file. No GPU required — useful in headless CI and for sanity-checking
//! a scene before opening it in the GPU viewer.

use std::env;
use std::path::PathBuf;

use glam::Vec3;

use pathtracer::bvh::{build_tree, tree_stats};
use pathtracer::kernel::{Rng, ShadingConfig};
use pathtracer::kernel::intersect::Ray;
use pathtracer::kernel::shading::{trace_path, LightTable};
use pathtracer::scene::load_scene;

const PREVIEW_WIDTH: u32 = 128;
const PREVIEW_HEIGHT: u32 = 72;
const SAMPLES_PER_PIXEL: u32 = 8;

fn main() {
    tracing_subscriber::fmt::init();

    let manifest_path: PathBuf = match env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("usage: pathtracer-debug <scene.json> [out.ppm]");
            std::process::exit(2);
        }
    };
    let out_path = env::args().nth(2).unwrap_or_else(|| "preview.ppm".to_string());

    let scene = match load_scene(&manifest_path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("failed to load {}: {e}", manifest_path.display());
            std::process::exit(1);
        }
    };
    tracing::info!(
        spheres = scene.spheres.len(),
        triangles = scene.triangles.len(),
        "scene loaded"
    );

    let tree = build_tree(&scene.triangles);
    let stats = tree_stats(&tree);
    println!(
        "bvh: {} nodes ({} leaves), {} triangles, max depth {}",
        stats.total_nodes, stats.leaf_nodes, stats.total_triangles, stats.max_depth
    );

    render_preview(&scene, &out_path);
    println!("wrote preview to {out_path}");
}

fn render_preview(scene: &pathtracer::scene::Scene, out_path: &str) {
    let lights = LightTable::build(scene);
    let config = ShadingConfig::default();
    let camera = &scene.camera;
    let aspect = PREVIEW_WIDTH as f32 / PREVIEW_HEIGHT as f32;
    let focal_length = camera.focal_length();
    let (forward, right, up) = (camera.forward(), camera.right(), camera.up());

    let mut pixels = vec![Vec3::ZERO; (PREVIEW_WIDTH * PREVIEW_HEIGHT) as usize];
    for py in 0..PREVIEW_HEIGHT {
        for px in 0..PREVIEW_WIDTH {
            let mut color = Vec3::ZERO;
            for s in 0..SAMPLES_PER_PIXEL {
                let mut rng = Rng::for_pixel(px, py, PREVIEW_WIDTH, s);
                let (jx, jy) = rng.next_f32_pair();
                let u = (px as f32 + jx) / PREVIEW_WIDTH as f32;
                let v = (py as f32 + jy) / PREVIEW_HEIGHT as f32;
                let nx = (2.0 * u - 1.0) * aspect;
                let ny = 1.0 - 2.0 * v;
                let dir = (right * nx + up * ny + forward * focal_length).normalize();
                let ray = Ray::new(camera.position, dir);
                color += trace_path(scene, &lights, ray, &mut rng, &config);
            }
            pixels[(py * PREVIEW_WIDTH + px) as usize] = color / SAMPLES_PER_PIXEL as f32;
        }
    }

    write_ppm(out_path, PREVIEW_WIDTH, PREVIEW_HEIGHT, &pixels);
}

fn write_ppm(path: &str, width: u32, height: u32, pixels: &[Vec3]) {
    use std::io::Write;
    let mut out = String::new();
    out.push_str(&format!("P3\n{width} {height}\n255\n"));
    for p in pixels {
        let c = p.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
        out.push_str(&format!("{} {} {}\n", c.x as u8, c.y as u8, c.z as u8));
    }
    if let Err(e) = std::fs::File::create(path).and_then(|mut f| f.write_all(out.as_bytes())) {
        eprintln!("failed to write {path}: {e}");
        std::process::exit(1);
    }
}
