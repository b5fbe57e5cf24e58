//! Device-side GPU resource creation: scene storage buffers, the uniform
//! buffer, accumulation/intermediate textures, and the performance counter
//! buffer. Pure resource plumbing — the pipelines and bind groups that
//! consume these live in [`crate::kernel`], [`crate::accumulate`] and
//! [`crate::overlay`].

use wgpu::util::DeviceExt;

use crate::bvh::FlatBvh;
use crate::gpu::layout::{GpuSphere, GpuTriangle, Uniforms};

/// Number of performance counters the kernel atomically increments
/// (currently just a triangle-intersection-test tally).
pub const NUM_COUNTERS: usize = 4;

/// Scene geometry uploaded once per scene load; read-only for the device.
pub struct SceneBuffers {
    pub nodes: wgpu::Buffer,
    pub triangle_indices: wgpu::Buffer,
    pub triangles: wgpu::Buffer,
    pub spheres: wgpu::Buffer,
    pub node_count: u32,
    pub triangle_index_count: u32,
    pub triangle_count: u32,
    pub sphere_count: u32,
}

/// wgpu storage buffers must be non-empty; an empty scene still needs a
/// valid (1-element) buffer to bind.
fn non_empty_bytes(bytes: &[u8], min_len: usize) -> Vec<u8> {
    if bytes.is_empty() {
        vec![0u8; min_len]
    } else {
        bytes.to_vec()
    }
}

pub fn create_scene_buffers(
    device: &wgpu::Device,
    flat: &FlatBvh,
    triangles: &[GpuTriangle],
    spheres: &[GpuSphere],
) -> SceneBuffers {
    let nodes_bytes = bytemuck::cast_slice(&flat.nodes);
    let indices_bytes = bytemuck::cast_slice(&flat.triangle_indices);
    let tris_bytes = bytemuck::cast_slice(triangles);
    let spheres_bytes = bytemuck::cast_slice(spheres);

    let nodes = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("pt_bvh_nodes"),
        contents: &non_empty_bytes(nodes_bytes, 48),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let triangle_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("pt_bvh_triangle_indices"),
        contents: &non_empty_bytes(indices_bytes, 4),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let triangles_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("pt_triangles"),
        contents: &non_empty_bytes(tris_bytes, 96),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let spheres_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("pt_spheres"),
        contents: &non_empty_bytes(spheres_bytes, 64),
        usage: wgpu::BufferUsages::STORAGE,
    });

    SceneBuffers {
        nodes,
        triangle_indices,
        triangles: triangles_buf,
        spheres: spheres_buf,
        node_count: flat.nodes.len() as u32,
        triangle_index_count: flat.triangle_indices.len() as u32,
        triangle_count: triangles.len() as u32,
        sphere_count: spheres.len() as u32,
    }
}

/// Re-written wholesale every frame; the only buffer the host rewrites
/// per-frame.
pub fn create_uniform_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pt_uniforms"),
        size: std::mem::size_of::<Uniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub fn write_uniforms(queue: &wgpu::Queue, buffer: &wgpu::Buffer, uniforms: &Uniforms) {
    queue.write_buffer(buffer, 0, bytemuck::bytes_of(uniforms));
}

/// Atomically-incremented performance counters, reset by the host once per
/// second.
pub fn create_counter_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("pt_counters"),
        contents: bytemuck::cast_slice(&[0u32; NUM_COUNTERS]),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn reset_counter_buffer(queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[0u32; NUM_COUNTERS]));
}

/// One accumulation channel (R32F) plus the RGBA16F intermediate texture
/// the kernel writes its per-frame estimate into.
pub struct AccumulationTextures {
    pub accum_r: (wgpu::Texture, wgpu::TextureView),
    pub accum_g: (wgpu::Texture, wgpu::TextureView),
    pub accum_b: (wgpu::Texture, wgpu::TextureView),
    pub intermediate: (wgpu::Texture, wgpu::TextureView),
    pub width: u32,
    pub height: u32,
}

fn create_storage_texture(device: &wgpu::Device, label: &str, width: u32, height: u32, format: wgpu::TextureFormat) -> (wgpu::Texture, wgpu::TextureView) {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
    (tex, view)
}

/// Accumulation textures are logically zero-initialized by the first-frame
/// branch in the accumulator shader (`frameIndex == 0`), not by a physical
/// clear — so creation does not need to write any initial data.
pub fn create_accumulation_textures(device: &wgpu::Device, width: u32, height: u32) -> AccumulationTextures {
    AccumulationTextures {
        accum_r: create_storage_texture(device, "pt_accum_r", width, height, wgpu::TextureFormat::R32Float),
        accum_g: create_storage_texture(device, "pt_accum_g", width, height, wgpu::TextureFormat::R32Float),
        accum_b: create_storage_texture(device, "pt_accum_b", width, height, wgpu::TextureFormat::R32Float),
        intermediate: create_storage_texture(device, "pt_intermediate", width, height, wgpu::TextureFormat::Rgba16Float),
        width,
        height,
    }
}
