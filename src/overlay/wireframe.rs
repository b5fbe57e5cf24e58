//! Debug wireframe overlay: renders [`crate::bvh::debug::wireframe`]'s
//! depth-colored box edges as a line-list over the accumulated image.

#[cfg(feature = "gpu")]
use bytemuck::{Pod, Zeroable};
#[cfg(feature = "gpu")]
use glam::Mat4;
#[cfg(feature = "gpu")]
use wgpu::util::DeviceExt;

#[cfg(feature = "gpu")]
use crate::bvh::WireVertex;

#[cfg(feature = "gpu")]
const SHADER_WGSL: &str = include_str!("shader.wgsl");

/// Matches the WGSL `Uniforms` struct: a single view-projection matrix.
#[cfg(feature = "gpu")]
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct OverlayUniforms {
    pub view_proj: [[f32; 4]; 4],
}

#[cfg(feature = "gpu")]
impl OverlayUniforms {
    pub fn new(view_proj: Mat4) -> Self {
        Self { view_proj: view_proj.to_cols_array_2d() }
    }
}

#[cfg(feature = "gpu")]
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GpuWireVertex {
    position: [f32; 3],
    color: [f32; 3],
}

#[cfg(feature = "gpu")]
impl From<WireVertex> for GpuWireVertex {
    fn from(v: WireVertex) -> Self {
        Self { position: v.position.into(), color: v.color.into() }
    }
}

/// Line-list render pass drawn on top of the accumulator's display texture.
#[cfg(feature = "gpu")]
pub struct WireframeOverlay {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
}

#[cfg(feature = "gpu")]
impl WireframeOverlay {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("overlay_shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_WGSL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("overlay_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuWireVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x3, offset: 0, shader_location: 0 },
                wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x3, offset: 12, shader_location: 1 },
            ],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("overlay_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay_uniforms"),
            size: std::mem::size_of::<OverlayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() }],
        }));

        Self {
            pipeline,
            bind_group_layout,
            bind_group,
            uniform_buffer,
            vertex_buffer: None,
            vertex_count: 0,
        }
    }

    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &OverlayUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Upload the wireframe's vertex data. Called whenever the BVH or the
    /// debug depth cutoff changes; an empty slice disables the pass.
    pub fn upload_wireframe(&mut self, device: &wgpu::Device, vertices: &[WireVertex]) {
        self.vertex_count = vertices.len() as u32;
        if vertices.is_empty() {
            self.vertex_buffer = None;
            return;
        }
        let gpu_vertices: Vec<GpuWireVertex> = vertices.iter().copied().map(GpuWireVertex::from).collect();
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("overlay_vertices"),
            contents: bytemuck::cast_slice(&gpu_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
    }

    /// Draw the wireframe over `target` with `loadOp = load`, preserving the
    /// path-traced image underneath. No-op if there is nothing uploaded.
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let (Some(bind_group), Some(vertex_buffer)) = (&self.bind_group, &self.vertex_buffer) else {
            return;
        };
        if self.vertex_count == 0 {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("overlay_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(all(test, feature = "gpu"))]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn gpu_wire_vertex_round_trips_fields() {
        let v = WireVertex { position: Vec3::new(1.0, 2.0, 3.0), color: Vec3::new(0.5, 0.0, 0.0) };
        let gpu: GpuWireVertex = v.into();
        assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
        assert_eq!(gpu.color, [0.5, 0.0, 0.0]);
    }
}
