//! Compute pipeline for the BVH path-tracing kernel.
//!
//! Creates the compute pipeline and bind group over the scene buffers,
//! uniforms, intermediate output texture and performance counters, and
//! dispatches the kernel. Accumulation into the progressive running average
//! is a separate pass (see [`crate::accumulate`]).

use crate::gpu::{AccumulationTextures, SceneBuffers};

const SHADER_WGSL: &str = include_str!("shader.wgsl");

const WG_SIZE: u32 = 8;

/// Path-tracing compute pipeline state: one bind group over the scene's
/// buffers and the frame's uniforms/output/counters.
pub struct PathTraceKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    width: u32,
    height: u32,
}

impl PathTraceKernel {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pathtrace_shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_WGSL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pathtrace_bind_group_layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba16Float,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                storage_entry(6, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pathtrace_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("pathtrace_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            width: 0,
            height: 0,
        }
    }

    /// (Re)build the bind group over a scene's buffers, the uniform buffer,
    /// the intermediate output texture, and the counter buffer. Call this
    /// whenever any of those change (scene reload, resize).
    pub fn bind(
        &mut self,
        device: &wgpu::Device,
        scene: &SceneBuffers,
        uniforms: &wgpu::Buffer,
        textures: &AccumulationTextures,
        counters: &wgpu::Buffer,
    ) {
        self.width = textures.width;
        self.height = textures.height;

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pathtrace_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: scene.nodes.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: scene.triangle_indices.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: scene.triangles.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: scene.spheres.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: uniforms.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&textures.intermediate.1),
                },
                wgpu::BindGroupEntry { binding: 6, resource: counters.as_entire_binding() },
            ],
        }));
    }

    /// Dispatch the kernel. Returns `false` if [`bind`](Self::bind) hasn't
    /// been called yet.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) -> bool {
        let Some(bind_group) = &self.bind_group else {
            return false;
        };

        let wg_x = self.width.div_ceil(WG_SIZE);
        let wg_y = self.height.div_ceil(WG_SIZE);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("pathtrace_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(wg_x, wg_y, 1);

        true
    }

    pub fn is_ready(&self) -> bool {
        self.bind_group.is_some()
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
