//! Progressive accumulation: blends the kernel's per-frame estimate into a
//! running per-channel average, and exposes a display texture for the
//! overlay/present step. See [`blend`] for the CPU reference used by tests
//! and the `pathtracer-debug` binary.

#[cfg(feature = "gpu")]
use crate::gpu::AccumulationTextures;

#[cfg(feature = "gpu")]
const SHADER_WGSL: &str = include_str!("shader.wgsl");
#[cfg(feature = "gpu")]
const WG_SIZE: u32 = 8;

/// `S*(1-w) + E*w`, `w = 1/(frame_index+1)`, clamped to `[0, 1]`. Matches
/// the accumulator shader's blend exactly; frame 0 writes the estimate
/// unweighted since there is no prior running average.
#[inline]
pub fn blend(running_average: f32, estimate: f32, frame_index: u32) -> f32 {
    let w = 1.0 / (frame_index as f32 + 1.0);
    let s = if frame_index == 0 { 0.0 } else { running_average };
    (s * (1.0 - w) + estimate * w).clamp(0.0, 1.0)
}

/// GPU accumulation pass: reads the kernel's intermediate estimate and the
/// three running-average channels, writes the updated averages back and a
/// combined display texture.
#[cfg(feature = "gpu")]
pub struct Accumulator {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    display: Option<(wgpu::Texture, wgpu::TextureView)>,
    width: u32,
    height: u32,
}

#[cfg(feature = "gpu")]
impl Accumulator {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("accumulate_shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_WGSL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("accumulate_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_tex_entry(1, wgpu::TextureFormat::Rgba16Float, wgpu::StorageTextureAccess::ReadOnly),
                storage_tex_entry(2, wgpu::TextureFormat::R32Float, wgpu::StorageTextureAccess::ReadWrite),
                storage_tex_entry(3, wgpu::TextureFormat::R32Float, wgpu::StorageTextureAccess::ReadWrite),
                storage_tex_entry(4, wgpu::TextureFormat::R32Float, wgpu::StorageTextureAccess::ReadWrite),
                storage_tex_entry(5, wgpu::TextureFormat::Rgba16Float, wgpu::StorageTextureAccess::WriteOnly),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("accumulate_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("accumulate_pipeline"),
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
            display: None,
            width: 0,
            height: 0,
        }
    }

    pub fn bind(&mut self, device: &wgpu::Device, uniforms: &wgpu::Buffer, textures: &AccumulationTextures) {
        self.width = textures.width;
        self.height = textures.height;

        let display = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pt_display"),
            size: wgpu::Extent3d { width: textures.width, height: textures.height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let display_view = display.create_view(&wgpu::TextureViewDescriptor::default());

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("accumulate_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: uniforms.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&textures.intermediate.1) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(&textures.accum_r.1) },
                wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::TextureView(&textures.accum_g.1) },
                wgpu::BindGroupEntry { binding: 4, resource: wgpu::BindingResource::TextureView(&textures.accum_b.1) },
                wgpu::BindGroupEntry { binding: 5, resource: wgpu::BindingResource::TextureView(&display_view) },
            ],
        }));
        self.display = Some((display, display_view));
    }

    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) -> bool {
        let Some(bind_group) = &self.bind_group else {
            return false;
        };

        let wg_x = self.width.div_ceil(WG_SIZE);
        let wg_y = self.height.div_ceil(WG_SIZE);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("accumulate_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(wg_x, wg_y, 1);

        true
    }

    pub fn display_view(&self) -> Option<&wgpu::TextureView> {
        self.display.as_ref().map(|(_, v)| v)
    }
}

#[cfg(feature = "gpu")]
fn storage_tex_entry(binding: u32, format: wgpu::TextureFormat, access: wgpu::StorageTextureAccess) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::StorageTexture {
            access,
            format,
            view_dimension: wgpu::TextureViewDimension::D2,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_zero_writes_estimate_unweighted() {
        assert!((blend(0.0, 0.73, 0) - 0.73).abs() < 1e-6);
        // Prior running average is ignored on frame 0.
        assert!((blend(0.9, 0.73, 0) - 0.73).abs() < 1e-6);
    }

    #[test]
    fn repeated_identical_estimates_are_idempotent() {
        let mut running = 0.0;
        for frame in 0..10u32 {
            running = blend(running, 0.5, frame);
        }
        assert!((running - 0.5).abs() < 1e-4);
    }

    #[test]
    fn converges_toward_varying_estimates_average() {
        // Alternating 0/1 estimates should converge to ~0.5.
        let mut running = 0.0;
        for frame in 0..200u32 {
            let estimate = if frame % 2 == 0 { 0.0 } else { 1.0 };
            running = blend(running, estimate, frame);
        }
        assert!((running - 0.5).abs() < 0.05, "running={running}");
    }

    #[test]
    fn output_is_saturated_to_unit_range() {
        assert_eq!(blend(0.5, 10.0, 5), 1.0);
        assert_eq!(blend(0.5, -10.0, 5), 0.0);
    }
}
