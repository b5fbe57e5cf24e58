//! Per-frame orchestration: builds the GPU scene once, then each frame
//! advances `frameIndex`, writes uniforms, dispatches the kernel, blends
//! into the accumulator, and optionally draws the debug overlay.

#![cfg(feature = "gpu")]

use std::sync::Arc;

use crate::bvh::{build_tree, flatten, wireframe};
use crate::gpu::layout::{pack_spheres, pack_triangles, Uniforms};
use crate::gpu::resources::{
    create_accumulation_textures, create_counter_buffer, create_scene_buffers, create_uniform_buffer,
    reset_counter_buffer, write_uniforms, AccumulationTextures, SceneBuffers,
};
use crate::accumulate::Accumulator;
use crate::kernel::PathTraceKernel;
use crate::overlay::{OverlayUniforms, WireframeOverlay};
use crate::scene::types::Scene;
use crate::ui::Controls;

/// Everything needed to render one scene, progressively, frame after frame.
pub struct Controller {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    kernel: PathTraceKernel,
    accumulator: Accumulator,
    overlay: WireframeOverlay,

    scene_buffers: SceneBuffers,
    uniform_buffer: wgpu::Buffer,
    counter_buffer: wgpu::Buffer,
    textures: AccumulationTextures,

    scene: Scene,
    frame_index: u32,
}

impl Controller {
    /// Build the BVH, pack GPU buffers, and create every pipeline for
    /// `scene` at `width`x`height`. Call [`Self::render_frame`] in a loop.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        scene: Scene,
        width: u32,
        height: u32,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let tree = build_tree(&scene.triangles);
        let flat = flatten(&tree);
        let gpu_triangles = pack_triangles(&scene.triangles);
        let gpu_spheres = pack_spheres(&scene.spheres);

        let scene_buffers = create_scene_buffers(&device, &flat, &gpu_triangles, &gpu_spheres);
        let uniform_buffer = create_uniform_buffer(&device);
        let counter_buffer = create_counter_buffer(&device);
        let textures = create_accumulation_textures(&device, width, height);

        let mut kernel = PathTraceKernel::new(&device);
        kernel.bind(&device, &scene_buffers, &uniform_buffer, &textures, &counter_buffer);

        let mut accumulator = Accumulator::new(&device);
        accumulator.bind(&device, &uniform_buffer, &textures);

        let overlay = WireframeOverlay::new(&device, target_format);

        Self {
            device,
            queue,
            kernel,
            accumulator,
            overlay,
            scene_buffers,
            uniform_buffer,
            counter_buffer,
            textures,
            scene,
            frame_index: 0,
        }
    }

    /// Render one progressive frame and return the display texture view to
    /// present (or blit into a surface). Advances `frameIndex` unless
    /// `controls.reset_accumulation` is set, in which case this frame
    /// restarts at 0 and the flag is cleared.
    pub fn render_frame(&mut self, controls: &mut Controls) -> &wgpu::TextureView {
        if controls.reset_accumulation {
            self.frame_index = 0;
            reset_counter_buffer(&self.queue, &self.counter_buffer);
            controls.reset_accumulation = false;
        }

        let uniforms = Uniforms::new(
            &self.scene.camera,
            self.frame_index,
            self.textures.width,
            self.textures.height,
            controls.samples_per_pixel(),
            controls.enable_debug,
        );
        write_uniforms(&self.queue, &self.uniform_buffer, &uniforms);

        if controls.enable_debug {
            let tree = build_tree(&self.scene.triangles);
            let verts = wireframe(&tree, controls.bvh_depth());
            self.overlay.upload_wireframe(&self.device, &verts);
            let aspect = self.textures.width as f32 / self.textures.height.max(1) as f32;
            let view_proj = self.scene.camera.view_proj_matrix(aspect);
            self.overlay.update_uniforms(&self.queue, &OverlayUniforms::new(view_proj));
        } else {
            self.overlay.upload_wireframe(&self.device, &[]);
        }

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pathtrace_frame"),
        });
        self.kernel.dispatch(&mut encoder);
        self.accumulator.dispatch(&mut encoder);

        let display_view = self
            .accumulator
            .display_view()
            .expect("accumulator bound in Controller::new");

        if controls.enable_debug {
            self.overlay.draw(&mut encoder, display_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.frame_index += 1;

        self.accumulator.display_view().expect("accumulator bound in Controller::new")
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn scene_buffers(&self) -> &SceneBuffers {
        &self.scene_buffers
    }
}
