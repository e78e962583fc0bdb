//! Frame composition.
//!
//! A frame is one command encoder holding seven render passes: the six
//! cubemap captures followed by the main pass. The captures use the capture
//! pipeline, the per-face cameras and the placeholder environment, and skip
//! the reflective objects. The main pass draws the surroundings first and
//! the reflective objects last, sampling the freshly written cubemap.
//!
//! [`Renderer`] only borrows what it needs, so the same code renders into a
//! window surface or into an offscreen texture.

use crate::{
    pipelines::{basic::ScenePipelines, light::LightResources},
    reflection::EnvironmentMap,
    scene::{DrawSet, Scene},
};

/// Where the main pass draws to.
pub struct FrameTarget<'a> {
    pub colour: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

pub struct Renderer<'a> {
    pub pipelines: &'a ScenePipelines,
    pub camera: &'a wgpu::BindGroup,
    pub lights: &'a LightResources,
    pub environment: &'a EnvironmentMap,
    pub clear_colour: wgpu::Color,
}

impl Renderer<'_> {
    pub fn capture_environment(&self, encoder: &mut wgpu::CommandEncoder, scene: &Scene) {
        self.environment
            .capture(encoder, self.clear_colour, |pass, face_camera| {
                pass.set_pipeline(&self.pipelines.capture);
                scene.draw(
                    pass,
                    face_camera,
                    &self.lights.bind_group,
                    &self.environment.placeholder_bind_group,
                    DrawSet::Surroundings,
                );
            });
    }

    pub fn draw_main(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        target: &FrameTarget<'_>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.colour,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipelines.main);
        for set in [DrawSet::Surroundings, DrawSet::Reflective] {
            scene.draw(
                &mut render_pass,
                self.camera,
                &self.lights.bind_group,
                &self.environment.bind_group,
                set,
            );
        }
    }

    /// Encode a whole frame.
    pub fn encode_frame(
        &self,
        device: &wgpu::Device,
        scene: &Scene,
        target: &FrameTarget<'_>,
    ) -> wgpu::CommandBuffer {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        self.capture_environment(&mut encoder, scene);
        self.draw_main(&mut encoder, scene, target);
        encoder.finish()
    }
}
