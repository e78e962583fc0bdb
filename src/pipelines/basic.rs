use anyhow::Context as _;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{self, Vertex},
        texture::Texture,
    },
    pipelines::Layouts,
};

/// The scene shader compiled twice: once for the window surface and once
/// for the cubemap faces.
#[derive(Debug)]
pub struct ScenePipelines {
    pub main: wgpu::RenderPipeline,
    pub capture: wgpu::RenderPipeline,
}

impl ScenePipelines {
    /// Build both pipelines inside a validation error scope so a broken
    /// shader surfaces as an error instead of a panic in the device callback.
    pub async fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        layouts: &Layouts,
    ) -> anyhow::Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[
                &layouts.material,
                &layouts.camera,
                &layouts.light,
                &layouts.environment,
            ],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let vertex_layouts = [model::ModelVertex::desc(), InstanceRaw::desc()];
        let main = mk_render_pipeline(
            device,
            &render_pipeline_layout,
            surface_format,
            Some(wgpu::BlendState::REPLACE),
            Some(Texture::DEPTH_FORMAT),
            &vertex_layouts,
            &shader,
            wgpu::FrontFace::Ccw,
            "Scene Pipeline",
        );
        let capture = mk_render_pipeline(
            device,
            &render_pipeline_layout,
            Texture::CUBE_FORMAT,
            Some(wgpu::BlendState::REPLACE),
            Some(Texture::DEPTH_FORMAT),
            &vertex_layouts,
            &shader,
            // The capture projection flips Y, which mirrors the winding.
            wgpu::FrontFace::Cw,
            "Cubemap Capture Pipeline",
        );

        if let Some(error) = device.pop_error_scope().await {
            return Err(anyhow::anyhow!("{error}")).context("could not build the scene pipelines");
        }
        log::debug!("scene pipelines ready ({surface_format:?} surface)");
        Ok(Self { main, capture })
    }
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
    front_face: wgpu::FrontFace,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
