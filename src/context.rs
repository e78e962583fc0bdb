use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{self, CameraBinding, CameraResources, CameraUniform, Projection},
    config::SceneConfig,
    data_structures::texture,
    pipelines::{
        Layouts,
        basic::ScenePipelines,
        light::{LightResources, Lighting},
    },
    reflection::EnvironmentMap,
    render::Renderer,
};

/// Prefer a surface that stores what the shader writes unchanged.
///
/// Colours in this scene are gamma encoded constants, so an sRGB surface
/// would brighten them. Falls back to the first format on offer.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

/// Everything on the GPU side that lives as long as the window.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub layouts: Layouts,
    pub pipelines: ScenePipelines,
    pub camera: CameraResources,
    pub light: LightResources,
    pub environment: EnvironmentMap,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, scene_config: &SceneConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // Backends::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("could not create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this window")?;
        let info = adapter.get_info();
        log::info!(
            "using {} ({:?}, driver {} {})",
            info.name,
            info.backend,
            info.driver,
            info.driver_info
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("could not open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = pick_surface_format(&surface_caps.formats)
            .context("the surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let layouts = Layouts::new(&device);
        let pipelines = ScenePipelines::new(&device, surface_format, &layouts).await?;

        let camera = camera::Camera::default();
        let projection = Projection::new(
            config.width,
            config.height,
            scene_config.fov,
            scene_config.znear,
            scene_config.zfar,
        );
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);
        let camera = CameraResources {
            camera,
            controller: camera::CameraController::default(),
            projection,
            binding: CameraBinding::new(&device, &layouts.camera, "Camera", camera_uniform),
        };

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let light = LightResources::new(&device, &layouts.light, Lighting::default());

        let environment = EnvironmentMap::new(
            &device,
            &queue,
            &layouts,
            scene_config.cube_size,
            scene_config.reflection_origin.into(),
            scene_config.znear,
            scene_config.zfar,
        );

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            layouts,
            pipelines,
            camera,
            light,
            environment,
            clear_colour: scene_config.clear_colour,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.camera.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer {
            pipelines: &self.pipelines,
            camera: &self.camera.binding.bind_group,
            lights: &self.light,
            environment: &self.environment,
            clear_colour: self.clear_colour,
        }
    }
}
