//! Application event loop.
//!
//! Winit drives everything: window and device events are turned into camera,
//! light and window actions, and every redraw advances the simulation by the
//! time since the previous frame, renders and immediately asks for the next
//! redraw.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, the GPU [`Context`] and loads the [`Scene`]
//! 2. input events update the camera controller, lights and window state
//! 3. `RedrawRequested` integrates the camera, spins the animated objects,
//!    uploads the camera and renders the cubemap and the main view
//! 4. the frame is presented and the next redraw requested

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{ModifiersState, PhysicalKey},
    window::{CursorIcon, Fullscreen, Window},
};

use crate::{
    config::SceneConfig,
    context::Context,
    input::{self, Action},
    render::FrameTarget,
    scene::Scene,
};

/// Application state bundle: GPU context, scene and input status.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene,
    is_surface_configured: bool,
    modifiers: ModifiersState,
    dragging: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let scene = Scene::load(
            &ctx.device,
            &ctx.queue,
            &ctx.layouts,
            config,
            &ctx.light.lighting,
        )
        .await?;
        Ok(Self {
            ctx,
            scene,
            is_surface_configured: false,
            modifiers: ModifiersState::empty(),
            dragging: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn update(&mut self, dt: std::time::Duration) {
        let camera = &mut self.ctx.camera;
        camera.controller.update(&mut camera.camera, dt);
        camera.write(&self.ctx.queue);
        self.scene.update(&self.ctx.queue, dt);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let target = FrameTarget {
            colour: &view,
            depth: &self.ctx.depth_texture.view,
        };
        let commands = self
            .ctx
            .renderer()
            .encode_frame(&self.ctx.device, &self.scene, &target);
        self.ctx.queue.submit(iter::once(commands));
        output.present();
        Ok(())
    }

    fn apply(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        let controller = &mut self.ctx.camera.controller;
        match action {
            Action::Move { axis, direction } => controller.press(axis, direction),
            Action::Stop(axis) => controller.release(axis),
            Action::Boost(boost) => controller.set_boost(boost),
            Action::ToggleLight(index) => {
                self.scene
                    .toggle_light(&self.ctx.queue, &mut self.ctx.light, index);
            }
            Action::ToggleFullscreen => {
                let window = &self.ctx.window;
                if window.fullscreen().is_some() {
                    window.set_fullscreen(None);
                } else {
                    window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                }
            }
            Action::Quit => event_loop.exit(),
        }
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: SceneConfig,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(config: SceneConfig) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            config,
            state: None,
            last_time: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Application failed to initialise: {e}");
                event_loop.exit();
                return;
            }
        };

        match self
            .async_runtime
            .block_on(AppState::new(window, &self.config))
        {
            Ok(mut state) => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                print!("{}", input::USAGE);
                self.last_time = Instant::now();
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Application failed to initialise: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.dragging {
                let camera = &mut state.ctx.camera;
                if !camera.controller.look(&mut camera.camera, dx, dy) {
                    log::debug!("ignoring pointer jump ({dx}, {dy})");
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ModifiersChanged(modifiers) => state.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(action) = input::key_action(
                        code,
                        event.state == ElementState::Pressed,
                        event.repeat,
                        state.modifiers,
                    ) {
                        state.apply(action, event_loop);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, pressed) => {
                    state.dragging = pressed;
                    state.ctx.window.set_cursor(if pressed {
                        CursorIcon::Crosshair
                    } else {
                        CursorIcon::Default
                    });
                }
                (MouseButton::Middle, true) => state.ctx.camera.projection.reset_fov(),
                _ => (),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                state.ctx.camera.projection.zoom(input::wheel_steps(delta));
            }
            WindowEvent::Focused(false) => state.dragging = false,
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.update(dt);

                match state.render() {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
