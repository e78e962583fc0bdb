//! First-person camera: view matrix, input driven kinematics and projection.
//!
//! The camera is kept as a raw view matrix that is pre-multiplied with small
//! transforms every frame. Motion and yaw are applied with the pitch switched
//! off, so moving forward never sinks the camera into the floor and the
//! horizon stays level.

use std::time::Duration;

use cgmath::{Deg, Matrix4, Point3, Rad, SquareMatrix, Transform, Vector3};
use wgpu::util::DeviceExt;

/// cgmath builds OpenGL clip space (z in [-1, 1]); wgpu expects z in [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Largest pitch the mouse look allows, either way.
pub const MAX_PITCH: Deg<f32> = Deg(80.0);
pub const DEFAULT_FOV: Deg<f32> = Deg(60.0);
pub const MIN_FOV: Deg<f32> = Deg(5.0);
pub const MAX_FOV: Deg<f32> = Deg(175.0);
/// Field of view change per mouse wheel notch.
pub const FOV_STEP: Deg<f32> = Deg(5.0);

/// Camera-space axis a movement key acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub view: Matrix4<f32>,
}

impl Camera {
    /// Looks from `eye` at `target`, then tilts the view down by `tilt`.
    pub fn new<E: Into<Point3<f32>>, T: Into<Point3<f32>>, A: Into<Rad<f32>>>(
        eye: E,
        target: T,
        tilt: A,
    ) -> Self {
        let view = Matrix4::from_angle_x(tilt)
            * Matrix4::look_at_rh(eye.into(), target.into(), Vector3::unit_y());
        Self { view }
    }

    /// Current pitch, read back from the view matrix.
    pub fn pitch(&self) -> Rad<f32> {
        Rad(self.view.y.z.clamp(-1.0, 1.0).asin())
    }

    /// World space position of the eye.
    pub fn eye(&self) -> Point3<f32> {
        let inverse = self.view.invert().unwrap_or_else(Matrix4::identity);
        inverse.transform_point(Point3::new(0.0, 0.0, 0.0))
    }

    /// Move by `offset` in camera space with the pitch switched off.
    pub fn translate(&mut self, offset: Vector3<f32>) {
        let pitch = self.pitch();
        self.view = Matrix4::from_angle_x(pitch)
            * Matrix4::from_translation(offset)
            * Matrix4::from_angle_x(-pitch)
            * self.view;
    }

    /// Yaw about the world up axis and pitch about the camera's x axis.
    /// The resulting pitch is clamped to [`MAX_PITCH`].
    pub fn rotate(&mut self, delta_yaw: Rad<f32>, delta_pitch: Rad<f32>) {
        let pitch = self.pitch();
        let max = Rad::from(MAX_PITCH);
        let new_pitch = Rad((pitch + delta_pitch).0.clamp(-max.0, max.0));
        self.view = Matrix4::from_angle_x(new_pitch)
            * Matrix4::from_angle_y(delta_yaw)
            * Matrix4::from_angle_x(-pitch)
            * self.view;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 5.0, 10.0), (0.0, 5.0, 0.0), Deg(12.0))
    }
}

/// Turns key and mouse input into camera motion.
///
/// Movement keys set an acceleration along one camera axis; the velocity
/// integrates it every frame and is clamped to the current maximum speed.
/// Releasing a key stops that axis immediately.
#[derive(Clone, Debug)]
pub struct CameraController {
    acceleration: Vector3<f32>,
    velocity: Vector3<f32>,
    accel: f32,
    base_speed: f32,
    boost_speed: f32,
    boosted: bool,
    look_sensitivity: f32,
    max_look_step: f32,
}

impl CameraController {
    pub fn new(accel: f32, base_speed: f32, boost_speed: f32) -> Self {
        Self {
            acceleration: Vector3::new(0.0, 0.0, 0.0),
            velocity: Vector3::new(0.0, 0.0, 0.0),
            accel,
            base_speed,
            boost_speed,
            boosted: false,
            look_sensitivity: 0.005,
            max_look_step: 0.3,
        }
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    pub fn max_speed(&self) -> f32 {
        if self.boosted {
            self.boost_speed
        } else {
            self.base_speed
        }
    }

    pub fn set_boost(&mut self, boosted: bool) {
        self.boosted = boosted;
    }

    /// Start accelerating along `axis`; `direction` is +1 or -1.
    pub fn press(&mut self, axis: Axis, direction: f32) {
        let accel = direction.signum() * self.accel;
        match axis {
            Axis::X => self.acceleration.x = accel,
            Axis::Y => self.acceleration.y = accel,
            Axis::Z => self.acceleration.z = accel,
        }
    }

    /// Stop all motion along `axis`.
    pub fn release(&mut self, axis: Axis) {
        match axis {
            Axis::X => (self.acceleration.x, self.velocity.x) = (0.0, 0.0),
            Axis::Y => (self.acceleration.y, self.velocity.y) = (0.0, 0.0),
            Axis::Z => (self.acceleration.z, self.velocity.z) = (0.0, 0.0),
        }
    }

    /// Integrate velocity and move the camera by one frame.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        let max = self.max_speed();
        let v = self.velocity + self.acceleration * dt;
        self.velocity = Vector3::new(
            v.x.clamp(-max, max),
            v.y.clamp(-max, max),
            v.z.clamp(-max, max),
        );
        if self.velocity != Vector3::new(0.0, 0.0, 0.0) {
            camera.translate(self.velocity * dt);
        }
    }

    /// Mouse look from a pointer delta in pixels.
    ///
    /// Returns `false` when the step was too large to be a real drag (pointer
    /// warps and focus changes report huge jumps) and was ignored.
    pub fn look(&self, camera: &mut Camera, dx: f64, dy: f64) -> bool {
        let delta_yaw = self.look_sensitivity * dx as f32;
        let delta_pitch = self.look_sensitivity * dy as f32;
        if delta_yaw.abs() > self.max_look_step || delta_pitch.abs() > self.max_look_step {
            return false;
        }
        camera.rotate(Rad(delta_yaw), Rad(delta_pitch));
        true
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(4.0, 4.0, 20.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Deg<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn fovy(&self) -> Deg<f32> {
        self.fovy
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Zoom by wheel notches; positive `steps` narrow the field of view.
    pub fn zoom(&mut self, steps: f32) {
        self.fovy = Deg((self.fovy.0 - steps * FOV_STEP.0).clamp(MIN_FOV.0, MAX_FOV.0));
    }

    pub fn reset_fov(&mut self) {
        self.fovy = DEFAULT_FOV;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Per-pass camera data. `eye.w` scales every material's reflection power;
/// it is zero while the scene is captured into the cubemap.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            eye: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn from_matrices(
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        eye: Point3<f32>,
        reflections: bool,
    ) -> Self {
        Self {
            view_proj: (projection * view).into(),
            eye: [eye.x, eye.y, eye.z, if reflections { 1.0 } else { 0.0 }],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        *self = Self::from_matrices(camera.view, projection.calc_matrix(), camera.eye(), true);
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

pub fn camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("camera_bind_group_layout"),
    })
}

/// A camera uniform buffer and its bind group (bind group 1).
#[derive(Debug)]
pub struct CameraBinding {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl CameraBinding {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        uniform: CameraUniform,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} Bind Group")),
        });
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, uniform: CameraUniform) {
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

/// The user controlled camera with its GPU binding.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub projection: Projection,
    pub binding: CameraBinding,
}

impl CameraResources {
    /// Upload the current view and projection.
    pub fn write(&mut self, queue: &wgpu::Queue) {
        let mut uniform = self.binding.uniform;
        uniform.update_view_proj(&self.camera, &self.projection);
        self.binding.write(queue, uniform);
    }
}
