//! Dynamic environment mapping.
//!
//! Every frame the scene around the reflective object is rendered into the
//! six faces of a cubemap from the object's centre. The main pass then
//! samples that cubemap along the reflected view vector.
//!
//! Faces are stored in array-layer order +X, -X, +Y, -Y, +Z, -Z. Cube
//! sampling addresses a face with `u = (sc / |ma| + 1) / 2` and
//! `v = (tc / |ma| + 1) / 2`, where `v` grows downwards in the stored image.
//! The OpenGL style up vectors below combined with a Y flip in the capture
//! projection produce exactly that layout; the flip mirrors the image, so
//! the capture pipeline treats clockwise triangles as front facing.

use cgmath::{Deg, Matrix4, Point3, Vector3};

use crate::{
    camera::{CameraBinding, CameraUniform, OPENGL_TO_WGPU_MATRIX},
    data_structures::texture::{self, Texture},
    pipelines::Layouts,
};

/// One face of the cubemap: the direction the capture camera looks along
/// and its up vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeFace {
    pub direction: Vector3<f32>,
    pub up: Vector3<f32>,
}

pub const CUBE_FACES: [CubeFace; 6] = [
    CubeFace {
        direction: Vector3::new(1.0, 0.0, 0.0),
        up: Vector3::new(0.0, -1.0, 0.0),
    },
    CubeFace {
        direction: Vector3::new(-1.0, 0.0, 0.0),
        up: Vector3::new(0.0, -1.0, 0.0),
    },
    CubeFace {
        direction: Vector3::new(0.0, 1.0, 0.0),
        up: Vector3::new(0.0, 0.0, 1.0),
    },
    CubeFace {
        direction: Vector3::new(0.0, -1.0, 0.0),
        up: Vector3::new(0.0, 0.0, -1.0),
    },
    CubeFace {
        direction: Vector3::new(0.0, 0.0, 1.0),
        up: Vector3::new(0.0, -1.0, 0.0),
    },
    CubeFace {
        direction: Vector3::new(0.0, 0.0, -1.0),
        up: Vector3::new(0.0, -1.0, 0.0),
    },
];

impl CubeFace {
    pub fn view_matrix(&self, origin: Point3<f32>) -> Matrix4<f32> {
        Matrix4::look_to_rh(origin, self.direction, self.up)
    }
}

/// 90 degree square projection with clip-space Y flipped.
pub fn capture_projection(znear: f32, zfar: f32) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
        * Matrix4::from_nonuniform_scale(1.0, -1.0, 1.0)
        * cgmath::perspective(Deg(90.0), 1.0, znear, zfar)
}

/// Camera uniforms for the six captures. Reflections are switched off in
/// all of them.
pub fn face_uniforms(origin: Point3<f32>, znear: f32, zfar: f32) -> [CameraUniform; 6] {
    let projection = capture_projection(znear, zfar);
    CUBE_FACES.map(|face| {
        CameraUniform::from_matrices(face.view_matrix(origin), projection, origin, false)
    })
}

/// Cube texture and sampler (bind group 3).
pub fn environment_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("environment_bind_group_layout"),
    })
}

fn environment_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    cube: &Texture,
    label: &str,
) -> wgpu::BindGroup {
    let sampler = cube
        .sampler
        .clone()
        .unwrap_or_else(|| texture::create_cube_sampler(device));
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&cube.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
        label: Some(label),
    })
}

/// The dynamic cubemap with everything needed to render into it.
#[derive(Debug)]
pub struct EnvironmentMap {
    size: u32,
    origin: Point3<f32>,
    znear: f32,
    zfar: f32,
    pub cube: Texture,
    face_views: Vec<wgpu::TextureView>,
    depth: Texture,
    faces: Vec<CameraBinding>,
    /// Samples the dynamic cubemap; bound for the main pass.
    pub bind_group: wgpu::BindGroup,
    /// Samples a black 1x1 cubemap; bound while capturing so the cubemap
    /// is never read and written in the same pass.
    pub placeholder_bind_group: wgpu::BindGroup,
}

impl EnvironmentMap {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &Layouts,
        size: u32,
        origin: Point3<f32>,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let size = size.max(1);
        let cube = Texture::create_cube_target(device, size, "environment cubemap");
        let face_views = (0..Texture::CUBE_FACES)
            .map(|face| cube.cube_face_view(face))
            .collect();
        let depth = Texture::create_depth_texture(device, [size, size], "environment depth");
        let faces = face_uniforms(origin, znear, zfar)
            .into_iter()
            .enumerate()
            .map(|(i, uniform)| {
                CameraBinding::new(device, &layouts.camera, &format!("Cube Face {i} Camera"), uniform)
            })
            .collect();
        let placeholder = Texture::create_placeholder_cube(device, queue);
        let bind_group =
            environment_bind_group(device, &layouts.environment, &cube, "environment_bind_group");
        let placeholder_bind_group = environment_bind_group(
            device,
            &layouts.environment,
            &placeholder,
            "placeholder_environment_bind_group",
        );
        log::debug!("environment cubemap {size}x{size} at {origin:?}");

        Self {
            size,
            origin,
            znear,
            zfar,
            cube,
            face_views,
            depth,
            faces,
            bind_group,
            placeholder_bind_group,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    /// Move the capture point, e.g. when the reflective object moves.
    pub fn set_origin(&mut self, queue: &wgpu::Queue, origin: Point3<f32>) {
        self.origin = origin;
        for (binding, uniform) in self
            .faces
            .iter_mut()
            .zip(face_uniforms(origin, self.znear, self.zfar))
        {
            binding.write(queue, uniform);
        }
    }

    /// Record one render pass per face. `draw` is called with the pass and
    /// the face's camera bind group and must set its own pipeline.
    pub fn capture<F>(&self, encoder: &mut wgpu::CommandEncoder, clear: wgpu::Color, mut draw: F)
    where
        F: FnMut(&mut wgpu::RenderPass<'_>, &wgpu::BindGroup),
    {
        for (i, (view, camera)) in self.face_views.iter().zip(&self.faces).enumerate() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&format!("Cube Face {i} Pass")),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_viewport(0.0, 0.0, self.size as f32, self.size as f32, 0.0, 1.0);
            draw(&mut pass, &camera.bind_group);
        }
    }
}
