//! Render pipelines and the bind group layouts they share.
//!
//! Bind groups are laid out the same for every pass:
//! 0 material, 1 camera, 2 lights, 3 environment cubemap.

pub mod basic;
pub mod light;

use crate::{camera, data_structures::material, reflection};

#[derive(Debug)]
pub struct Layouts {
    pub material: wgpu::BindGroupLayout,
    pub camera: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
    pub environment: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            material: material::material_layout(device),
            camera: camera::camera_layout(device),
            light: light::light_layout(device),
            environment: reflection::environment_layout(device),
        }
    }
}
