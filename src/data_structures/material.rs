//! Per-object material constants.
//!
//! The scene sets material colours per draw rather than taking them from
//! the mesh files, so a material is a small uniform block plus the diffuse
//! texture the object samples (the white "none" texture when untextured).

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

/// Upper bound for [`Material::reflection_power`].
pub const MAX_REFLECTION_POWER: f32 = 0.9;

/// Material constants as the application sees them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub emissive: [f32; 3],
    /// Blend between lit colour (0.0) and the reflected environment.
    pub reflection_power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [1.0, 1.0, 1.0],
            diffuse: [0.6, 0.6, 0.6],
            specular: [0.6, 0.6, 1.0],
            shininess: 10.0,
            emissive: [0.0; 3],
            reflection_power: 0.0,
        }
    }
}

impl Material {
    pub fn diffuse(r: f32, g: f32, b: f32) -> Self {
        Self {
            diffuse: [r, g, b],
            ..Default::default()
        }
    }

    pub fn with_specular(mut self, specular: [f32; 3]) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }

    /// Clamped to `[0, MAX_REFLECTION_POWER]`.
    pub fn with_reflection(mut self, power: f32) -> Self {
        self.reflection_power = power.clamp(0.0, MAX_REFLECTION_POWER);
        self
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let [ar, ag, ab] = self.ambient;
        let [dr, dg, db] = self.diffuse;
        let [sr, sg, sb] = self.specular;
        let [er, eg, eb] = self.emissive;
        MaterialUniform {
            ambient: [ar, ag, ab, 0.0],
            diffuse: [dr, dg, db, 1.0],
            specular: [sr, sg, sb, self.shininess],
            emissive: [er, eg, eb, self.reflection_power],
        }
    }
}

/// GPU layout of [`Material`]. Everything is packed into vec4s so the WGSL
/// struct needs no padding fields: `specular.w` is the shininess and
/// `emissive.w` the reflection power.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
}

/// Texture, sampler and uniform of one object (bind group 0).
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
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
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// GPU side of a material.
#[derive(Debug)]
pub struct MaterialResources {
    pub material: Material,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl MaterialResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        name: &str,
        material: Material,
        texture: &Texture,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Material Buffer")),
            contents: bytemuck::cast_slice(&[material.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some(&format!("{name} Material Bind Group")),
        });
        Self {
            material,
            buffer,
            bind_group,
        }
    }

    /// Replace the constants and upload them.
    pub fn update(&mut self, queue: &wgpu::Queue, material: Material) {
        self.material = material;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[material.to_uniform()]));
    }
}
