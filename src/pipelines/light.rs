use wgpu::util::DeviceExt;

/// Number of switchable point lights the shader knows about.
pub const POINT_LIGHTS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub enabled: bool,
}

/// A light infinitely far away shining from `direction` (pointing towards
/// the light, not away from it).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    pub diffuse: [f32; 3],
}

/// All lights of the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: [f32; 3],
    pub directional: DirectionalLight,
    pub points: [PointLight; POINT_LIGHTS],
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: [0.1, 0.1, 0.1],
            directional: DirectionalLight {
                direction: [1.0, 0.5, 1.0],
                diffuse: [0.2, 0.2, 0.2],
            },
            points: [
                PointLight {
                    position: [-2.95, 4.24, -1.0],
                    diffuse: [0.5, 0.5, 0.5],
                    specular: [1.0, 1.0, 1.0],
                    enabled: true,
                },
                PointLight {
                    position: [2.95, 4.24, -1.0],
                    diffuse: [0.5, 0.0, 0.0],
                    specular: [1.0, 1.0, 1.0],
                    enabled: true,
                },
            ],
        }
    }
}

impl Lighting {
    /// Flip point light `index`. Returns the new state, `None` if there is
    /// no such light.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let light = self.points.get_mut(index)?;
        light.enabled = !light.enabled;
        Some(light.enabled)
    }

    pub fn to_uniform(&self) -> LightUniform {
        let [ar, ag, ab] = self.ambient;
        let [dx, dy, dz] = self.directional.direction;
        let [dr, dg, db] = self.directional.diffuse;
        LightUniform {
            ambient: [ar, ag, ab, 0.0],
            direction: [dx, dy, dz, 0.0],
            directional_diffuse: [dr, dg, db, 0.0],
            points: self.points.map(|p| {
                let [x, y, z] = p.position;
                let [r, g, b] = p.diffuse;
                let [sr, sg, sb] = p.specular;
                PointLightUniform {
                    position: [x, y, z, if p.enabled { 1.0 } else { 0.0 }],
                    diffuse: [r, g, b, 0.0],
                    specular: [sr, sg, sb, 0.0],
                }
            }),
        }
    }
}

/// `position.w` is 1 while the light is on.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

// Every field is a vec4 so the struct needs no explicit padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 4],
    pub direction: [f32; 4],
    pub directional_diffuse: [f32; 4],
    pub points: [PointLightUniform; POINT_LIGHTS],
}

pub fn light_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("light_bind_group_layout"),
    })
}

#[derive(Debug)]
pub struct LightResources {
    pub lighting: Lighting,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, lighting: Lighting) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[lighting.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            lighting,
            buffer,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[self.lighting.to_uniform()]),
        );
    }

    pub fn toggle(&mut self, queue: &wgpu::Queue, index: usize) -> Option<bool> {
        let enabled = self.lighting.toggle(index)?;
        self.write(queue);
        Some(enabled)
    }
}
