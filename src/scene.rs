//! The demo scene: which models are drawn where, and with what material.
//!
//! Every object is drawn instanced from a shared [`Model`]. Objects with a
//! non zero reflection power are only drawn by the main pass; the cubemap
//! captures see everything else.

use std::time::Duration;

use anyhow::Context as _;
use cgmath::{Deg, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    config::SceneConfig,
    data_structures::{
        instance::Instance,
        material::{MAX_REFLECTION_POWER, Material, MaterialResources},
        model::{DrawModel, MeshSelection, Model},
        texture::Texture,
    },
    pipelines::{
        Layouts,
        light::{LightResources, Lighting, PointLight},
    },
    resources::{self, shapes},
};

/// Rotation speed of the spinning objects, per second.
pub const SPIN_RATE: Deg<f32> = Deg(6.0);

const FURNITURE_SCALE: f32 = 0.004;
/// Height of the table top.
const TABLE_TOP: f32 = 3.04;
/// `lamp.glb` stands on its origin and is 1.2 units tall, so the bulb sits
/// on top of it.
const LAMP_SCALE: f32 = 1.0;
/// `teapot.obj` is centred on its origin and modelled at the size of a
/// teapot drawn with size 2.
const TEAPOT_SCALE: f32 = 0.2;

/// Which objects a pass draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawSet {
    /// Everything that does not reflect; what the cubemap captures.
    Surroundings,
    Reflective,
}

/// How to build a [`SceneObject`].
#[derive(Clone, Debug)]
pub struct ObjectDesc<'a> {
    pub name: &'a str,
    pub model: usize,
    pub meshes: MeshSelection,
    pub instances: Vec<Instance>,
    pub material: Material,
    /// The white texture is used when `None`.
    pub texture: Option<&'a Texture>,
    /// Spin the first instance about this axis, after its own rotation.
    pub spin_axis: Option<Vector3<f32>>,
    /// Glows while point light `n` is switched on.
    pub bulb: Option<usize>,
}

impl<'a> ObjectDesc<'a> {
    pub fn new(name: &'a str, model: usize, material: Material) -> Self {
        Self {
            name,
            model,
            meshes: MeshSelection::All,
            instances: vec![Instance::new()],
            material,
            texture: None,
            spin_axis: None,
            bulb: None,
        }
    }

    pub fn meshes(mut self, meshes: MeshSelection) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn instance(self, instance: Instance) -> Self {
        self.instances(vec![instance])
    }

    pub fn instances(mut self, instances: Vec<Instance>) -> Self {
        self.instances = instances;
        self
    }

    pub fn textured(mut self, texture: &'a Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn spinning(mut self, axis: Vector3<f32>) -> Self {
        self.spin_axis = Some(axis);
        self
    }

    pub fn bulb(mut self, light: usize) -> Self {
        self.bulb = Some(light);
        self
    }
}

#[derive(Debug)]
pub struct SceneObject {
    pub name: String,
    model: usize,
    meshes: MeshSelection,
    instances: Vec<Instance>,
    instance_buffer: wgpu::Buffer,
    pub material: MaterialResources,
    spin: Option<(Instance, Vector3<f32>)>,
    bulb: Option<usize>,
}

impl SceneObject {
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn is_reflective(&self) -> bool {
        self.material.material.reflection_power > 0.0
    }

    pub fn bulb(&self) -> Option<usize> {
        self.bulb
    }

    fn write_instances(&self, queue: &wgpu::Queue) {
        let raw = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
    }
}

/// Material of a light bulb: the light's hue at full brightness, glowing
/// only while the light is on.
pub fn bulb_material(light: &PointLight) -> Material {
    let peak = light.diffuse.iter().copied().fold(0.0f32, f32::max);
    let colour = if peak > 0.0 {
        light.diffuse.map(|c| c / peak)
    } else {
        [1.0; 3]
    };
    let [r, g, b] = colour;
    Material::diffuse(r, g, b)
        .with_specular([0.0; 3])
        .with_emissive(if light.enabled { colour } else { [0.0; 3] })
}

/// The blue teapot on the right of the table.
pub fn teapot(model: usize) -> ObjectDesc<'static> {
    ObjectDesc::new("teapot", model, Material::diffuse(0.2, 0.2, 0.8))
        .instance(
            Instance::at(1.5, 3.36, 0.5)
                .rotated(Vector3::unit_y(), Deg(320.0))
                .scaled(TEAPOT_SCALE),
        )
}

/// Spin angle after `dt`, wrapped to [0, 360).
pub fn advance_spin(angle: Deg<f32>, dt: Duration) -> Deg<f32> {
    Deg((angle.0 + SPIN_RATE.0 * dt.as_secs_f32()).rem_euclid(360.0))
}

#[derive(Debug)]
pub struct Scene {
    models: Vec<Model>,
    objects: Vec<SceneObject>,
    white: Texture,
    spin: Deg<f32>,
}

impl Scene {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            models: Vec::new(),
            objects: Vec::new(),
            white: Texture::create_solid_colour([255; 4], "none", device, queue),
            spin: Deg(0.0),
        }
    }

    pub fn add_model(&mut self, model: Model) -> usize {
        self.models.push(model);
        self.models.len() - 1
    }

    pub fn add_object(
        &mut self,
        device: &wgpu::Device,
        layouts: &Layouts,
        desc: ObjectDesc<'_>,
    ) -> anyhow::Result<usize> {
        if desc.model >= self.models.len() {
            anyhow::bail!("{}: no model with index {}", desc.name, desc.model);
        }
        if desc.instances.is_empty() {
            anyhow::bail!("{}: an object needs at least one instance", desc.name);
        }
        let raw = desc.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", desc.name)),
            contents: bytemuck::cast_slice(&raw),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let texture = desc.texture.unwrap_or(&self.white);
        let material =
            MaterialResources::new(device, &layouts.material, desc.name, desc.material, texture);
        let spin = desc
            .spin_axis
            .map(|axis| (desc.instances[0].clone(), axis));

        self.objects.push(SceneObject {
            name: desc.name.to_string(),
            model: desc.model,
            meshes: desc.meshes,
            instances: desc.instances,
            instance_buffer,
            material,
            spin,
            bulb: desc.bulb,
        });
        Ok(self.objects.len() - 1)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn spin(&self) -> Deg<f32> {
        self.spin
    }

    /// Load every asset and place the objects. Nothing is drawn before this
    /// has succeeded.
    pub async fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &Layouts,
        config: &SceneConfig,
        lighting: &Lighting,
    ) -> anyhow::Result<Self> {
        let root = config.asset_root.as_path();
        log::info!("loading assets from {}", root.display());
        let (table, vase, teapot_model, bunny, lamp, wood) = futures::try_join!(
            resources::load_model_obj(root, "models/table.obj", device),
            resources::load_model_obj(root, "models/vase.obj", device),
            resources::load_model_obj(root, "models/teapot.obj", device),
            resources::load_model_obj(root, "models/bunny.obj", device),
            resources::load_model_gltf(root, "models/lamp.glb", device),
            resources::texture::load_texture(root, "textures/wood.bmp", device, queue),
        )
        .context("could not load the scene assets")?;
        if table.meshes.len() < 2 {
            log::warn!(
                "{} has {} meshes, expected chairs and a table top",
                table.name,
                table.meshes.len()
            );
        }

        let mut scene = Self::new(device, queue);
        let table = scene.add_model(table);
        let vase = scene.add_model(vase);
        let teapot_model = scene.add_model(teapot_model);
        let bunny = scene.add_model(bunny);
        let lamp = scene.add_model(lamp);
        let sphere = scene.add_model(resources::load_geometry(
            "sphere",
            &shapes::sphere(1.0, 32, 32),
            device,
        ));
        let pyramid = scene.add_model(resources::load_geometry(
            "pyramid",
            &shapes::pyramid(),
            device,
        ));

        let y = Vector3::unit_y();
        let grey = Material::diffuse(0.6, 0.6, 0.6);

        for (i, light) in lighting.points.iter().enumerate() {
            let [x, ly, z] = light.position;
            scene.add_object(
                device,
                layouts,
                ObjectDesc::new(&format!("bulb {}", i + 1), sphere, bulb_material(light))
                    .instance(Instance::at(x, ly, z).scaled(0.1))
                    .bulb(i),
            )?;
            scene.add_object(
                device,
                layouts,
                ObjectDesc::new(&format!("lamp {}", i + 1), lamp, Material::diffuse(0.3, 0.3, 0.3))
                    .instance(Instance::at(x, TABLE_TOP, z).scaled(LAMP_SCALE)),
            )?;
        }

        let chairs = [180.0, 0.0, 270.0, 90.0]
            .into_iter()
            .map(|angle| Instance::new().rotated(y, Deg(angle)).scaled(FURNITURE_SCALE))
            .collect();
        scene.add_object(
            device,
            layouts,
            ObjectDesc::new("chairs", table, grey)
                .meshes(MeshSelection::Only(0))
                .instances(chairs),
        )?;
        scene.add_object(
            device,
            layouts,
            ObjectDesc::new("table", table, Material::diffuse(1.0, 1.0, 1.0).with_specular([0.0; 3]))
                .meshes(MeshSelection::Only(1))
                .instance(Instance::new().rotated(y, Deg(180.0)).scaled(FURNITURE_SCALE))
                .textured(&wood),
        )?;
        scene.add_object(
            device,
            layouts,
            ObjectDesc::new(
                "vase",
                vase,
                Material::diffuse(0.5, 0.7, 0.9).with_reflection(MAX_REFLECTION_POWER),
            )
            .instance(Instance::at(0.0, TABLE_TOP, 0.0).rotated(y, Deg(90.0)).scaled(0.1)),
        )?;
        scene.add_object(device, layouts, teapot(teapot_model))?;
        scene.add_object(
            device,
            layouts,
            ObjectDesc::new("pyramid", pyramid, Material::diffuse(0.9, 0.1, 0.1))
                .instance(
                    Instance::at(-1.5, 3.74, 0.5)
                        .rotated(Vector3::unit_z(), Deg(180.0))
                        .scaled(0.1),
                )
                .spinning(y),
        )?;
        scene.add_object(
            device,
            layouts,
            ObjectDesc::new("bunny", bunny, Material::diffuse(0.2, 0.5, 0.1))
                .instance(Instance::at(-1.5, 3.55, 0.5).scaled(4.0))
                .spinning(-y),
        )?;

        log::info!(
            "scene ready: {} objects from {} models",
            scene.objects.len(),
            scene.models.len()
        );
        Ok(scene)
    }

    /// Advance the animation and upload the moved instances.
    pub fn update(&mut self, queue: &wgpu::Queue, dt: Duration) {
        self.spin = advance_spin(self.spin, dt);
        for object in &mut self.objects {
            if let Some((base, axis)) = &object.spin {
                object.instances[0] = base.clone().rotated(*axis, self.spin);
                object.write_instances(queue);
            }
        }
    }

    /// Switch point light `index` and the glow of its bulbs.
    pub fn toggle_light(
        &mut self,
        queue: &wgpu::Queue,
        lights: &mut LightResources,
        index: usize,
    ) -> Option<bool> {
        let enabled = lights.toggle(queue, index)?;
        let material = bulb_material(&lights.lighting.points[index]);
        for object in self.objects.iter_mut().filter(|o| o.bulb == Some(index)) {
            object.material.update(queue, material);
        }
        log::info!("point light {} {}", index + 1, if enabled { "on" } else { "off" });
        Some(enabled)
    }

    /// Draw one set of objects. The pass must already have its pipeline.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        camera: &wgpu::BindGroup,
        lights: &wgpu::BindGroup,
        environment: &wgpu::BindGroup,
        set: DrawSet,
    ) {
        pass.set_bind_group(1, camera, &[]);
        pass.set_bind_group(2, lights, &[]);
        pass.set_bind_group(3, environment, &[]);
        let wanted = set == DrawSet::Reflective;
        for object in self.objects.iter().filter(|o| o.is_reflective() == wanted) {
            let meshes = self.models[object.model].select(object.meshes);
            if meshes.is_empty() {
                continue;
            }
            pass.set_bind_group(0, &object.material.bind_group, &[]);
            pass.set_vertex_buffer(1, object.instance_buffer.slice(..));
            pass.draw_meshes_instanced(meshes, 0..object.instances.len() as u32);
        }
    }
}
