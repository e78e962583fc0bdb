#![cfg(feature = "integration-tests")]

mod common;

use std::iter;

use cgmath::{Deg, InnerSpace, Point3, Vector3};
use common::test_utils::{headless, offscreen_target, read_layer};
use reflect_ngin::{
    camera::{CameraBinding, CameraUniform, OPENGL_TO_WGPU_MATRIX},
    data_structures::{instance::Instance, material::Material, texture::Texture},
    pipelines::{
        Layouts,
        basic::ScenePipelines,
        light::{LightResources, Lighting},
    },
    reflection::EnvironmentMap,
    render::{FrameTarget, Renderer},
    resources::{load_geometry, shapes::sphere},
    scene::{ObjectDesc, Scene},
};

const SIZE: u32 = 64;

/// No light reaches the objects, so every pixel is either emissive colour,
/// reflection or the black clear colour.
fn darkness() -> Lighting {
    let mut lighting = Lighting::default();
    lighting.ambient = [0.0; 3];
    lighting.directional.diffuse = [0.0; 3];
    for light in &mut lighting.points {
        light.enabled = false;
    }
    lighting
}

fn glowing(r: f32, g: f32, b: f32) -> Material {
    Material::diffuse(0.0, 0.0, 0.0)
        .with_specular([0.0; 3])
        .with_emissive([r, g, b])
}

struct Fixture {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layouts: Layouts,
    pipelines: ScenePipelines,
    lights: LightResources,
    environment: EnvironmentMap,
    scene: Scene,
    sphere: usize,
}

async fn fixture() -> Option<Fixture> {
    let Some((device, queue)) = headless().await else {
        eprintln!("no GPU adapter available, skipping");
        return None;
    };
    let layouts = Layouts::new(&device);
    let pipelines = ScenePipelines::new(&device, Texture::CUBE_FORMAT, &layouts)
        .await
        .expect("pipelines build");
    let lights = LightResources::new(&device, &layouts.light, darkness());
    let environment = EnvironmentMap::new(
        &device,
        &queue,
        &layouts,
        SIZE,
        Point3::new(0.0, 0.0, 0.0),
        0.02,
        1000.0,
    );
    let mut scene = Scene::new(&device, &queue);
    let sphere = scene.add_model(load_geometry("sphere", &sphere(1.0, 24, 16), &device));
    Some(Fixture {
        device,
        queue,
        layouts,
        pipelines,
        lights,
        environment,
        scene,
        sphere,
    })
}

fn pixel(image: &image::RgbaImage, x: u32, y: u32) -> [u8; 3] {
    let p = image.get_pixel(x, y);
    [p[0], p[1], p[2]]
}

#[test]
fn should_capture_each_direction_into_its_face() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let Some(mut f) = fixture().await else {
            return;
        };
        let placed = [
            ("east", Instance::at(5.0, 0.0, 0.0), glowing(1.0, 0.0, 0.0)),
            ("up", Instance::at(0.0, 5.0, 0.0), glowing(0.0, 1.0, 0.0)),
            ("north", Instance::at(0.0, 0.0, -5.0), glowing(0.0, 0.0, 1.0)),
            // Up and off-centre on the +X face.
            ("high east", Instance::at(5.0, 2.0, 0.0).scaled(0.5), glowing(1.0, 1.0, 0.0)),
        ];
        for (name, instance, material) in placed {
            f.scene
                .add_object(&f.device, &f.layouts, ObjectDesc::new(name, f.sphere, material).instance(instance))
                .unwrap();
        }
        // A reflective object at the capture point must not hide anything.
        f.scene
            .add_object(
                &f.device,
                &f.layouts,
                ObjectDesc::new("mirror", f.sphere, glowing(1.0, 1.0, 1.0).with_reflection(0.9))
                    .instance(Instance::new()),
            )
            .unwrap();

        let camera = CameraBinding::new(&f.device, &f.layouts.camera, "Test Camera", CameraUniform::new());
        let renderer = Renderer {
            pipelines: &f.pipelines,
            camera: &camera.bind_group,
            lights: &f.lights,
            environment: &f.environment,
            clear_colour: wgpu::Color::BLACK,
        };
        let mut encoder = f.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });
        renderer.capture_environment(&mut encoder, &f.scene);
        f.queue.submit(iter::once(encoder.finish()));

        let centre = SIZE / 2;
        let mut faces = Vec::new();
        for layer in 0..Texture::CUBE_FACES {
            faces.push(read_layer(&f.device, &f.queue, &f.environment.cube.texture, layer, SIZE).await);
        }

        assert_eq!(pixel(&faces[0], centre, centre), [255, 0, 0]);
        assert_eq!(pixel(&faces[2], centre, centre), [0, 255, 0]);
        assert_eq!(pixel(&faces[5], centre, centre), [0, 0, 255]);
        for empty in [1, 3, 4] {
            assert_eq!(pixel(&faces[empty], centre, centre), [0, 0, 0], "face {empty}");
        }

        // +y in the world is the top half of a side face.
        let row = (0.3 * SIZE as f32) as u32;
        assert_eq!(pixel(&faces[0], centre, row), [255, 255, 0]);
        assert_eq!(pixel(&faces[0], centre, SIZE - row), [0, 0, 0]);
    });
}

#[test]
fn should_reflect_what_is_behind_the_viewer() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let Some(mut f) = fixture().await else {
            return;
        };
        f.scene
            .add_object(
                &f.device,
                &f.layouts,
                ObjectDesc::new("behind", f.sphere, glowing(0.0, 1.0, 0.0))
                    .instance(Instance::at(0.0, 0.0, 10.0)),
            )
            .unwrap();
        f.scene
            .add_object(
                &f.device,
                &f.layouts,
                ObjectDesc::new("mirror", f.sphere, glowing(0.0, 0.0, 0.0).with_reflection(0.9))
                    .instance(Instance::new()),
            )
            .unwrap();

        let eye = Point3::new(0.0, 0.0, 5.0);
        let view = cgmath::Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());
        let proj = OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(60.0), 1.0, 0.1, 100.0);
        let camera = CameraBinding::new(
            &f.device,
            &f.layouts.camera,
            "Test Camera",
            CameraUniform::from_matrices(view, proj, eye, true),
        );
        let renderer = Renderer {
            pipelines: &f.pipelines,
            camera: &camera.bind_group,
            lights: &f.lights,
            environment: &f.environment,
            clear_colour: wgpu::Color::BLACK,
        };

        let output = offscreen_target(&f.device, SIZE, Texture::CUBE_FORMAT);
        let colour = output.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = Texture::create_depth_texture(&f.device, [SIZE, SIZE], "test depth");
        let target = FrameTarget {
            colour: &colour,
            depth: &depth.view,
        };
        f.queue
            .submit(iter::once(renderer.encode_frame(&f.device, &f.scene, &target)));

        let image = read_layer(&f.device, &f.queue, &output, 0, SIZE).await;
        let [r, g, b] = pixel(&image, SIZE / 2, SIZE / 2);
        // 90% of the captured green, stored without sRGB encoding
        assert!((225..=235).contains(&g), "reflection off: {r} {g} {b}");
        assert!(r < 8 && b < 8, "unexpected tint: {r} {g} {b}");
        // The corners miss the mirror and show the clear colour.
        assert_eq!(pixel(&image, 0, 0), [0, 0, 0]);
    });
}

#[test]
fn should_validate_animate_and_light_objects() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let Some(mut f) = fixture().await else {
            return;
        };
        assert_eq!(f.environment.size(), SIZE);
        let depth = Texture::create_depth_texture(&f.device, [8, 8], "unsampled depth");
        assert!(depth.sampler.is_none());
        assert!(depth.texture.usage().contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        f.environment.set_origin(&f.queue, Point3::new(0.0, 3.5, 0.0));
        assert_eq!(f.environment.origin(), Point3::new(0.0, 3.5, 0.0));

        let missing = ObjectDesc::new("ghost", f.sphere + 1, Material::default());
        assert!(f.scene.add_object(&f.device, &f.layouts, missing).is_err());
        let empty = ObjectDesc::new("nothing", f.sphere, Material::default()).instances(vec![]);
        assert!(f.scene.add_object(&f.device, &f.layouts, empty).is_err());
        assert!(f.scene.objects().is_empty());

        let mut lights = LightResources::new(&f.device, &f.layouts.light, Lighting::default());
        let bulb = reflect_ngin::scene::bulb_material(&lights.lighting.points[0]);
        f.scene
            .add_object(
                &f.device,
                &f.layouts,
                ObjectDesc::new("bulb", f.sphere, bulb).bulb(0),
            )
            .unwrap();
        f.scene
            .add_object(
                &f.device,
                &f.layouts,
                ObjectDesc::new("top", f.sphere, Material::default())
                    .instance(Instance::at(1.0, 0.0, 0.0))
                    .spinning(Vector3::unit_y()),
            )
            .unwrap();

        f.scene.update(&f.queue, std::time::Duration::from_secs(5));
        assert!((f.scene.spin().0 - 30.0).abs() < 1e-3);
        let top = f.scene.object("top").unwrap();
        assert!(!top.is_reflective());
        let expected = Instance::at(1.0, 0.0, 0.0).rotated(Vector3::unit_y(), Deg(30.0));
        assert_eq!(top.instances()[0].position, expected.position);
        assert!((top.instances()[0].rotation - expected.rotation).magnitude() < 1e-5);

        assert_eq!(f.scene.toggle_light(&f.queue, &mut lights, 0), Some(false));
        let bulb = f.scene.object("bulb").unwrap();
        assert_eq!(bulb.bulb(), Some(0));
        assert_eq!(bulb.material.material.emissive, [0.0; 3]);
        assert_eq!(f.scene.toggle_light(&f.queue, &mut lights, 7), None);
    });
}
