use std::io::{BufReader, Cursor};

use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};
use reflect_ngin::{
    data_structures::{instance::Instance, model::ModelVertex},
    resources::{
        mesh::{check_indices, compute_normals, obj_vertices},
        shapes::{Geometry, pyramid, sphere},
    },
};

const EPS: f32 = 1e-4;

fn triangles(geometry: &Geometry) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
    geometry.indices.chunks_exact(3).map(|c| {
        [0, 1, 2].map(|i| Vector3::from(geometry.vertices[c[i] as usize].position))
    })
}

fn assert_valid(geometry: &Geometry) {
    assert_eq!(geometry.indices.len() % 3, 0);
    assert!(
        geometry
            .indices
            .iter()
            .all(|&i| (i as usize) < geometry.vertices.len())
    );
    for vertex in &geometry.vertices {
        let n = Vector3::from(vertex.normal);
        assert!((n.magnitude() - 1.0).abs() < EPS, "{vertex:?}");
    }
}

#[test]
fn should_build_a_closed_sphere() {
    let geometry = sphere(2.0, 32, 16);
    assert_valid(&geometry);
    assert_eq!(geometry.vertices.len(), 33 * 17);
    assert_eq!(geometry.indices.len(), 32 * 16 * 6);
    for vertex in &geometry.vertices {
        assert!((Vector3::from(vertex.position).magnitude() - 2.0).abs() < EPS);
    }
}

#[test]
fn should_wind_sphere_counter_clockwise_from_outside() {
    let geometry = sphere(1.0, 12, 8);
    let mut checked = 0;
    for [a, b, c] in triangles(&geometry) {
        let face = (b - a).cross(c - a);
        // the rows at the poles collapse into slivers
        if face.magnitude() < 1e-6 {
            continue;
        }
        let centroid = (a + b + c) / 3.0;
        assert!(face.dot(centroid) > 0.0);
        checked += 1;
    }
    assert!(checked > 12 * 6);
}

#[test]
fn should_build_a_flat_shaded_pyramid() {
    let geometry = pyramid();
    assert_valid(&geometry);
    assert_eq!(geometry.vertices.len(), 16);
    assert_eq!(geometry.indices.len(), 18);

    let centre = Vector3::new(0.0, 7.0 / 4.0, 0.0);
    for (i, [a, b, c]) in triangles(&geometry).enumerate() {
        let face = (b - a).cross(c - a).normalize();
        let centroid = (a + b + c) / 3.0;
        assert!(face.dot(centroid - centre) > 0.0, "triangle {i} faces inwards");

        let stored = Vector3::from(geometry.vertices[geometry.indices[i * 3] as usize].normal);
        assert!((stored - face).magnitude() < EPS, "triangle {i}: {stored:?} vs {face:?}");
    }
    let apex_height = geometry
        .vertices
        .iter()
        .map(|v| v.position[1])
        .fold(f32::MIN, f32::max);
    assert_eq!(apex_height, 7.0);
}

const QUAD_OBJ: &str = "\
o quad
v 0 0 0
v 1 0 0
v 1 0 -1
v 0 0 -1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

fn load(text: &str) -> Vec<tobj::Model> {
    let (models, _) = tobj::load_obj_buf(
        &mut BufReader::new(Cursor::new(text)),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .expect("valid obj");
    models
}

#[test]
fn should_flip_obj_texture_coordinates() {
    let models = load(QUAD_OBJ);
    let vertices = obj_vertices(&models[0].mesh);
    assert_eq!(vertices.len(), 4);
    let by_position = |p: [f32; 3]| {
        vertices
            .iter()
            .find(|v| v.position == p)
            .expect("vertex present")
            .tex_coords
    };
    assert_eq!(by_position([0.0, 0.0, 0.0]), [0.0, 1.0]);
    assert_eq!(by_position([1.0, 0.0, -1.0]), [1.0, 0.0]);
}

#[test]
fn should_compute_missing_obj_normals() {
    let models = load(QUAD_OBJ);
    assert!(models[0].mesh.normals.is_empty());
    for vertex in obj_vertices(&models[0].mesh) {
        assert!((Vector3::from(vertex.normal) - Vector3::unit_y()).magnitude() < EPS);
    }
}

#[test]
fn should_fall_back_to_up_for_unused_vertices() {
    let mut vertices = vec![
        ModelVertex {
            position: [0.0, 0.0, 0.0],
            ..Default::default()
        },
        ModelVertex {
            position: [0.0, 0.0, 1.0],
            ..Default::default()
        },
        ModelVertex {
            position: [1.0, 0.0, 0.0],
            ..Default::default()
        },
        ModelVertex {
            position: [5.0, 5.0, 5.0],
            ..Default::default()
        },
    ];
    compute_normals(&mut vertices, &[0, 1, 2]);
    assert_eq!(vertices[0].normal, [0.0, 1.0, 0.0]);
    assert_eq!(vertices[3].normal, [0.0, 1.0, 0.0]);
}

#[test]
fn should_compose_translation_rotation_and_scale() {
    let instance = Instance::at(-1.5, 3.74, 0.5)
        .rotated(Vector3::unit_z(), Deg(180.0))
        .rotated(Vector3::unit_y(), Deg(90.0))
        .scaled(0.1);
    let expected = Matrix4::from_translation(Vector3::new(-1.5, 3.74, 0.5))
        * Matrix4::from_angle_z(Deg(180.0))
        * Matrix4::from_angle_y(Deg(90.0))
        * Matrix4::from_scale(0.1);
    let actual = instance.to_matrix();
    for (a, e) in [actual.x, actual.y, actual.z, actual.w]
        .into_iter()
        .zip([expected.x, expected.y, expected.z, expected.w])
    {
        assert!((a - e).magnitude() < EPS, "{actual:?} != {expected:?}");
    }

    // The apex of the pyramid points down after the flip.
    let apex = actual * Vector4::new(0.0, 7.0, 0.0, 1.0);
    assert!((apex.y - (3.74 - 0.7)).abs() < EPS);
}

#[test]
fn should_keep_normals_unit_length_for_uniform_scale() {
    let raw = Instance::new()
        .rotated(Vector3::unit_y(), Deg(30.0))
        .scaled(4.0)
        .to_raw();
    let normal = cgmath::Matrix3::from(raw.normal);
    assert!((normal.determinant() - 1.0).abs() < EPS);
    let model = Matrix4::from(raw.model);
    assert!((model.determinant() - 64.0).abs() < 1e-2);
}

#[test]
fn should_reject_indices_past_the_last_vertex() {
    assert!(check_indices(&[0, 1, 2, 2, 1, 3], 4).is_ok());
    assert!(check_indices(&[], 0).is_ok());

    let err = check_indices(&[0, 1, 4], 4).unwrap_err();
    assert!(err.to_string().contains("index 4"), "{err}");
    assert!(check_indices(&[0, 1, 2], 0).is_err());
}
