//! Procedural geometry for the objects that do not come from a mesh file.
//!
//! Both shapes are wound counter-clockwise seen from outside, matching the
//! back-face culling of the scene pipeline.

use std::f32::consts::PI;

use cgmath::InnerSpace;

use crate::data_structures::model::ModelVertex;

/// CPU side triangle list.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/// UV sphere centred on the origin.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> Geometry {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let phi = v * PI;
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            let theta = u * 2.0 * PI;
            let normal = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            vertices.push(ModelVertex {
                position: normal.map(|c| c * radius),
                tex_coords: [u, v],
                normal,
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    Geometry { vertices, indices }
}

/// Square based pyramid, 8 units wide and 7 units tall, flat shaded.
pub fn pyramid() -> Geometry {
    let apex = cgmath::Vector3::new(0.0f32, 7.0, 0.0);
    let base = [
        cgmath::Vector3::new(-4.0f32, 0.0, -4.0),
        cgmath::Vector3::new(4.0, 0.0, -4.0),
        cgmath::Vector3::new(4.0, 0.0, 4.0),
        cgmath::Vector3::new(-4.0, 0.0, 4.0),
    ];
    // Centre of mass of the solid, used to orient every face outwards.
    let centre = cgmath::Vector3::new(0.0f32, 7.0 / 4.0, 0.0);

    let mut geometry = Geometry::default();
    for k in 0..base.len() {
        let corners = [base[k], base[(k + 1) % base.len()], apex];
        push_flat_face(&mut geometry, &corners, &[[0, 1, 2]], centre);
    }
    push_flat_face(&mut geometry, &base, &[[0, 1, 2], [0, 2, 3]], centre);
    geometry
}

fn push_flat_face(
    geometry: &mut Geometry,
    corners: &[cgmath::Vector3<f32>],
    triangles: &[[u32; 3]],
    centre: cgmath::Vector3<f32>,
) {
    let [a, b, c] = triangles[0].map(|i| corners[i as usize]);
    let mut normal = (b - a).cross(c - a).normalize();
    let face_centre = corners.iter().fold(cgmath::Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + *p)
        / corners.len() as f32;
    let flip = normal.dot(face_centre - centre) < 0.0;
    if flip {
        normal = -normal;
    }

    let offset = geometry.vertices.len() as u32;
    geometry.vertices.extend(corners.iter().map(|p| ModelVertex {
        position: (*p).into(),
        tex_coords: [0.0, 0.0],
        normal: normal.into(),
    }));
    for [i, j, k] in triangles {
        if flip {
            geometry.indices.extend_from_slice(&[offset + i, offset + k, offset + j]);
        } else {
            geometry.indices.extend_from_slice(&[offset + i, offset + j, offset + k]);
        }
    }
}
