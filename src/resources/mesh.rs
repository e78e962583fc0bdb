use cgmath::InnerSpace;

use crate::data_structures::model::{self, ModelVertex};

/**
 * Converts a triangulated, single-indexed OBJ mesh into interleaved vertices.
 *
 * Texture coordinates are flipped vertically since OBJ puts the origin at the
 * bottom left while wgpu samples from the top left. Meshes exported without
 * normals get smooth normals averaged from their faces.
 */
pub fn obj_vertices(mesh: &tobj::Mesh) -> Vec<ModelVertex> {
    let mut vertices = (0..mesh.positions.len() / 3)
        .map(|i| ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            tex_coords: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
        })
        .collect::<Vec<_>>();

    if mesh.normals.is_empty() {
        compute_normals(&mut vertices, &mesh.indices);
    }
    vertices
}

/// Fails when an index points past the last vertex. Loaded index buffers go
/// through this before anything indexes `vertices` with them.
pub fn check_indices(indices: &[u32], vertex_count: usize) -> anyhow::Result<()> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(i) => anyhow::bail!("index {i} out of range for {vertex_count} vertices"),
        None => Ok(()),
    }
}

/// Overwrite all normals with area weighted face normals.
///
/// `indices` must be in range, see [`check_indices`].
pub fn compute_normals(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut sums = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); vertices.len()];
    for c in indices.chunks_exact(3) {
        let pos0: cgmath::Vector3<_> = vertices[c[0] as usize].position.into();
        let pos1: cgmath::Vector3<_> = vertices[c[1] as usize].position.into();
        let pos2: cgmath::Vector3<_> = vertices[c[2] as usize].position.into();

        // Not normalised: the cross product length weighs big faces more.
        let face = (pos1 - pos0).cross(pos2 - pos0);
        for &i in c {
            sums[i as usize] += face;
        }
    }
    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        vertex.normal = if sum.magnitude2() > 0.0 {
            sum.normalize().into()
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}

pub fn load_meshes(
    models: &[tobj::Model],
    file_name: &str,
    device: &wgpu::Device,
) -> Vec<model::Mesh> {
    models
        .iter()
        .map(|m| {
            let vertices = obj_vertices(&m.mesh);
            let name = if m.name.is_empty() {
                file_name.to_string()
            } else {
                format!("{file_name}:{}", m.name)
            };
            // The indices are shared by positions, texels and normals since `single_index` is set
            model::Mesh::from_geometry(device, &name, &vertices, &m.mesh.indices)
        })
        .collect::<Vec<_>>()
}
