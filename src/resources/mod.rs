use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use anyhow::Context as _;
use cgmath::{InnerSpace, Matrix, SquareMatrix};

use crate::{
    data_structures::model::{self, ModelVertex},
    resources::{shapes::Geometry, texture::load_binary, texture::load_string},
};

/**
 * This module contains all logic for loading meshes and textures from external
 * files, plus the procedural shapes the scene builds in code.
 */
pub mod mesh;
pub mod shapes;
pub mod texture;

pub async fn load_model_obj(
    root: &Path,
    file_name: &str,
    device: &wgpu::Device,
) -> anyhow::Result<model::Model> {
    let obj_text = load_string(root, file_name).await?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| async move {
            // Material libraries are optional, objects carry their own material constants.
            match load_string(root, &p).await {
                Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                Err(_) => Err(tobj::LoadError::OpenFileFailed),
            }
        },
    )
    .await
    .with_context(|| format!("could not parse {file_name}"))?;

    if let Err(e) = obj_materials {
        log::debug!("{file_name}: ignoring material library ({e})");
    }
    if models.is_empty() {
        anyhow::bail!("{file_name} contains no meshes");
    }

    let meshes = mesh::load_meshes(&models, file_name, device);
    log::debug!("loaded {file_name} with {} meshes", meshes.len());
    Ok(model::Model {
        name: file_name.to_string(),
        meshes,
    })
}

/// Load every mesh primitive of the default glTF scene, baking node
/// transforms into the vertices.
pub async fn load_model_gltf(
    root: &Path,
    file_name: &str,
    device: &wgpu::Device,
) -> anyhow::Result<model::Model> {
    let gltf_bytes = load_binary(root, file_name).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)
        .with_context(|| format!("could not parse {file_name}"))?;

    // Load buffers
    let base = Path::new(file_name).parent().unwrap_or(Path::new(""));
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .with_context(|| format!("{file_name} references a missing binary chunk"))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                let name = base.join(uri);
                let bin = load_binary(root, &name.to_string_lossy()).await?;
                buffer_data.push(bin);
            }
        }
    }

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .with_context(|| format!("{file_name} contains no scene"))?;

    let mut geometries = Vec::new();
    for node in scene.nodes() {
        collect_node(node, cgmath::Matrix4::identity(), &buffer_data, &mut geometries)
            .with_context(|| format!("broken mesh in {file_name}"))?;
    }
    if geometries.is_empty() {
        anyhow::bail!("{file_name} contains no meshes");
    }

    let meshes = geometries
        .into_iter()
        .map(|(name, geometry)| {
            model::Mesh::from_geometry(device, &name, &geometry.vertices, &geometry.indices)
        })
        .collect::<Vec<_>>();
    log::debug!("loaded {file_name} with {} meshes", meshes.len());
    Ok(model::Model {
        name: file_name.to_string(),
        meshes,
    })
}

fn collect_node(
    node: gltf::Node,
    parent: cgmath::Matrix4<f32>,
    buf: &[Vec<u8>],
    out: &mut Vec<(String, Geometry)>,
) -> anyhow::Result<()> {
    let transform = parent * cgmath::Matrix4::from(node.transform().matrix());
    let normal_matrix = {
        let upper = cgmath::Matrix3::new(
            transform.x.x, transform.x.y, transform.x.z,
            transform.y.x, transform.y.y, transform.y.z,
            transform.z.x, transform.z.y, transform.z.z,
        );
        upper.invert().map(|m| m.transpose()).unwrap_or(upper)
    };

    if let Some(gltf_mesh) = node.mesh() {
        for primitive in gltf_mesh.primitives() {
            let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(Vec::as_slice));

            let mut vertices: Vec<ModelVertex> = match reader.read_positions() {
                Some(positions) => positions
                    .map(|p| {
                        let p = transform * cgmath::Vector4::new(p[0], p[1], p[2], 1.0);
                        ModelVertex {
                            position: [p.x, p.y, p.z],
                            ..Default::default()
                        }
                    })
                    .collect(),
                None => {
                    log::warn!("skipping a primitive without positions in {:?}", gltf_mesh.name());
                    continue;
                }
            };
            if let Some(normals) = reader.read_normals() {
                for (vertex, n) in vertices.iter_mut().zip(normals) {
                    let n = normal_matrix * cgmath::Vector3::from(n);
                    vertex.normal = n.normalize().into();
                }
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                for (vertex, uv) in vertices.iter_mut().zip(tex_coords) {
                    vertex.tex_coords = uv;
                }
            }
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            mesh::check_indices(&indices, vertices.len()).with_context(|| {
                format!("primitive {} of {:?}", primitive.index(), gltf_mesh.name())
            })?;
            if reader.read_normals().is_none() {
                mesh::compute_normals(&mut vertices, &indices);
            }

            out.push((
                gltf_mesh.name().unwrap_or("unknown_mesh").to_string(),
                Geometry { vertices, indices },
            ));
        }
    }
    for child in node.children() {
        collect_node(child, transform, buf, out)?;
    }
    Ok(())
}

/// Upload procedural geometry as a single mesh model.
pub fn load_geometry(name: &str, geometry: &Geometry, device: &wgpu::Device) -> model::Model {
    model::Model {
        name: name.to_string(),
        meshes: vec![model::Mesh::from_geometry(
            device,
            name,
            &geometry.vertices,
            &geometry.indices,
        )],
    }
}
