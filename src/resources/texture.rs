use std::path::Path;

use anyhow::Context as _;

use crate::data_structures::texture;

pub async fn load_string(root: &Path, file_name: &str) -> anyhow::Result<String> {
    let path = root.join(file_name);
    log::debug!("reading {}", path.display());
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("could not read {}", path.display()))
}

pub async fn load_binary(root: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = root.join(file_name);
    log::debug!("reading {}", path.display());
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("could not read {}", path.display()))
}

/// Load and decode a bitmap; the file extension is used as the format hint.
pub async fn load_texture(
    root: &Path,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<texture::Texture> {
    let data = load_binary(root, file_name).await?;
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str());
    texture::Texture::from_bytes(device, queue, &data, file_name, extension)
        .with_context(|| format!("could not decode texture {file_name}"))
}
