use std::path::PathBuf;

/// Start-up settings of the demo. The binary runs with the defaults;
/// library callers can override any field before calling [`crate::flow::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory the model and texture paths are resolved against, relative
    /// to the working directory unless absolute.
    pub asset_root: PathBuf,
    /// Edge length of each cubemap face in pixels.
    pub cube_size: u32,
    /// Where the cubemap is captured from, the centre of the reflective object.
    pub reflection_origin: [f32; 3],
    pub clear_colour: wgpu::Color,
    pub fov: cgmath::Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "3DGL Scene: Reflections".to_string(),
            width: 1280,
            height: 720,
            asset_root: PathBuf::from("assets"),
            cube_size: 256,
            reflection_origin: [0.0, 3.5, 0.0],
            clear_colour: wgpu::Color {
                r: 0.18,
                g: 0.25,
                b: 0.22,
                a: 1.0,
            },
            fov: crate::camera::DEFAULT_FOV,
            znear: 0.02,
            zfar: 1000.0,
        }
    }
}
