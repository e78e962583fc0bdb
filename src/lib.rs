//! reflect-ngin
//!
//! A small wgpu scene: a table with chairs, a vase, a teapot, a bunny, a
//! pyramid and two lamps, lit by a directional light and two switchable point lights.
//! The vase reflects its surroundings through a cubemap that is re-rendered
//! from the vase's centre every frame.
//!
//! High-level modules
//! - `camera`: first-person camera, controller, projection and uniforms
//! - `config`: start-up settings
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, instances, materials and textures
//! - `flow`: the winit event loop
//! - `input`: key and mouse bindings
//! - `pipelines`: the scene pipelines, bind group layouts and lights
//! - `reflection`: cubemap faces and the environment capture
//! - `render`: frame composition (captures, then the main pass)
//! - `resources`: loading meshes and textures, procedural shapes
//! - `scene`: object placement, materials and animation
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod reflection;
pub mod render;
pub mod resources;
pub mod scene;

pub use config::SceneConfig;
pub use flow::run;
