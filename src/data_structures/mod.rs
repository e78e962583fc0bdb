//! Scene data structures: models, materials, textures and instances.
//!
//! - `model` contains mesh definitions and the GPU buffers of 3D models
//! - `material` holds per-object material constants and their bind group
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data

pub mod instance;
pub mod material;
pub mod model;
pub mod texture;
