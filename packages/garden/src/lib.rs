pub mod gpu;
pub mod input;
pub mod garden;
pub mod scene_graph;
pub mod mesh_asset;
pub mod curve;
pub mod particle;
pub mod animation;
pub mod scenes;

// Look and feel
pub mod camera;
pub mod lighting;
pub mod environment;

// Audio and configuration
pub mod audio;
pub mod config;
pub mod error;

#[cfg(not(target_arch = "wasm32"))]
pub mod app;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::GardenConfig;
pub use environment::{Environment, Mood};
pub use garden::Garden;
