pub mod config;
pub mod easing;
pub mod input;

// Scene geometry and data
pub mod curve;
pub mod timeline;
pub mod markers;

// Scroll mapping
pub mod camera;
pub mod context;
pub mod events;
pub mod mapper;

// Particle layers
pub mod particle;
pub mod drift;
pub mod starfield;

pub mod audio;
pub mod session;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(target_arch = "wasm32")]
pub mod wasm;
