// src/lib.rs
//! Evergreen
//!
//! An interactive particle Christmas tree built on wgpu and winit: a spiral
//! of glowing tree particles, falling snow, a starfield, a bobbing star with a
//! halo, a reflective floor, bloom and a vignette. The color theme and the
//! greeting are editable from the overlay.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod prelude;
pub mod scene;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::EvergreenApp;
pub use error::{EvergreenError, Result};

/// Creates an application with settings from the environment and command line
pub fn default() -> Result<EvergreenApp> {
    EvergreenApp::new(config::AppConfig::from_env_and_args()?)
}
