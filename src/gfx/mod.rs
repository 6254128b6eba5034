//! # Graphics Module
//!
//! Everything that touches the GPU: the orbit camera, procedural meshes,
//! GPU resources and the render passes.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with drag, zoom and auto-rotation
//! - **Geometry** ([`geometry`]) - Procedural ground plane and extruded star
//! - **Resource Management** ([`resources`]) - Per-frame uniforms and textures
//! - **Rendering Pipeline** ([`rendering`]) - Instanced sprites, mirrored
//!   reflection, bloom and vignette
//!
//! ## Usage
//!
//! ```no_run
//! use evergreen::gfx::{RenderEngine, OrbitCamera};
//!
//! // The render engine is created by the app once the window exists
//! // let engine = RenderEngine::new(window, width, height, true, &scene).await?;
//! let camera = OrbitCamera::scene_default(16.0 / 9.0);
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
