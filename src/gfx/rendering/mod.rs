//! Core rendering functionality
//!
//! Handles render pipelines, the per-object renderers, post-processing and
//! frame submission.

pub mod ground_renderer;
pub mod particle_renderer;
pub mod pipeline_manager;
pub mod post_process;
pub mod render_engine;
pub mod shaders;
pub mod star_renderer;
pub mod vertex;

// Re-export main types
pub use pipeline_manager::{DepthMode, PipelineConfig};
pub use post_process::{BloomSettings, PostSettings, VignetteSettings};
pub use render_engine::RenderEngine;
