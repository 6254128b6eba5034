// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, uniform buffers, and bind groups for rendering.

pub mod frame_bindings;
pub mod texture_resource;

// Re-export main types
pub use frame_bindings::{FrameBindings, FrameUniformContent, MirrorBindings};
pub use texture_resource::TextureResource;
