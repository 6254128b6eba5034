// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Typed buffers and builders for bind group layouts and bind groups.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::{InstanceBuffer, UniformBuffer};
