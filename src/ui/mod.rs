//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the post-processed scene.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, input capture
//! - [`SceneOverlay`] - palette swatches and the editable greeting
//!
//! When the UI wants the mouse (hovering a swatch, typing the greeting),
//! camera drag and zoom are suppressed.

pub mod manager;
pub mod overlay;

// Re-export main types
pub use manager::UiManager;
pub use overlay::SceneOverlay;
