//! Scene model: particle fields, palettes, greeting and animation
//!
//! Everything in this module is plain data and math. GPU resources live in
//! [`crate::gfx`] and are built from the values here.

pub mod animation;
pub mod composer;
pub mod glow;
pub mod greeting;
pub mod palette;
pub mod particles;

pub use animation::SceneClock;
pub use composer::{FrameState, LightRig, LightSource, Scene, SceneSettings, SettingsChange};
pub use greeting::Greeting;
pub use palette::{Color, Palette, PaletteIndex, PALETTES};
pub use particles::{ParticleField, ParticleInstance, TreeParticles};
