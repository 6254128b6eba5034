//! # Evergreen Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use evergreen::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut config = AppConfig::default();
//!     config.settings.palette = PaletteIndex::new(3)?;
//!     config.settings.greeting = Greeting::new("Happy Holidays");
//!     EvergreenApp::new(config)?.run()
//! }
//! ```

// Core application types
pub use crate::app::EvergreenApp;
pub use crate::config::{AppConfig, WindowConfig};
pub use crate::error::{EvergreenError, Result};
pub use crate::logging::{init_logging, LoggingConfig};

// Scene model
pub use crate::scene::{
    Color, FrameState, Greeting, Palette, PaletteIndex, Scene, SceneSettings, PALETTES,
};

// Graphics
pub use crate::gfx::camera::{CameraManager, OrbitCamera};
pub use crate::gfx::rendering::PostSettings;
