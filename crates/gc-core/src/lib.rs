/// Configuration, types, and shared structures for glyphcam.
///
/// This crate contains all shared types, traits, and configuration logic
/// used across the glyphcam workspace.

pub mod aspect;
pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use aspect::AspectCoordinator;
pub use charset::CharacterSet;
pub use color::{ColorStyle, cell_color};
pub use config::{Config, ConfigChange, ExportConfig, RenderConfig, apply_change};
pub use error::CoreError;
pub use frame::{Cell, Frame, Grid};
