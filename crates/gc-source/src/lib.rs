/// Frame sources for glyphcam (still image, folder, camera) and resampling.

pub mod folder;
pub mod image;
pub mod resize;

#[cfg(feature = "camera")]
pub mod camera;

pub use resize::{Resizer, resize_frame};
