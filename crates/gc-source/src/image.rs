use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use gc_core::frame::Frame;
use gc_core::traits::Source;

/// Source d'image statique. Retourne toujours la même frame.
///
/// # Example
/// ```no_run
/// use gc_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::new(Path::new("test.png")).unwrap();
/// ```
pub struct ImageSource {
    frame: Arc<Frame>,
}

impl ImageSource {
    /// Load an image from disk and create a source.
    ///
    /// # Errors
    /// Returns an error if the image cannot be loaded.
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            frame: Arc::new(load_image(path)?),
        })
    }

    /// Wrap an already decoded frame.
    #[must_use]
    pub fn from_frame(frame: Frame) -> Self {
        Self {
            frame: Arc::new(frame),
        }
    }
}

impl Source for ImageSource {
    fn next_frame(&mut self) -> Option<Arc<Frame>> {
        Some(Arc::clone(&self.frame))
    }

    fn native_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// Décode un fichier image en frame RGB 8 bits (alpha ignoré).
///
/// # Errors
/// Returns an error if the image cannot be loaded.
///
/// # Example
/// ```no_run
/// use gc_source::image::load_image;
/// let frame = load_image("test.png".as_ref()).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::from_rgb(width, height, rgb.into_raw())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_png_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 128]))
            .save(&path)
            .unwrap();

        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(frame.data.len(), 18);
        assert_eq!(frame.pixel(2, 1), (255, 0, 0));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ImageSource::new(Path::new("/nonexistent/nope.png")).is_err());
    }

    #[test]
    fn static_source_repeats_frame() {
        let mut src = ImageSource::from_frame(Frame::filled(4, 4, (1, 2, 3)));
        let a = src.next_frame().unwrap();
        let b = src.next_frame().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(src.native_size(), (4, 4));
        assert!(!src.is_live());
    }
}
