use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use gc_core::frame::Frame;
use gc_core::traits::Source;

use crate::image::load_image;

/// Extensions image reconnues.
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Source qui fait défiler les images d'un dossier, en boucle.
///
/// Chaque image est tenue `hold_frames` appels à `next_frame` avant de
/// passer à la suivante.
pub struct FolderSource {
    files: Vec<PathBuf>,
    current_idx: usize,
    current_image: Option<Arc<Frame>>,
    hold_frames: u32,
    served: u32,
}

impl FolderSource {
    /// Crée une source explorant `folder_path` (récursif, trié).
    ///
    /// # Errors
    /// Retourne une erreur si le dossier ne peut être lu ou ne contient
    /// aucune image.
    pub fn new(folder_path: &Path, hold_frames: u32) -> Result<Self> {
        let mut files = Vec::new();
        scan_dir(folder_path, &mut files)
            .with_context(|| format!("Lecture du dossier {}", folder_path.display()))?;
        if files.is_empty() {
            bail!("Aucune image dans {}", folder_path.display());
        }
        files.sort();
        log::info!("FolderSource: {} images dans {}", files.len(), folder_path.display());

        let mut source = Self {
            files,
            current_idx: 0,
            current_image: None,
            hold_frames: hold_frames.max(1),
            served: 0,
        };
        source.load_current();
        Ok(source)
    }

    /// Nombre d'images trouvées.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Toujours faux après une construction réussie.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Avance à l'image suivante du dossier.
    pub fn next_media(&mut self) {
        self.current_idx = (self.current_idx + 1) % self.files.len();
        self.served = 0;
        self.load_current();
    }

    fn load_current(&mut self) {
        let path = &self.files[self.current_idx];
        match load_image(path) {
            Ok(frame) => self.current_image = Some(Arc::new(frame)),
            Err(e) => {
                log::warn!("FolderSource: {e:#}");
                self.current_image = None;
            }
        }
    }
}

fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_dir(&path, files)?;
        } else if path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_lowercase().as_str()))
        {
            files.push(path);
        }
    }
    Ok(())
}

impl Source for FolderSource {
    fn next_frame(&mut self) -> Option<Arc<Frame>> {
        if self.served >= self.hold_frames {
            self.next_media();
        }
        self.served += 1;
        self.current_image.as_ref().map(Arc::clone)
    }

    fn native_size(&self) -> (u32, u32) {
        self.current_image
            .as_ref()
            .map_or((0, 0), |img| (img.width, img.height))
    }

    fn is_live(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, w: u32) {
        image::RgbImage::from_pixel(w, 2, image::Rgb([9, 9, 9]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn cycles_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", 2);
        write_png(dir.path(), "a.png", 1);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut src = FolderSource::new(dir.path(), 1).unwrap();
        assert_eq!(src.len(), 2);
        let widths: Vec<u32> = (0..4).map(|_| src.next_frame().unwrap().width).collect();
        assert_eq!(widths, [1, 2, 1, 2]);
    }

    #[test]
    fn holds_each_image() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 1);
        write_png(dir.path(), "b.png", 2);

        let mut src = FolderSource::new(dir.path(), 3).unwrap();
        let widths: Vec<u32> = (0..4).map(|_| src.next_frame().unwrap().width).collect();
        assert_eq!(widths, [1, 1, 1, 2]);
    }

    #[test]
    fn broken_file_yields_no_frame() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let mut src = FolderSource::new(dir.path(), 1).unwrap();
        assert!(src.next_frame().is_none());
        assert_eq!(src.native_size(), (0, 0));
    }

    #[test]
    fn empty_folder_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FolderSource::new(dir.path(), 1).is_err());
    }
}
