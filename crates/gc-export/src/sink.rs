use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gc_core::traits::Sink;

/// Préfixe des noms de fichiers générés.
const FILE_PREFIX: &str = "glyphcam";

/// Écrit les exports sur disque, dossiers parents créés au besoin.
///
/// # Example
/// ```
/// use gc_core::traits::Sink;
/// use gc_export::sink::FileSink;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("a/b/frame.txt");
/// FileSink::default().persist(&path, b"ab\ncd").unwrap();
/// assert_eq!(std::fs::read(&path).unwrap(), b"ab\ncd");
/// ```
#[derive(Debug, Default)]
pub struct FileSink {
    written: usize,
}

impl FileSink {
    /// Nombre de fichiers écrits par ce sink.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }
}

impl Sink for FileSink {
    fn persist(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Création du dossier {}", parent.display()))?;
        }
        fs::write(path, bytes).with_context(|| format!("Écriture de {}", path.display()))?;
        self.written += 1;
        log::info!("Export : {} ({} octets)", path.display(), bytes.len());
        Ok(())
    }
}

/// Chemin horodaté `dir/glyphcam_YYYYmmdd_HHMMSS_mmm.ext`.
///
/// Un fichier déjà présent au même nom reçoit un suffixe `_1`, `_2`, …
///
/// # Example
/// ```
/// use gc_export::sink::default_export_path;
/// let path = default_export_path("exports".as_ref(), "png");
/// assert_eq!(path.extension().unwrap(), "png");
/// assert!(path.file_name().unwrap().to_str().unwrap().starts_with("glyphcam_"));
/// ```
#[must_use]
pub fn default_export_path(dir: &Path, extension: &str) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    first_free(dir, &format!("{FILE_PREFIX}_{stamp}"), extension)
}

fn first_free(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.{extension}"));
    let mut n = 1u32;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.{extension}"));
        n += 1;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::default();
        sink.persist(&dir.path().join("one.bin"), &[1]).unwrap();
        sink.persist(&dir.path().join("deep/two.bin"), &[2]).unwrap();
        assert_eq!(sink.written(), 2);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let mut sink = FileSink::default();
        // un fichier ne peut pas servir de dossier parent
        assert!(sink.persist(&blocker.join("child.txt"), b"y").is_err());
        assert_eq!(sink.written(), 0);
    }

    #[test]
    fn relative_file_name_without_parent() {
        let path = default_export_path(Path::new(""), "txt");
        assert_eq!(path.parent(), Some(Path::new("")));
    }

    #[test]
    fn taken_names_get_a_counter() {
        let dir = tempfile::tempdir().unwrap();
        let first = first_free(dir.path(), "glyphcam_20260101_120000_000", "png");
        assert_eq!(first, dir.path().join("glyphcam_20260101_120000_000.png"));
        fs::write(&first, b"x").unwrap();

        let second = first_free(dir.path(), "glyphcam_20260101_120000_000", "png");
        assert_eq!(second, dir.path().join("glyphcam_20260101_120000_000_1.png"));
        fs::write(&second, b"x").unwrap();

        let third = first_free(dir.path(), "glyphcam_20260101_120000_000", "png");
        assert_eq!(third, dir.path().join("glyphcam_20260101_120000_000_2.png"));
    }

    #[test]
    fn back_to_back_exports_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::default();
        let a = default_export_path(dir.path(), "txt");
        sink.persist(&a, b"a").unwrap();
        let b = default_export_path(dir.path(), "txt");
        assert_ne!(a, b);
    }
}
