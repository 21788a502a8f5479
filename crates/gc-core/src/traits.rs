use std::path::Path;
use std::sync::Arc;

use crate::frame::Frame;

/// Fournit des frames au pipeline, à la demande.
///
/// Implémenté par : `ImageSource`, `FolderSource`, `CameraSource`.
///
/// # Example
/// ```
/// use gc_core::traits::Source;
/// use gc_core::frame::Frame;
/// use std::sync::Arc;
///
/// struct DummySource;
/// impl Source for DummySource {
///     fn next_frame(&mut self) -> Option<Arc<Frame>> { None }
///     fn native_size(&self) -> (u32, u32) { (0, 0) }
///     fn is_live(&self) -> bool { false }
/// }
/// ```
pub trait Source: Send + 'static {
    /// Retourne la frame la plus récente.
    ///
    /// `None` = aucune frame disponible ; le rendu de ce tick est sauté.
    /// Ne bloque JAMAIS.
    fn next_frame(&mut self) -> Option<Arc<Frame>>;

    /// Dimensions natives de la source (avant resize).
    fn native_size(&self) -> (u32, u32);

    /// Indique si la source est infinie (caméra) ou finie (fichier).
    fn is_live(&self) -> bool;
}

/// Persiste des octets encodés vers une destination.
///
/// # Example
/// ```
/// use gc_core::traits::Sink;
/// use std::path::Path;
///
/// struct NullSink;
/// impl Sink for NullSink {
///     fn persist(&mut self, _path: &Path, _bytes: &[u8]) -> anyhow::Result<()> { Ok(()) }
/// }
/// ```
pub trait Sink {
    /// Écrit `bytes` à `path`.
    ///
    /// # Errors
    /// Returns an error if the destination cannot be written.
    fn persist(&mut self, path: &Path, bytes: &[u8]) -> anyhow::Result<()>;
}
