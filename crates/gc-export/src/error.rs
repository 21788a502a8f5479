use thiserror::Error;

/// Erreurs des encodeurs de sortie (raster, PDF).
///
/// Toujours récupérables : un encodage raté ne touche ni la grille ni la
/// boucle de rendu.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Codec inconnu (ex. `tiff`).
    #[error("Codec non supporté : {0}")]
    UnsupportedCodec(String),

    /// Canvas de surface nulle (grille vide ou échelle 0).
    #[error("Canvas vide : {width}x{height}")]
    EmptyCanvas { width: u64, height: u64 },

    /// Backend absent de ce build.
    #[error("Backend {0} indisponible (feature désactivée)")]
    BackendUnavailable(&'static str),

    /// Glyphe non représentable dans la police du document.
    #[error("Glyphe {0:?} non représentable")]
    UnsupportedGlyph(char),

    /// Police illisible.
    #[error("Police invalide : {0}")]
    Font(String),

    #[error("Encodage image : {0}")]
    Image(#[from] image::ImageError),

    #[error("Écriture PDF : {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
