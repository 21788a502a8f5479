use thiserror::Error;

/// Errors originating from the core module.
///
/// Every variant is recoverable: the caller reports it and keeps the previous
/// grid on screen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Invalid width/height dimensions (zero target grid or empty frame).
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// A character set with no glyphs was supplied.
    #[error("Jeu de caractères vide")]
    EmptyCharacterSet,

    /// Named character set does not exist.
    #[error("Jeu de caractères inconnu : {0}")]
    UnknownCharacterSet(String),

    /// The frame source had nothing to deliver; the render pass is skipped.
    #[error("Aucune frame disponible")]
    FrameUnavailable,

    /// A configuration-change event named a field that does not exist.
    #[error("Champ inconnu : {0}")]
    UnknownField(String),

    /// A configuration-change event carried a value that could not be parsed.
    #[error("Valeur invalide pour {field} : {value}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Raw value received.
        value: String,
    },
}
