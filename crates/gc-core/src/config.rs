use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aspect::{clamp_height, clamp_width, height_for_width, width_for_height};
use crate::charset::CharacterSet;
use crate::error::CoreError;

/// Bornes du contraste manuel.
pub const CONTRAST_RANGE: (f32, f32) = (0.5, 3.0);
/// Bornes de la taille de police (pt) utilisée pour le raster.
pub const FONT_SIZE_RANGE: (u32, u32) = (6, 20);

/// Paramètres d'un rendu image → glyphes.
///
/// Valeur immuable du point de vue du pipeline : les changements passent par
/// [`apply_change`], qui retourne une nouvelle config.
///
/// # Example
/// ```
/// use gc_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!((config.grid_width, config.grid_height), (60, 34));
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    // === Grille ===
    /// Largeur en cellules [20, 120].
    pub grid_width: u32,
    /// Hauteur en cellules [10, 70].
    pub grid_height: u32,
    /// Maintenir hauteur = round(largeur × 0.55).
    pub aspect_lock: bool,

    // === Normalisation ===
    /// Gain autour de 128. 1.0 = neutre.
    pub contrast: f32,
    /// Étirement min-max ; prioritaire sur `contrast`.
    pub auto_contrast: bool,

    // === Glyphes & couleur ===
    /// Jeu de caractères actif.
    pub character_set: CharacterSet,
    /// Inversion globale (fond blanc).
    pub invert: bool,
    /// Couleur source, sinon niveaux de gris.
    pub use_color: bool,

    // === Affichage ===
    /// Taille de police en points, pilote la taille des cellules raster.
    pub font_size: u32,
    /// Cadence de la boucle de rendu.
    pub target_fps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            grid_width: 60,
            grid_height: 34,
            aspect_lock: false,
            contrast: 1.2,
            auto_contrast: false,
            character_set: CharacterSet::Detailed,
            invert: false,
            use_color: true,
            font_size: 10,
            target_fps: 30,
        }
    }
}

impl RenderConfig {
    /// Clamp all numeric fields to their valid ranges and re-apply the aspect
    /// lock. Called after TOML deserialization.
    pub fn clamp_all(&mut self) {
        self.grid_width = clamp_width(self.grid_width);
        self.grid_height = if self.aspect_lock {
            height_for_width(self.grid_width)
        } else {
            clamp_height(self.grid_height)
        };
        if !self.contrast.is_finite() {
            self.contrast = 1.0;
        }
        self.contrast = self.contrast.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1);
        self.font_size = self.font_size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
        self.target_fps = self.target_fps.clamp(1, 120);
    }

    /// Check the config can drive a render pass.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] for a zero-sized grid,
    /// [`CoreError::EmptyCharacterSet`] for an empty custom set.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        self.character_set.validate()
    }
}

/// Page formats for the PDF export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub enum PageFormat {
    /// 210 × 297 mm.
    #[default]
    A4,
    /// 297 × 420 mm.
    A3,
    /// 215.9 × 279.4 mm.
    Letter,
}

impl PageFormat {
    /// Portrait dimensions in millimeters.
    #[must_use]
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::Letter => (215.9, 279.4),
        }
    }
}

/// Réglages d'export (raster, PDF, dossier de sortie).
///
/// # Example
/// ```
/// use gc_core::config::ExportConfig;
/// let export = ExportConfig::default();
/// assert_eq!(export.scale, 1);
/// assert_eq!(export.jpeg_quality, 90);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ExportConfig {
    /// Facteur d'agrandissement entier du raster (≥ 1).
    pub scale: u32,
    /// Qualité JPEG [1, 100].
    pub jpeg_quality: u8,
    /// Police TrueType/OpenType pour le raster. Absente = police bitmap intégrée.
    pub font_path: Option<PathBuf>,
    /// Format de page PDF.
    pub page: PageFormat,
    /// Avance horizontale d'un glyphe PDF (mm).
    pub pitch_x_mm: f32,
    /// Interligne PDF (mm).
    pub pitch_y_mm: f32,
    /// Dossier des exports sans chemin explicite.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 1,
            jpeg_quality: 90,
            font_path: None,
            page: PageFormat::A4,
            pitch_x_mm: 1.6,
            pitch_y_mm: 2.8,
            output_dir: PathBuf::from("exports"),
        }
    }
}

impl ExportConfig {
    /// Clamp numeric fields to their valid ranges.
    pub fn clamp_all(&mut self) {
        self.scale = self.scale.clamp(1, 16);
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.pitch_x_mm = finite_or(self.pitch_x_mm, 1.6).clamp(0.5, 20.0);
        self.pitch_y_mm = finite_or(self.pitch_y_mm, 2.8).clamp(0.5, 20.0);
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

/// Configuration complète chargée depuis TOML.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Rendu.
    pub render: RenderConfig,
    /// Export.
    pub export: ExportConfig,
}

impl Config {
    /// Serialize back to TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Erreur de sérialisation TOML")
    }
}

/// One discrete configuration-change event `(field, value)`.
///
/// # Example
/// ```
/// use gc_core::config::ConfigChange;
/// let change = ConfigChange::parse("width", "100").unwrap();
/// assert_eq!(change, ConfigChange::Width(100));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigChange {
    /// Grid width.
    Width(u32),
    /// Grid height.
    Height(u32),
    /// Manual contrast gain.
    Contrast(f32),
    /// Auto-contrast toggle.
    AutoContrast(bool),
    /// Active character set.
    CharacterSet(CharacterSet),
    /// Global invert.
    Invert(bool),
    /// Color / grayscale.
    UseColor(bool),
    /// Aspect lock.
    AspectLock(bool),
    /// Raster font size.
    FontSize(u32),
}

impl ConfigChange {
    /// Field names accepted by [`ConfigChange::parse`].
    pub const FIELDS: &'static [&'static str] = &[
        "width",
        "height",
        "contrast",
        "auto_contrast",
        "char_set",
        "invert",
        "use_color",
        "aspect_lock",
        "font_size",
    ];

    /// Parse a `(field, value)` event from a control surface.
    ///
    /// # Errors
    /// [`CoreError::UnknownField`] for an unknown field,
    /// [`CoreError::InvalidValue`] when the value does not parse, and the
    /// character-set errors of [`CharacterSet::from_name`].
    pub fn parse(field: &str, value: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };
        let raw = value.trim();
        let int = || -> Result<u32, CoreError> {
            raw.parse::<i64>()
                .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
                .map_err(|_| invalid())
        };
        let flag = || -> Result<bool, CoreError> {
            match raw.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" | "yes" => Ok(true),
                "false" | "off" | "0" | "no" => Ok(false),
                _ => Err(invalid()),
            }
        };

        match field {
            "width" | "grid_width" => Ok(Self::Width(int()?)),
            "height" | "grid_height" => Ok(Self::Height(int()?)),
            "contrast" => {
                let v: f32 = raw.parse().map_err(|_| invalid())?;
                if !v.is_finite() {
                    return Err(invalid());
                }
                Ok(Self::Contrast(v))
            }
            "auto_contrast" => Ok(Self::AutoContrast(flag()?)),
            // les glyphes custom peuvent commencer par un espace : pas de trim
            "char_set" | "character_set" => {
                Ok(Self::CharacterSet(CharacterSet::from_name(value)?))
            }
            "invert" => Ok(Self::Invert(flag()?)),
            "use_color" | "color" => Ok(Self::UseColor(flag()?)),
            "aspect_lock" => Ok(Self::AspectLock(flag()?)),
            "font_size" => Ok(Self::FontSize(int()?)),
            _ => Err(CoreError::UnknownField(field.to_string())),
        }
    }
}

/// Apply one change and return the resulting config. `config` is untouched.
///
/// Every derived field (the locked height or width) is recomputed here, in
/// the same call, with the rules of [`crate::aspect`].
///
/// # Errors
/// [`CoreError::EmptyCharacterSet`] for an empty custom set,
/// [`CoreError::InvalidValue`] for a non-finite contrast.
///
/// # Example
/// ```
/// use gc_core::config::{apply_change, ConfigChange, RenderConfig};
/// let locked = RenderConfig { aspect_lock: true, ..RenderConfig::default() };
/// let next = apply_change(&locked, ConfigChange::Width(100)).unwrap();
/// assert_eq!((next.grid_width, next.grid_height), (100, 55));
/// ```
pub fn apply_change(config: &RenderConfig, change: ConfigChange) -> Result<RenderConfig, CoreError> {
    let mut next = config.clone();
    match change {
        ConfigChange::Width(w) => {
            next.grid_width = clamp_width(w);
            if next.aspect_lock {
                next.grid_height = height_for_width(next.grid_width);
            }
        }
        ConfigChange::Height(h) => {
            next.grid_height = clamp_height(h);
            if next.aspect_lock {
                next.grid_width = width_for_height(next.grid_height);
            }
        }
        ConfigChange::AspectLock(locked) => {
            next.aspect_lock = locked;
            if locked {
                next.grid_height = height_for_width(next.grid_width);
            }
        }
        ConfigChange::Contrast(c) => {
            if !c.is_finite() {
                return Err(CoreError::InvalidValue {
                    field: "contrast".into(),
                    value: c.to_string(),
                });
            }
            next.contrast = c.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1);
        }
        ConfigChange::AutoContrast(v) => next.auto_contrast = v,
        ConfigChange::CharacterSet(set) => {
            set.validate()?;
            next.character_set = set;
        }
        ConfigChange::Invert(v) => next.invert = v,
        ConfigChange::UseColor(v) => next.use_color = v,
        ConfigChange::FontSize(s) => {
            next.font_size = s.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
        }
    }
    Ok(next)
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    export: Option<ExportSection>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    grid_width: Option<u32>,
    grid_height: Option<u32>,
    aspect_lock: Option<bool>,
    contrast: Option<f32>,
    auto_contrast: Option<bool>,
    character_set: Option<CharacterSet>,
    invert: Option<bool>,
    use_color: Option<bool>,
    font_size: Option<u32>,
    target_fps: Option<u32>,
}

/// Export section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct ExportSection {
    scale: Option<u32>,
    jpeg_quality: Option<u8>,
    font_path: Option<PathBuf>,
    page: Option<PageFormat>,
    pitch_x_mm: Option<f32>,
    pitch_y_mm: Option<f32>,
    output_dir: Option<PathBuf>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if it names an
/// empty custom character set.
///
/// # Example
/// ```no_run
/// use gc_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide dans {}", path.display()))
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error on a TOML syntax error or an empty custom character set.
///
/// # Example
/// ```
/// use gc_core::config::parse_config;
/// let config = parse_config("[render]\ngrid_width = 80\n").unwrap();
/// assert_eq!(config.render.grid_width, 80);
/// assert_eq!(config.render.grid_height, 34);
/// ```
pub fn parse_config(content: &str) -> Result<Config> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = Config::default();

    if let Some(r) = file.render {
        let render = &mut config.render;
        if let Some(v) = r.grid_width {
            render.grid_width = v;
        }
        if let Some(v) = r.grid_height {
            render.grid_height = v;
        }
        if let Some(v) = r.aspect_lock {
            render.aspect_lock = v;
        }
        if let Some(v) = r.contrast {
            render.contrast = v;
        }
        if let Some(v) = r.auto_contrast {
            render.auto_contrast = v;
        }
        if let Some(v) = r.character_set {
            render.character_set = v;
        }
        if let Some(v) = r.invert {
            render.invert = v;
        }
        if let Some(v) = r.use_color {
            render.use_color = v;
        }
        if let Some(v) = r.font_size {
            render.font_size = v;
        }
        if let Some(v) = r.target_fps {
            render.target_fps = v;
        }
    }

    if let Some(e) = file.export {
        let export = &mut config.export;
        if let Some(v) = e.scale {
            export.scale = v;
        }
        if let Some(v) = e.jpeg_quality {
            export.jpeg_quality = v;
        }
        if e.font_path.is_some() {
            export.font_path = e.font_path;
        }
        if let Some(v) = e.page {
            export.page = v;
        }
        if let Some(v) = e.pitch_x_mm {
            export.pitch_x_mm = v;
        }
        if let Some(v) = e.pitch_y_mm {
            export.pitch_y_mm = v;
        }
        if let Some(v) = e.output_dir {
            export.output_dir = v;
        }
    }

    config.render.character_set.validate()?;
    config.render.clamp_all();
    config.export.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_change_never_mutates_input() {
        let config = RenderConfig::default();
        let next = apply_change(&config, ConfigChange::Invert(true)).unwrap();
        assert!(!config.invert);
        assert!(next.invert);
    }

    #[test]
    fn locked_height_change_derives_width() {
        let config = RenderConfig {
            aspect_lock: true,
            ..RenderConfig::default()
        };
        let next = apply_change(&config, ConfigChange::Height(55)).unwrap();
        assert_eq!((next.grid_width, next.grid_height), (100, 55));
    }

    #[test]
    fn unlocked_width_change_keeps_height() {
        let config = RenderConfig::default();
        let next = apply_change(&config, ConfigChange::Width(100)).unwrap();
        assert_eq!((next.grid_width, next.grid_height), (100, 34));
    }

    #[test]
    fn enabling_lock_rederives_height() {
        let config = RenderConfig::default();
        let next = apply_change(&config, ConfigChange::AspectLock(true)).unwrap();
        assert_eq!(next.grid_height, 33);
    }

    #[test]
    fn empty_custom_set_is_rejected() {
        let config = RenderConfig::default();
        let err = apply_change(
            &config,
            ConfigChange::CharacterSet(CharacterSet::Custom(String::new())),
        );
        assert_eq!(err, Err(CoreError::EmptyCharacterSet));
    }

    #[test]
    fn contrast_is_clamped() {
        let config = RenderConfig::default();
        let next = apply_change(&config, ConfigChange::Contrast(9.0)).unwrap();
        assert!((next.contrast - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn parse_rejects_unknown_field_and_bad_values() {
        assert_eq!(
            ConfigChange::parse("zoom", "2"),
            Err(CoreError::UnknownField("zoom".into()))
        );
        assert!(matches!(
            ConfigChange::parse("invert", "maybe"),
            Err(CoreError::InvalidValue { .. })
        ));
        assert!(matches!(
            ConfigChange::parse("contrast", "NaN"),
            Err(CoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn parse_negative_width_clamps_later() {
        let change = ConfigChange::parse("width", "-4").unwrap();
        let next = apply_change(&RenderConfig::default(), change).unwrap();
        assert_eq!(next.grid_width, 20);
    }

    #[test]
    fn parse_keeps_custom_leading_space() {
        let change = ConfigChange::parse("char_set", "custom: .#").unwrap();
        assert_eq!(
            change,
            ConfigChange::CharacterSet(CharacterSet::Custom(" .#".into()))
        );
    }

    #[test]
    fn toml_merge_and_clamp() {
        let config = parse_config(
            "[render]\ngrid_width = 500\naspect_lock = true\ncharacter_set = \"Dot\"\n\n[export]\nscale = 0\npage = \"Letter\"\n",
        )
        .unwrap();
        assert_eq!(config.render.grid_width, 120);
        assert_eq!(config.render.grid_height, 66);
        assert_eq!(config.render.character_set, CharacterSet::Dot);
        assert_eq!(config.export.scale, 1);
        assert_eq!(config.export.page, PageFormat::Letter);
    }

    #[test]
    fn toml_empty_custom_set_fails() {
        let result = parse_config("[render]\ncharacter_set = { Custom = \"\" }\n");
        assert!(result.is_err());
    }

    #[test]
    fn toml_round_trip_through_serializer() {
        let mut config = Config::default();
        config.render.character_set = CharacterSet::Custom(" .oO@".into());
        config.render.invert = true;
        let text = config.to_toml().unwrap();
        let back = parse_config(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glyphcam.toml");
        std::fs::write(&path, "[render]\ncontrast = 2.0\nauto_contrast = true\n").unwrap();
        let config = load_config(&path).unwrap();
        assert!(config.render.auto_contrast);
        assert!((config.render.contrast - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shipped_default_matches_builtin_defaults() {
        let shipped = include_str!("../../../config/default.toml");
        assert_eq!(parse_config(shipped).unwrap(), Config::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/glyphcam.toml")).is_err());
    }
}
