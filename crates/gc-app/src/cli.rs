use std::path::PathBuf;

use clap::Parser;
use gc_core::config::{ConfigChange, PageFormat};
use gc_core::error::CoreError;

/// glyphcam — rendu caméra/image en grille de glyphes, export texte, image et PDF.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source : image fixe (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Source : dossier d'images, parcourues en boucle.
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// Ticks d'affichage par image en mode dossier.
    #[arg(long, default_value_t = 30)]
    pub hold: u32,

    /// Source : caméra live via ffmpeg. Requiert --features camera.
    #[arg(long, default_value_t = false)]
    pub camera: bool,

    /// Périphérique caméra passé à ffmpeg (défaut selon la plateforme).
    #[arg(long)]
    pub device: Option<String>,

    /// Fichier de configuration TOML.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Changement de config `champ=valeur` (répétable), ex. `--set width=100`.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Surveiller le fichier config et le recharger à chaud.
    #[arg(long, default_value_t = false)]
    pub watch: bool,

    /// Boucle live dans le terminal, même pour une image fixe.
    #[arg(long, default_value_t = false)]
    pub live: bool,

    /// Arrêter la boucle live après N frames rendues.
    #[arg(long)]
    pub frames: Option<u64>,

    /// FPS cible de la boucle live.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Désactiver la couleur.
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Écrire le texte de la dernière grille sur stdout.
    #[arg(long, default_value_t = false)]
    pub print_text: bool,

    /// Export texte. Sans chemin : nom horodaté dans le dossier d'export.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub text_out: Option<Option<PathBuf>>,

    /// Export PNG.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub png_out: Option<Option<PathBuf>>,

    /// Export JPEG.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub jpeg_out: Option<Option<PathBuf>>,

    /// Export BMP.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub bmp_out: Option<Option<PathBuf>>,

    /// Export PDF.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub pdf_out: Option<Option<PathBuf>>,

    /// Facteur d'échelle entier du raster.
    #[arg(long)]
    pub scale: Option<u32>,

    /// Qualité JPEG (1-100).
    #[arg(long)]
    pub quality: Option<u8>,

    /// Format de page PDF : a4, a3, letter.
    #[arg(long)]
    pub page: Option<String>,

    /// Police TTF/OTF pour le raster.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Dossier des exports sans chemin explicite.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one visual source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or more than one source is specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        let count = usize::from(self.image.is_some())
            + usize::from(self.folder.is_some())
            + usize::from(self.camera);

        if count == 0 {
            anyhow::bail!("Aucune source spécifiée. Utilisez --image, --folder ou --camera.");
        }
        if count > 1 {
            anyhow::bail!("Une seule source à la fois : --image, --folder OU --camera.");
        }
        Ok(())
    }

    /// `--set` et `--no-color` traduits en changements de config, dans l'ordre.
    ///
    /// # Errors
    /// [`CoreError::InvalidValue`] for a malformed `FIELD=VALUE` and the
    /// errors of [`ConfigChange::parse`].
    pub fn config_changes(&self) -> Result<Vec<ConfigChange>, CoreError> {
        let mut changes = self
            .set
            .iter()
            .map(|raw| {
                let (field, value) = raw.split_once('=').ok_or_else(|| CoreError::InvalidValue {
                    field: raw.clone(),
                    value: String::new(),
                })?;
                ConfigChange::parse(field.trim(), value)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if self.no_color {
            changes.push(ConfigChange::UseColor(false));
        }
        Ok(changes)
    }

    /// Format de page demandé, s'il y en a un.
    ///
    /// # Errors
    /// [`CoreError::InvalidValue`] for an unknown format name.
    pub fn page_format(&self) -> Result<Option<PageFormat>, CoreError> {
        self.page
            .as_deref()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "a4" => Ok(PageFormat::A4),
                "a3" => Ok(PageFormat::A3),
                "letter" => Ok(PageFormat::Letter),
                _ => Err(CoreError::InvalidValue {
                    field: "page".into(),
                    value: name.to_string(),
                }),
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("glyphcam").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn exactly_one_source() {
        assert!(parse(&["--image", "a.png"]).validate_source().is_ok());
        assert!(parse(&[]).validate_source().is_err());
        assert!(parse(&["--image", "a.png", "--camera"]).validate_source().is_err());
    }

    #[test]
    fn set_flags_become_changes() {
        let cli = parse(&["--image", "a.png", "--set", "width=100", "--set", "invert=on", "--no-color"]);
        assert_eq!(
            cli.config_changes().unwrap(),
            vec![
                ConfigChange::Width(100),
                ConfigChange::Invert(true),
                ConfigChange::UseColor(false),
            ]
        );
    }

    #[test]
    fn malformed_set_rejected() {
        let cli = parse(&["--image", "a.png", "--set", "width"]);
        assert!(cli.config_changes().is_err());
        let cli = parse(&["--image", "a.png", "--set", "zoom=2"]);
        assert_eq!(
            cli.config_changes().unwrap_err(),
            CoreError::UnknownField("zoom".into())
        );
    }

    #[test]
    fn export_path_is_optional() {
        let cli = parse(&["--image", "a.png", "--png-out", "--pdf-out", "out.pdf"]);
        assert_eq!(cli.png_out, Some(None));
        assert_eq!(cli.pdf_out, Some(Some(PathBuf::from("out.pdf"))));
        assert_eq!(cli.text_out, None);
    }

    #[test]
    fn page_names() {
        assert_eq!(parse(&["--page", "A3"]).page_format().unwrap(), Some(PageFormat::A3));
        assert!(parse(&["--page", "tabloid"]).page_format().is_err());
        assert_eq!(parse(&[]).page_format().unwrap(), None);
    }
}
