use std::path::PathBuf;

use anyhow::{Context, Result};
use gc_core::config::ExportConfig;
use gc_core::frame::Grid;
use gc_core::traits::Sink;
use gc_export::glyphs::GlyphAtlas;
use gc_export::raster::{RasterCodec, RasterEncoder};
use gc_export::sink::default_export_path;
use gc_export::vector::{GlyphPitch, PageSize, to_vector_document};

/// Formats d'export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Text,
    Png,
    Jpeg,
    Bmp,
    Pdf,
}

impl ExportKind {
    /// Extension des fichiers générés.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Pdf => "pdf",
        }
    }
}

/// Un export demandé ; `path` absent = nom horodaté dans `output_dir`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRequest {
    pub kind: ExportKind,
    pub path: Option<PathBuf>,
}

/// Encode une grille dans le format demandé et la confie au sink.
pub struct Exporter<S: Sink> {
    config: ExportConfig,
    raster: RasterEncoder,
    font_size: u32,
    sink: S,
}

impl<S: Sink> Exporter<S> {
    /// L'atlas raster suit `font_size` et `config.font_path`.
    #[must_use]
    pub fn new(config: ExportConfig, font_size: u32, sink: S) -> Self {
        let atlas = GlyphAtlas::load(config.font_path.as_deref(), font_size);
        Self {
            config,
            raster: RasterEncoder::new(atlas),
            font_size,
            sink,
        }
    }

    /// Met à jour les réglages ; l'atlas n'est rechargé que si la police change.
    pub fn update(&mut self, config: &ExportConfig, font_size: u32) {
        if config.font_path != self.config.font_path || font_size != self.font_size {
            self.raster = RasterEncoder::new(GlyphAtlas::load(config.font_path.as_deref(), font_size));
            self.font_size = font_size;
        }
        self.config = config.clone();
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Encode `grid` en octets.
    ///
    /// # Errors
    /// Encoder errors, with the format in context.
    pub fn encode(&self, grid: &Grid, kind: ExportKind) -> Result<Vec<u8>> {
        let scale = self.config.scale;
        let bytes = match kind {
            ExportKind::Text => grid.to_text().into_bytes(),
            ExportKind::Png | ExportKind::Jpeg | ExportKind::Bmp => {
                let codec = RasterCodec::from_name(kind.extension(), self.config.jpeg_quality)?;
                self.raster.encode(grid, scale, codec)?
            }
            ExportKind::Pdf => to_vector_document(
                grid,
                PageSize::from(self.config.page),
                GlyphPitch {
                    x_mm: self.config.pitch_x_mm,
                    y_mm: self.config.pitch_y_mm,
                },
            )?,
        };
        Ok(bytes)
    }

    /// Chemin final d'une requête.
    #[must_use]
    pub fn resolve_path(&self, request: &ExportRequest) -> PathBuf {
        request.path.clone().unwrap_or_else(|| {
            default_export_path(&self.config.output_dir, request.kind.extension())
        })
    }

    /// Encode puis persiste. Retourne le chemin écrit.
    ///
    /// # Errors
    /// Encoding or write failures; nothing is written on an encoding error.
    pub fn export(&mut self, grid: &Grid, request: &ExportRequest) -> Result<PathBuf> {
        let bytes = self
            .encode(grid, request.kind)
            .with_context(|| format!("Export {} échoué", request.kind.extension()))?;
        let path = self.resolve_path(request);
        self.sink.persist(&path, &bytes)?;
        Ok(path)
    }

    /// Exécute toutes les requêtes ; un échec n'empêche pas les suivantes.
    ///
    /// Retourne le nombre d'échecs.
    pub fn export_all(&mut self, grid: &Grid, requests: &[ExportRequest]) -> usize {
        let mut failures = 0;
        for request in requests {
            match self.export(grid, request) {
                Ok(path) => {
                    println!("{} → {}", request.kind.extension().to_uppercase(), path.display());
                }
                Err(e) => {
                    log::error!("{e:#}");
                    eprintln!("Erreur : {e:#}");
                    failures += 1;
                }
            }
        }
        failures
    }
}
