use std::io::{Write, stdout};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use clap::Parser;
use gc_app::cli::Cli;
use gc_app::export::{ExportKind, ExportRequest, Exporter};
use gc_app::live::{LiveOptions, run_live};
use gc_app::paint::paint_grid;
use gc_app::session::Session;
use gc_app::hotreload;
use gc_core::config::{Config, load_config};
use gc_core::traits::Source;
use gc_export::sink::FileSink;
use gc_source::folder::FolderSource;
use gc_source::image::ImageSource;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_source()?;

    // 4. Charger la config + overrides CLI
    let config = resolve_config(&cli)?;
    let changes = cli.config_changes()?;
    let config = Arc::new(ArcSwap::from_pointee(config));

    let mut session = Session::new(&config.load(), changes)?;

    // 5. Hot reload (le watcher doit vivre jusqu'à la fin)
    let _watcher = if cli.watch {
        match hotreload::spawn_config_watcher(&cli.config, &config) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Hot reload indisponible : {e}");
                None
            }
        }
    } else {
        None
    };

    // 6. Ctrl-C : arrêt propre de la boucle live
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::Relaxed))
            .context("Impossible d'installer le handler Ctrl-C")?;
    }

    // 7. Source
    let mut source = open_source(&cli)?;
    let mut exporter = Exporter::new(
        session.export_config().clone(),
        session.render_config().font_size,
        FileSink::default(),
    );
    let requests = export_requests(&cli);

    // 8. Live ou rendu unique
    if cli.live || source.is_live() || cli.folder.is_some() {
        let options = LiveOptions {
            max_frames: cli.frames,
            running,
        };
        run_live(&mut session, source.as_mut(), &mut exporter, &config, &options)?;
    } else {
        session
            .tick(source.as_mut())
            .context("Rendu de l'image impossible")?;
    }

    let Some(grid) = session.grid() else {
        log::warn!("Aucune frame rendue");
        return Ok(());
    };

    // 9. Sorties
    if cli.print_text {
        let mut out = stdout().lock();
        gc_export::text::write_text(&mut out, grid)?;
    } else if requests.is_empty() && !cli.live && !source.is_live() && cli.folder.is_none() {
        let mut out = stdout().lock();
        paint_grid(&mut out, grid, None)?;
        writeln!(out)?;
    }

    let failures = exporter.export_all(grid, &requests);
    if failures > 0 {
        anyhow::bail!("{failures} export(s) en échec");
    }
    Ok(())
}

/// Config du fichier si présent, sinon défauts ; options CLI d'export par-dessus.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Config::default()
    };

    if let Some(fps) = cli.fps {
        config.render.target_fps = fps;
    }
    let export = &mut config.export;
    if let Some(scale) = cli.scale {
        export.scale = scale;
    }
    if let Some(quality) = cli.quality {
        export.jpeg_quality = quality;
    }
    if let Some(page) = cli.page_format()? {
        export.page = page;
    }
    if let Some(font) = &cli.font {
        export.font_path = Some(font.clone());
    }
    if let Some(dir) = &cli.out_dir {
        export.output_dir = dir.clone();
    }
    config.render.clamp_all();
    config.export.clamp_all();
    Ok(config)
}

fn open_source(cli: &Cli) -> Result<Box<dyn Source>> {
    if let Some(path) = &cli.image {
        return Ok(Box::new(ImageSource::new(path)?));
    }
    if let Some(dir) = &cli.folder {
        return Ok(Box::new(FolderSource::new(dir, cli.hold)?));
    }
    open_camera(cli)
}

#[cfg(feature = "camera")]
fn open_camera(cli: &Cli) -> Result<Box<dyn Source>> {
    use gc_source::camera::{CameraConfig, CameraSource};

    let mut cfg = CameraConfig::default();
    if let Some(device) = &cli.device {
        cfg.device.clone_from(device);
    }
    if let Some(fps) = cli.fps {
        cfg.fps = fps;
    }
    Ok(Box::new(CameraSource::open(&cfg)?))
}

#[cfg(not(feature = "camera"))]
fn open_camera(_cli: &Cli) -> Result<Box<dyn Source>> {
    anyhow::bail!("Caméra non disponible : recompiler avec --features camera")
}

fn export_requests(cli: &Cli) -> Vec<ExportRequest> {
    [
        (ExportKind::Text, &cli.text_out),
        (ExportKind::Png, &cli.png_out),
        (ExportKind::Jpeg, &cli.jpeg_out),
        (ExportKind::Bmp, &cli.bmp_out),
        (ExportKind::Pdf, &cli.pdf_out),
    ]
    .into_iter()
    .filter_map(|(kind, opt)| {
        opt.as_ref().map(|path| ExportRequest {
            kind,
            path: path.as_deref().map(Path::to_path_buf),
        })
    })
    .collect()
}
