use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use arc_swap::ArcSwap;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use gc_core::charset::CharacterSet;
use gc_core::config::{Config, ConfigChange, RenderConfig};
use gc_core::error::CoreError;
use gc_core::traits::{Sink, Source};
use ratatui::DefaultTerminal;

use crate::export::{ExportKind, ExportRequest, Exporter};
use crate::fps::FpsCounter;
use crate::canvas;
use crate::paint::Status;
use crate::session::Session;

/// Intervalle entre deux lignes d'état dans le log.
const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(2);

/// Pas des touches largeur / contraste.
const WIDTH_STEP: u32 = 4;
const CONTRAST_STEP: f32 = 0.1;

/// Action déclenchée par une touche.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Change(ConfigChange),
    Export(ExportKind),
    Quit,
}

/// Traduit une touche en action, selon la config courante.
///
/// # Example
/// ```
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
/// use gc_app::live::{action_for_key, Action};
/// use gc_core::config::{ConfigChange, RenderConfig};
///
/// let key = KeyEvent::new(KeyCode::Char('i'), KeyModifiers::NONE);
/// assert_eq!(
///     action_for_key(&key, &RenderConfig::default()),
///     Some(Action::Change(ConfigChange::Invert(true)))
/// );
/// ```
#[must_use]
pub fn action_for_key(key: &KeyEvent, config: &RenderConfig) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('p') if ctrl => Action::Export(ExportKind::Png),
        KeyCode::Char('t') if ctrl => Action::Export(ExportKind::Text),
        KeyCode::Char('d') if ctrl => Action::Export(ExportKind::Pdf),
        KeyCode::Char('+' | '=') => {
            Action::Change(ConfigChange::Width(config.grid_width.saturating_add(WIDTH_STEP)))
        }
        KeyCode::Char('-') => {
            Action::Change(ConfigChange::Width(config.grid_width.saturating_sub(WIDTH_STEP)))
        }
        KeyCode::Up => Action::Change(ConfigChange::Height(config.grid_height.saturating_add(1))),
        KeyCode::Down => Action::Change(ConfigChange::Height(config.grid_height.saturating_sub(1))),
        KeyCode::Char(']') => Action::Change(ConfigChange::Contrast(config.contrast + CONTRAST_STEP)),
        KeyCode::Char('[') => Action::Change(ConfigChange::Contrast(config.contrast - CONTRAST_STEP)),
        KeyCode::Char('a') => Action::Change(ConfigChange::AutoContrast(!config.auto_contrast)),
        KeyCode::Char('c') => Action::Change(ConfigChange::UseColor(!config.use_color)),
        KeyCode::Char('i') => Action::Change(ConfigChange::Invert(!config.invert)),
        KeyCode::Char('l') => Action::Change(ConfigChange::AspectLock(!config.aspect_lock)),
        KeyCode::Char('n') => {
            Action::Change(ConfigChange::CharacterSet(next_preset(&config.character_set)))
        }
        _ => return None,
    };
    Some(action)
}

/// Preset suivant ; un jeu custom repart du premier preset.
fn next_preset(current: &CharacterSet) -> CharacterSet {
    let presets = CharacterSet::PRESETS;
    presets
        .iter()
        .position(|p| p == current)
        .map_or_else(|| presets[0].clone(), |i| presets[(i + 1) % presets.len()].clone())
}

/// Terminal ratatui (mode brut + écran alternatif), restauré au drop,
/// y compris en sortie d'erreur.
struct TerminalGuard {
    terminal: DefaultTerminal,
}

impl TerminalGuard {
    fn enter() -> Self {
        Self {
            terminal: ratatui::init(),
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

/// Réglages de la boucle live.
pub struct LiveOptions {
    /// Arrêt après ce nombre de frames rendues.
    pub max_frames: Option<u64>,
    /// Drapeau partagé avec le handler Ctrl-C.
    pub running: Arc<AtomicBool>,
}

/// Boucle principale : une frame par tick, changements appliqués entre deux
/// rendus, frames manquantes sautées.
///
/// # Errors
/// Terminal I/O errors. Render and export errors are logged, never fatal.
pub fn run_live<S: Sink>(
    session: &mut Session,
    source: &mut dyn Source,
    exporter: &mut Exporter<S>,
    config: &ArcSwap<Config>,
    options: &LiveOptions,
) -> Result<()> {
    let mut guard = TerminalGuard::enter();
    let mut fps = FpsCounter::new();
    let mut seen = config.load_full();
    let mut rendered: u64 = 0;
    let mut last_frame: Option<Instant> = None;
    let mut last_status = Instant::now();

    while options.running.load(Ordering::Relaxed) {
        // === Hot reload ===
        let current = config.load_full();
        if !Arc::ptr_eq(&current, &seen) {
            session.reload(&current);
            exporter.update(session.export_config(), session.render_config().font_size);
            seen = current;
        }

        // === Cadence ===
        let budget = Duration::from_secs_f64(1.0 / f64::from(session.render_config().target_fps.max(1)));
        let elapsed = last_frame.map_or(budget, |t| t.elapsed());
        if elapsed < budget {
            if event::poll(budget - elapsed)? {
                handle_event(&event::read()?, session, exporter, &options.running);
            }
            continue;
        }
        last_frame = Some(Instant::now());

        while event::poll(Duration::ZERO)? {
            handle_event(&event::read()?, session, exporter, &options.running);
        }

        // === Rendu ===
        match session.tick(source) {
            Ok(_) => {
                fps.tick();
                rendered += 1;
            }
            Err(CoreError::FrameUnavailable) => {
                log::debug!("Pas de frame disponible, tick sauté");
                continue;
            }
            Err(e) => {
                log::warn!("Rendu sauté : {e}");
                continue;
            }
        }

        if let Some(grid) = session.grid() {
            let status = Status {
                fps: fps.fps(),
                grid: (grid.width, grid.height),
                source: session.source_size(),
                charset: session.render_config().character_set.name().to_string(),
            };
            guard.terminal.draw(|frame| canvas::draw(frame, grid, &status))?;
            if last_status.elapsed() >= STATUS_LOG_INTERVAL {
                log::info!("{}", status.line());
                last_status = Instant::now();
            }
        }

        if options.max_frames.is_some_and(|max| rendered >= max) {
            break;
        }
    }

    Ok(())
}

fn handle_event<S: Sink>(
    event: &Event,
    session: &mut Session,
    exporter: &mut Exporter<S>,
    running: &AtomicBool,
) {
    // le redimensionnement est absorbé par le prochain `draw`
    let Event::Key(key) = event else { return };
    if key.kind != KeyEventKind::Press {
        return;
    }
    match action_for_key(key, session.render_config()) {
        Some(Action::Quit) => running.store(false, Ordering::Relaxed),
        Some(Action::Change(change)) => {
            let font_changed = matches!(change, ConfigChange::FontSize(_));
            match session.apply(change) {
                Ok(()) if font_changed => {
                    exporter.update(session.export_config(), session.render_config().font_size);
                }
                Ok(()) => {}
                Err(e) => log::warn!("Changement refusé : {e}"),
            }
        }
        Some(Action::Export(kind)) => {
            if let Some(grid) = session.grid() {
                let request = ExportRequest { kind, path: None };
                match exporter.export(grid, &request) {
                    Ok(path) => log::info!("Export {} → {}", kind.extension(), path.display()),
                    Err(e) => log::error!("{e:#}"),
                }
            }
        }
        None => {}
    }
}
