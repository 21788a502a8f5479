use std::sync::Arc;

use gc_ascii::compositor::Renderer;
use gc_core::aspect::AspectCoordinator;
use gc_core::config::{Config, ConfigChange, ExportConfig, RenderConfig, apply_change};
use gc_core::error::CoreError;
use gc_core::frame::{Frame, Grid};
use gc_core::traits::Source;

/// État vivant d'une session de rendu : config courante, coordinateur
/// d'aspect, dernière grille.
///
/// Les changements sont appliqués entre deux rendus, jamais pendant.
pub struct Session {
    render: RenderConfig,
    export: ExportConfig,
    aspect: AspectCoordinator,
    /// Changements CLI (`--set`), ré-appliqués après chaque rechargement.
    overrides: Vec<ConfigChange>,
    renderer: Renderer,
    grid: Option<Grid>,
    source_size: (u32, u32),
}

impl Session {
    /// Build a session from a loaded config and the CLI overrides.
    ///
    /// # Errors
    /// Returns the first override that cannot be applied.
    pub fn new(config: &Config, overrides: Vec<ConfigChange>) -> Result<Self, CoreError> {
        let render = config.render.clone();
        let mut aspect =
            AspectCoordinator::new(render.grid_width, render.grid_height, render.aspect_lock);
        aspect.on_width_changed(|w| log::info!("Largeur de grille → {w}"));
        aspect.on_height_changed(|h| log::info!("Hauteur de grille → {h}"));

        let mut session = Self {
            render,
            export: config.export.clone(),
            aspect,
            overrides: Vec::new(),
            renderer: Renderer::new(),
            grid: None,
            source_size: (0, 0),
        };
        session.sync_dims();
        for change in &overrides {
            session.apply(change.clone())?;
        }
        session.overrides = overrides;
        Ok(session)
    }

    #[must_use]
    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    #[must_use]
    pub fn export_config(&self) -> &ExportConfig {
        &self.export
    }

    /// Dernière grille rendue, s'il y en a une.
    #[must_use]
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Taille native de la dernière frame rendue.
    #[must_use]
    pub fn source_size(&self) -> (u32, u32) {
        self.source_size
    }

    /// Applique un changement `(champ, valeur)`.
    ///
    /// Largeur, hauteur et verrou appartiennent au coordinateur d'aspect ;
    /// la config de rendu en recopie l'état après chaque changement.
    ///
    /// # Errors
    /// Propagates [`apply_change`] errors; the session is left unchanged.
    pub fn apply(&mut self, change: ConfigChange) -> Result<(), CoreError> {
        match change {
            ConfigChange::Width(w) => self.aspect.set_width(w),
            ConfigChange::Height(h) => self.aspect.set_height(h),
            ConfigChange::AspectLock(locked) => self.aspect.set_locked(locked),
            other => self.render = apply_change(&self.render, other)?,
        }
        self.sync_dims();
        Ok(())
    }

    /// Remplace la config (hot reload) puis ré-applique les overrides CLI.
    pub fn reload(&mut self, config: &Config) {
        self.render = config.render.clone();
        self.export = config.export.clone();
        self.aspect.set_locked(false);
        self.aspect.set_width(self.render.grid_width);
        self.aspect.set_height(self.render.grid_height);
        self.aspect.set_locked(self.render.aspect_lock);
        self.sync_dims();

        let overrides = std::mem::take(&mut self.overrides);
        for change in &overrides {
            if let Err(e) = self.apply(change.clone()) {
                log::warn!("Override ignoré après rechargement : {e}");
            }
        }
        self.overrides = overrides;
    }

    fn sync_dims(&mut self) {
        self.render.grid_width = self.aspect.width();
        self.render.grid_height = self.aspect.height();
        self.render.aspect_lock = self.aspect.locked();
    }

    /// Rend une frame précise.
    ///
    /// # Errors
    /// Render errors; the previous grid is kept.
    pub fn render_frame(&mut self, frame: &Frame) -> Result<&Grid, CoreError> {
        let grid = self.renderer.render(frame, &self.render)?;
        self.source_size = (frame.width, frame.height);
        Ok(self.grid.insert(grid))
    }

    /// Un tick de la boucle : tire la frame la plus récente et la rend.
    ///
    /// # Errors
    /// [`CoreError::FrameUnavailable`] quand la source n'a rien (le tick est
    /// sauté), sinon les erreurs de rendu. La grille précédente reste valide.
    pub fn tick(&mut self, source: &mut dyn Source) -> Result<&Grid, CoreError> {
        let frame: Arc<Frame> = source.next_frame().ok_or(CoreError::FrameUnavailable)?;
        self.render_frame(&frame)
    }
}
