use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use gc_core::config::Config;
use notify::{Event, EventKind, RecursiveMode, Watcher};

/// Surveille le fichier config et remplace le contenu de l'ArcSwap.
///
/// Une config invalide est ignorée : l'ancienne reste en place.
/// Retourne le Watcher (doit rester vivant tant que l'app tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use arc_swap::ArcSwap;
/// use gc_core::config::Config;
/// use gc_app::hotreload::spawn_config_watcher;
/// use std::path::Path;
///
/// let config = Arc::new(ArcSwap::from_pointee(Config::default()));
/// let _watcher = spawn_config_watcher(Path::new("config/default.toml"), &config);
/// ```
pub fn spawn_config_watcher(
    config_path: &Path,
    config: &Arc<ArcSwap<Config>>,
) -> Result<impl Watcher + use<>> {
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res
            && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        {
            reload_into(&path, &config);
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    log::info!("Hot reload actif sur {}", config_path.display());
    Ok(watcher)
}

/// Recharge `path` dans `config`. Retourne `true` si la config a changé.
pub fn reload_into(path: &Path, config: &ArcSwap<Config>) -> bool {
    match gc_core::config::load_config(path) {
        Ok(new_config) => {
            if **config.load() == new_config {
                return false;
            }
            config.store(Arc::new(new_config));
            log::info!("Config rechargée depuis {}", path.display());
            true
        }
        Err(e) => {
            log::warn!("Erreur de rechargement config : {e:#}");
            false
        }
    }
}
