use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use fb_core::config::{DisplayConfig, load_config};
use notify::{Event, EventKind, RecursiveMode, Watcher};

/// Surveille le fichier config et publie chaque nouvelle version dans
/// l'`ArcSwap` partagé avec la boucle de capture.
///
/// `overlay` est réappliqué après chaque lecture (overrides CLI), puis
/// les valeurs sont bornées. Une config invalide est ignorée : l'ancienne
/// reste active.
///
/// Retourne le Watcher (doit rester vivant tant que la capture tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use arc_swap::ArcSwap;
/// use fb_core::config::DisplayConfig;
/// use fb_app::hotreload::spawn_config_watcher;
/// use std::path::Path;
///
/// let config = Arc::new(ArcSwap::from_pointee(DisplayConfig::default()));
/// let _watcher = spawn_config_watcher(Path::new("config/default.toml"), &config, |_| {});
/// ```
pub fn spawn_config_watcher<F>(
    config_path: &Path,
    config: &Arc<ArcSwap<DisplayConfig>>,
    overlay: F,
) -> Result<impl Watcher + use<F>>
where
    F: Fn(&mut DisplayConfig) + Send + 'static,
{
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else { return };
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }
        match reload(&path, &overlay) {
            Ok(new_config) => {
                config.store(Arc::new(new_config));
                log::debug!("Config rechargée depuis {}", path.display());
            }
            Err(e) => log::warn!("Erreur de rechargement config : {e:#}"),
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    log::debug!("Surveillance de {}", config_path.display());
    Ok(watcher)
}

/// Read the file, apply `overlay`, clamp.
///
/// # Errors
/// Returns the read or parse error.
pub fn reload(path: &Path, overlay: &impl Fn(&mut DisplayConfig)) -> Result<DisplayConfig> {
    let mut config = load_config(path)?;
    overlay(&mut config);
    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::config::ColorMode;
    use std::io::Write;

    #[test]
    fn reload_applies_overlay_after_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\ncolor_mode = \"gray\"\ntarget_fps = 25").unwrap();
        let config = reload(file.path(), &|c: &mut DisplayConfig| c.target_fps = 5).unwrap();
        assert_eq!(config.color_mode, ColorMode::Gray24);
        assert_eq!(config.target_fps, 5);
    }

    #[test]
    fn reload_clamps_overlay_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]").unwrap();
        let config = reload(file.path(), &|c: &mut DisplayConfig| c.contrast = 99.0).unwrap();
        assert!((config.contrast - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn reload_rejects_broken_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\ncolor_mode = \"plaid\"").unwrap();
        assert!(reload(file.path(), &|_: &mut DisplayConfig| {}).is_err());
    }
}
