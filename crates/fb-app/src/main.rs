use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use arc_swap::ArcSwap;
use clap::Parser;
use fb_app::cancel::{AnyCancel, KeyboardCancel, SignalCancel};
use fb_app::{benchmark, capture, cli, hotreload, source};
use fb_core::config::{DisplayConfig, load_config};
use fb_core::traits::PixelSource;
use fb_render::sink::TerminalSink;
use fb_render::terminal::TerminalGuard;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_filter())
        .init();

    // 3. Charger la config, puis les overrides CLI
    let terminal = if cli.benchmark {
        None
    } else {
        crossterm::terminal::size().ok()
    };
    let overrides = cli.overrides(terminal);
    let mut config = resolve_config(&cli)?;
    overrides.apply(&mut config);
    config.clamp_all();

    // Benchmark : pas de terminal, pas de hot-reload
    if cli.benchmark {
        let image = cli.image.clone();
        let report = benchmark::run_benchmark(&config, move |cfg| {
            benchmark_source(image.as_deref(), cfg)
        })?;
        println!("{report}");
        return Ok(());
    }

    let config = Arc::new(ArcSwap::from_pointee(config));

    // 4. Hot-reload de la config (thread interne notify)
    let _watcher = if cli.config.exists() {
        let overlay = overrides.clone();
        match hotreload::spawn_config_watcher(&cli.config, &config, move |c| overlay.apply(c)) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Hot-reload indisponible : {e:#}");
                None
            }
        }
    } else {
        None
    };

    // 5. Sources d'arrêt : clavier + signal
    let cancel = AnyCancel::new()
        .with(KeyboardCancel)
        .with(SignalCancel::install()?);

    // 6. Terminal en mode capture (restauré au drop, même sur panic)
    let mut guard = TerminalGuard::enter()?;
    let sink = TerminalSink::new(BufWriter::new(io::stdout()));

    // 7. Worker de capture, joint ici
    let image = cli.image.clone();
    let handle = capture::spawn_capture(
        Arc::clone(&config),
        move |cfg| source::open_source(image.as_deref(), cfg),
        sink,
        cancel,
    )?;
    let result = handle
        .join()
        .map_err(|_| anyhow!("Le thread de capture a paniqué"));

    // 8. Restaurer le terminal (TOUJOURS, même en cas d'erreur)
    if let Err(e) = guard.restore() {
        log::warn!("Restauration du terminal incomplète : {e}");
    }

    let stats = result??;
    if cli.verbose {
        println!(
            "{} frames en {:.2} s, {:.1} fps moyen",
            stats.frames,
            stats.elapsed.as_secs_f64(),
            stats.avg_fps()
        );
        if stats.skipped > 0 {
            println!("{} frames ignorés (région invalide)", stats.skipped);
        }
    }
    Ok(())
}

/// Benchmark source: the configured one, or a synthetic 1920×1080 gradient
/// when no framebuffer is reachable.
fn benchmark_source(
    image: Option<&std::path::Path>,
    config: &DisplayConfig,
) -> Result<Box<dyn PixelSource>> {
    match source::open_source(image, config) {
        Ok(src) => Ok(src),
        Err(e) if image.is_none() => {
            log::warn!("{e:#} : benchmark sur une source synthétique 1920×1080");
            Ok(Box::new(source::synthetic_source(1920, 1080)))
        }
        Err(e) => Err(e),
    }
}

/// Resolve config: the TOML file if present, else the defaults.
fn resolve_config(cli: &cli::Cli) -> Result<DisplayConfig> {
    if cli.config.exists() {
        load_config(&cli.config)
    } else {
        if cli.config != PathBuf::from("config/default.toml") {
            log::warn!(
                "Config introuvable : {}. Utilisation des défauts.",
                cli.config.display()
            );
        }
        Ok(DisplayConfig::default())
    }
}
