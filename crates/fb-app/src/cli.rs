use std::path::PathBuf;

use clap::Parser;
use fb_core::config::{CharsetMode, ColorMode, DisplayConfig, Region};
use fb_core::pixel::PixelFormat;

/// fbscii — affiche un framebuffer Linux en ASCII/Unicode coloré dans le terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Périphérique framebuffer. Défaut : celui de la config (/dev/fb0).
    #[arg(short, long)]
    pub device: Option<PathBuf>,

    /// Utiliser une image (PNG, JPEG, BMP, GIF) comme source au lieu du framebuffer.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Largeur de sortie en caractères. Défaut : largeur du terminal.
    #[arg(short = 'W', long)]
    pub width: Option<u16>,

    /// Hauteur de sortie en caractères. Défaut : hauteur du terminal.
    #[arg(short = 'H', long)]
    pub height: Option<u16>,

    /// FPS cible, 0 = sans limite.
    #[arg(short, long)]
    pub fps: Option<u32>,

    /// Mode couleur : none, basic, 256, true, gray.
    #[arg(long)]
    pub color: Option<ColorMode>,

    /// Jeu de glyphes : simple, blocks, half, braille, art.
    #[arg(long)]
    pub charset: Option<CharsetMode>,

    /// Multiplicateur de luminosité (0.5–2.0 conseillé).
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Multiplicateur de contraste (0.5–2.0 conseillé).
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Sous-région capturée : X,Y,W,H (W ou H à 0 = jusqu'au bord).
    #[arg(long, value_name = "X,Y,W,H")]
    pub region: Option<Region>,

    /// Forcer le format de pixel : rgb565, rgb888, bgr888, rgba8888, bgra8888.
    #[arg(long)]
    pub format: Option<PixelFormat>,

    /// Pas de fond coloré (fond du terminal).
    #[arg(long, default_value_t = false)]
    pub no_dim_bg: bool,

    /// Tramage Bayer avant le choix des glyphes.
    #[arg(long, default_value_t = false)]
    pub dither: bool,

    /// Capturer une seule frame puis quitter.
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Fichier de configuration TOML, rechargé à chaud.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Rendre 100 frames sans affichage et afficher les performances.
    #[arg(long, default_value_t = false)]
    pub benchmark: bool,

    /// Statistiques en fin de session, log au moins `info`.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Niveau de log : off, error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", value_parser = parse_level)]
    pub log_level: log::LevelFilter,
}

impl Cli {
    /// Effective log filter: `--log-level`, raised to `info` by `--verbose`.
    #[must_use]
    pub fn log_filter(&self) -> log::LevelFilter {
        if self.verbose {
            self.log_level.max(log::LevelFilter::Info)
        } else {
            self.log_level
        }
    }

    /// Collect the command-line overrides.
    ///
    /// `terminal` fills the output size when `--width`/`--height` are absent.
    #[must_use]
    pub fn overrides(&self, terminal: Option<(u16, u16)>) -> Overrides {
        Overrides {
            device: self.device.clone(),
            width: self.width.or(terminal.map(|(w, _)| w)),
            height: self.height.or(terminal.map(|(_, h)| h)),
            fps: self.fps,
            color: self.color,
            charset: self.charset,
            brightness: self.brightness,
            contrast: self.contrast,
            region: self.region,
            format: self.format,
            no_dim_bg: self.no_dim_bg,
            dither: self.dither,
            once: self.once,
        }
    }
}

fn parse_level(s: &str) -> Result<log::LevelFilter, String> {
    s.parse()
        .map_err(|_| format!("niveau inconnu `{s}` (off, error, warn, info, debug, trace)"))
}

/// Valeurs imposées par la ligne de commande, réappliquées après chaque
/// rechargement de la config.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    /// Device path.
    pub device: Option<PathBuf>,
    /// Output width.
    pub width: Option<u16>,
    /// Output height.
    pub height: Option<u16>,
    /// Target fps.
    pub fps: Option<u32>,
    /// Color mode.
    pub color: Option<ColorMode>,
    /// Charset.
    pub charset: Option<CharsetMode>,
    /// Brightness multiplier.
    pub brightness: Option<f32>,
    /// Contrast multiplier.
    pub contrast: Option<f32>,
    /// Capture region.
    pub region: Option<Region>,
    /// Pixel format.
    pub format: Option<PixelFormat>,
    /// Disable the dimmed background.
    pub no_dim_bg: bool,
    /// Enable dithering.
    pub dither: bool,
    /// Single frame.
    pub once: bool,
}

impl Overrides {
    /// Write every set override into `config`. Flags only ever switch on.
    pub fn apply(&self, config: &mut DisplayConfig) {
        if let Some(ref device) = self.device {
            config.device.clone_from(device);
        }
        if let Some(v) = self.width {
            config.output_width = v;
        }
        if let Some(v) = self.height {
            config.output_height = v;
        }
        if let Some(v) = self.fps {
            config.target_fps = v;
        }
        if let Some(v) = self.color {
            config.color_mode = v;
        }
        if let Some(v) = self.charset {
            config.charset = v;
        }
        if let Some(v) = self.brightness {
            config.brightness = v;
        }
        if let Some(v) = self.contrast {
            config.contrast = v;
        }
        if let Some(v) = self.region {
            config.region = v;
        }
        if self.format.is_some() {
            config.pixel_format = self.format;
        }
        if self.no_dim_bg {
            config.dim_background = false;
        }
        if self.dither {
            config.dither = true;
        }
        if self.once {
            config.continuous = false;
        }
    }
}
