use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pixel::PixelFormat;

/// Configuration complète de l'affichage, hot-rechargeable.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use fb_core::config::{DisplayConfig, ColorMode, CharsetMode};
/// let config = DisplayConfig::default();
/// assert_eq!((config.output_width, config.output_height), (80, 24));
/// assert_eq!(config.color_mode, ColorMode::TrueColor);
/// assert_eq!(config.charset, CharsetMode::Braille);
/// assert_eq!(config.target_fps, 10);
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    // === Grille de sortie ===
    /// Largeur de sortie en caractères.
    pub output_width: u16,
    /// Hauteur de sortie en caractères.
    pub output_height: u16,

    // === Couleur & glyphes ===
    /// Terminal color mode.
    pub color_mode: ColorMode,
    /// Density ramp used for glyph selection.
    pub charset: CharsetMode,
    /// Multiplicateur de luminosité (nominal 1.0).
    pub brightness: f32,
    /// Multiplicateur de contraste (nominal 1.0).
    pub contrast: f32,
    /// Background directive uses the half-intensity color. Off = no background.
    pub dim_background: bool,
    /// Tramage Bayer 8×8 sur la luminance avant choix du glyphe.
    pub dither: bool,

    // === Capture ===
    /// Frames per second. 0 = unbounded.
    pub target_fps: u32,
    /// Sub-region of the source. Zero extent = full source.
    pub region: Region,
    /// `false` = one frame then stop.
    pub continuous: bool,
    /// Framebuffer device path.
    pub device: PathBuf,
    /// Overrides the pixel format derived from device metadata.
    pub pixel_format: Option<PixelFormat>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            output_width: 80,
            output_height: 24,
            color_mode: ColorMode::TrueColor,
            charset: CharsetMode::Braille,
            brightness: 1.0,
            contrast: 1.0,
            dim_background: true,
            dither: false,
            target_fps: 10,
            region: Region::default(),
            continuous: true,
            device: PathBuf::from("/dev/fb0"),
            pixel_format: None,
        }
    }
}

impl DisplayConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    ///
    /// Brightness and contrast are meant for 0.5–2.0; wider values are
    /// accepted and only degrade the picture.
    ///
    /// # Example
    /// ```
    /// use fb_core::config::DisplayConfig;
    /// let mut config = DisplayConfig { contrast: 50.0, output_width: 0, ..Default::default() };
    /// config.clamp_all();
    /// assert_eq!(config.contrast, 4.0);
    /// assert_eq!(config.output_width, 1);
    /// ```
    pub fn clamp_all(&mut self) {
        if !self.brightness.is_finite() {
            self.brightness = 1.0;
        }
        if !self.contrast.is_finite() {
            self.contrast = 1.0;
        }
        let (brightness, contrast) = (self.brightness, self.contrast);
        self.brightness = self.brightness.clamp(0.1, 4.0);
        self.contrast = self.contrast.clamp(0.1, 4.0);
        if (brightness - self.brightness).abs() > f32::EPSILON
            || (contrast - self.contrast).abs() > f32::EPSILON
        {
            log::warn!(
                "Luminosité/contraste {brightness}/{contrast} ramenés à {}/{}",
                self.brightness,
                self.contrast
            );
        }
        self.target_fps = self.target_fps.min(240);
        self.output_width = self.output_width.clamp(1, 1000);
        self.output_height = self.output_height.clamp(1, 1000);
    }

    /// Frame period, `None` when unbounded (fps = 0).
    ///
    /// # Example
    /// ```
    /// use fb_core::config::DisplayConfig;
    /// use std::time::Duration;
    /// let config = DisplayConfig { target_fps: 10, ..Default::default() };
    /// assert_eq!(config.frame_period(), Some(Duration::from_millis(100)));
    /// let config = DisplayConfig { target_fps: 0, ..Default::default() };
    /// assert_eq!(config.frame_period(), None);
    /// ```
    #[must_use]
    pub fn frame_period(&self) -> Option<std::time::Duration> {
        (self.target_fps > 0)
            .then(|| std::time::Duration::from_secs_f64(1.0 / f64::from(self.target_fps)))
    }
}

/// Rectangular capture sub-region, in source pixels.
///
/// # Example
/// ```
/// use fb_core::config::Region;
/// let r: Region = "10,20,300,200".parse().unwrap();
/// assert_eq!(r, Region { x: 10, y: 20, width: 300, height: 200 });
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Region {
    /// Origin column.
    pub x: u32,
    /// Origin row.
    pub y: u32,
    /// Width, 0 = up to the source edge.
    pub width: u32,
    /// Height, 0 = up to the source edge.
    pub height: u32,
}


impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, w, h] = parts.as_slice() else {
            return Err(CoreError::Config(format!(
                "région '{s}' : format attendu X,Y,W,H"
            )));
        };
        let num = |v: &str| {
            v.parse::<u32>()
                .map_err(|_| CoreError::Config(format!("région '{s}' : '{v}' n'est pas un entier")))
        };
        Ok(Self {
            x: num(x)?,
            y: num(y)?,
            width: num(w)?,
            height: num(h)?,
        })
    }
}

/// Terminal color mode.
///
/// # Example
/// ```
/// use fb_core::config::ColorMode;
/// assert_eq!("256".parse::<ColorMode>().unwrap(), ColorMode::Cube256);
/// assert_eq!(ColorMode::Gray24.to_string(), "gray");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ColorMode {
    /// Pas de couleur, glyphes seuls.
    #[serde(rename = "none")]
    None,
    /// 8 couleurs ANSI choisies par luminosité.
    #[serde(rename = "basic")]
    Basic8,
    /// Cube 6×6×6 de la palette 256 couleurs.
    #[serde(rename = "256")]
    Cube256,
    /// RGB 24 bits littéral.
    #[default]
    #[serde(rename = "true")]
    TrueColor,
    /// Rampe de 24 gris de la palette 256 couleurs.
    #[serde(rename = "gray")]
    Gray24,
}

impl ColorMode {
    /// `false` only for [`ColorMode::None`].
    #[must_use]
    pub fn is_colored(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Name as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic8 => "basic",
            Self::Cube256 => "256",
            Self::TrueColor => "true",
            Self::Gray24 => "gray",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "basic" => Ok(Self::Basic8),
            "256" => Ok(Self::Cube256),
            "true" => Ok(Self::TrueColor),
            "gray" => Ok(Self::Gray24),
            other => Err(CoreError::Config(format!(
                "mode couleur inconnu '{other}' (none, basic, 256, true, gray)"
            ))),
        }
    }
}

/// Density ramp selection.
///
/// # Example
/// ```
/// use fb_core::config::CharsetMode;
/// assert_eq!("art".parse::<CharsetMode>().unwrap(), CharsetMode::Art);
/// assert!("fancy".parse::<CharsetMode>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharsetMode {
    /// Rampe ASCII, 9 niveaux.
    Simple,
    /// Blocs ombrés, 4 niveaux.
    Blocks,
    /// Demi-blocs, 4 niveaux.
    Half,
    /// Braille, 8 niveaux.
    #[default]
    Braille,
    /// Braille dense, 9 niveaux.
    Art,
}

impl CharsetMode {
    /// Name as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Blocks => "blocks",
            Self::Half => "half",
            Self::Braille => "braille",
            Self::Art => "art",
        }
    }
}

impl fmt::Display for CharsetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CharsetMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "blocks" => Ok(Self::Blocks),
            "half" => Ok(Self::Half),
            "braille" => Ok(Self::Braille),
            "art" => Ok(Self::Art),
            other => Err(CoreError::Config(format!(
                "charset inconnu '{other}' (simple, blocks, half, braille, art)"
            ))),
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    display: DisplaySection,
}

/// Display section of the TOML config, all fields optional for partial override.
#[derive(Default, Deserialize)]
struct DisplaySection {
    output_width: Option<u16>,
    output_height: Option<u16>,
    color_mode: Option<ColorMode>,
    charset: Option<CharsetMode>,
    brightness: Option<f32>,
    contrast: Option<f32>,
    dim_background: Option<bool>,
    dither: Option<bool>,
    target_fps: Option<u32>,
    region: Option<Region>,
    continuous: Option<bool>,
    device: Option<PathBuf>,
    pixel_format: Option<PixelFormat>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use fb_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<DisplayConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse TOML text into a config, merged over the defaults and clamped.
///
/// # Errors
/// Returns an error if the text is not valid TOML for the `[display]` section.
///
/// # Example
/// ```
/// use fb_core::config::{parse_config, ColorMode};
/// let config = parse_config("[display]\ncolor_mode = \"gray\"\n").unwrap();
/// assert_eq!(config.color_mode, ColorMode::Gray24);
/// assert_eq!(config.output_width, 80);
/// ```
pub fn parse_config(content: &str) -> Result<DisplayConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = DisplayConfig::default();

    let d = file.display;
    if let Some(v) = d.output_width {
        config.output_width = v;
    }
    if let Some(v) = d.output_height {
        config.output_height = v;
    }
    if let Some(v) = d.color_mode {
        config.color_mode = v;
    }
    if let Some(v) = d.charset {
        config.charset = v;
    }
    if let Some(v) = d.brightness {
        config.brightness = v;
    }
    if let Some(v) = d.contrast {
        config.contrast = v;
    }
    if let Some(v) = d.dim_background {
        config.dim_background = v;
    }
    if let Some(v) = d.dither {
        config.dither = v;
    }
    if let Some(v) = d.target_fps {
        config.target_fps = v;
    }
    if let Some(v) = d.region {
        config.region = v;
    }
    if let Some(v) = d.continuous {
        config.continuous = v;
    }
    if let Some(v) = d.device {
        config.device = v;
    }
    if d.pixel_format.is_some() {
        config.pixel_format = d.pixel_format;
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_override_keeps_defaults() {
        let config = parse_config(
            "[display]\ncharset = \"blocks\"\ntarget_fps = 0\ncolor_mode = \"256\"\n",
        )
        .unwrap();
        assert_eq!(config.charset, CharsetMode::Blocks);
        assert_eq!(config.target_fps, 0);
        assert_eq!(config.color_mode, ColorMode::Cube256);
        assert_eq!(config.output_height, 24);
        assert!(config.dim_background);
        assert!(config.pixel_format.is_none());
    }

    #[test]
    fn region_and_format_from_toml() {
        let config = parse_config(
            "[display]\npixel_format = \"bgr888\"\n\n[display.region]\nx = 5\ny = 6\nwidth = 7\nheight = 8\n",
        )
        .unwrap();
        assert_eq!(config.pixel_format, Some(PixelFormat::Bgr888));
        assert_eq!(
            config.region,
            Region {
                x: 5,
                y: 6,
                width: 7,
                height: 8
            }
        );
    }

    #[test]
    fn unknown_color_mode_is_rejected() {
        assert!(parse_config("[display]\ncolor_mode = \"sepia\"\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nbrightness = 1.5\noutput_width = 120").unwrap();
        let config = load_config(file.path()).unwrap();
        assert!((config.brightness - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.output_width, 120);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/fbscii.toml")).is_err());
    }

    #[test]
    fn clamp_repairs_nan() {
        let mut config = DisplayConfig {
            brightness: f32::NAN,
            target_fps: 10_000,
            ..Default::default()
        };
        config.clamp_all();
        assert!((config.brightness - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.target_fps, 240);
    }

    #[test]
    fn mode_names_roundtrip_through_from_str() {
        for mode in [
            ColorMode::None,
            ColorMode::Basic8,
            ColorMode::Cube256,
            ColorMode::TrueColor,
            ColorMode::Gray24,
        ] {
            assert_eq!(mode.name().parse::<ColorMode>().unwrap(), mode);
        }
        for cs in [
            CharsetMode::Simple,
            CharsetMode::Blocks,
            CharsetMode::Half,
            CharsetMode::Braille,
            CharsetMode::Art,
        ] {
            assert_eq!(cs.name().parse::<CharsetMode>().unwrap(), cs);
        }
    }

    #[test]
    fn region_parse_errors() {
        assert!("1,2,3".parse::<Region>().is_err());
        assert!("a,2,3,4".parse::<Region>().is_err());
        assert_eq!(
            " 1, 2, 3, 4 ".parse::<Region>().unwrap(),
            Region {
                x: 1,
                y: 2,
                width: 3,
                height: 4
            }
        );
    }

    #[test]
    fn shipped_default_file_matches_defaults() {
        let config = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, DisplayConfig::default());
        assert_eq!(parse_config("").unwrap(), DisplayConfig::default());
    }
}
