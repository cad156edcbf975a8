use std::fmt;
use std::sync::LazyLock;

use fb_core::config::ColorMode;

/// Séquence de remise à zéro des attributs SGR.
pub const RESET: &str = "\x1b[0m";

/// Which color layer a directive targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Foreground (glyph) color.
    Fg,
    /// Background (cell) color.
    Bg,
}

/// Directive couleur terminal, opaque pour le compositor.
///
/// Comparable en O(1) pour la suppression des répétitions ; le texte
/// d'échappement n'est produit qu'à l'émission.
///
/// # Example
/// ```
/// use fb_ascii::color_map::{fg_directive, Directive};
/// use fb_core::config::ColorMode;
/// let d = fg_directive(255, 0, 0, ColorMode::TrueColor);
/// assert_eq!(d.to_string(), "\x1b[38;2;255;0;0m");
/// assert!(fg_directive(255, 0, 0, ColorMode::None).is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Nothing is emitted.
    #[default]
    Empty,
    /// Entry of the static 256-color palette.
    Palette {
        /// Palette index 0..=255.
        index: u8,
        /// Target layer.
        layer: Layer,
    },
    /// Literal 24-bit color.
    Rgb {
        /// Red.
        r: u8,
        /// Green.
        g: u8,
        /// Blue.
        b: u8,
        /// Target layer.
        layer: Layer,
    },
}

impl Directive {
    /// `true` for [`Directive::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Empty => Ok(()),
            Self::Palette { index, layer } => f.write_str(palette().code(index, layer)),
            Self::Rgb { r, g, b, layer } => {
                let sel = match layer {
                    Layer::Fg => 38,
                    Layer::Bg => 48,
                };
                write!(f, "\x1b[{sel};2;{r};{g};{b}m")
            }
        }
    }
}

/// Table des 256 séquences ANSI (fg et bg), construite une seule fois.
///
/// - 0..=7 : couleurs de base (`30–37` / `40–47`)
/// - 8..=15 : couleurs vives (`90–97` / `100–107`)
/// - 16..=255 : palette étendue (`38;5;n` / `48;5;n`)
pub struct Palette {
    fg: Vec<String>,
    bg: Vec<String>,
}

impl Palette {
    fn build() -> Self {
        let mut fg = Vec::with_capacity(256);
        let mut bg = Vec::with_capacity(256);
        for i in 0..256u16 {
            match i {
                0..=7 => {
                    fg.push(format!("\x1b[3{i}m"));
                    bg.push(format!("\x1b[4{i}m"));
                }
                8..=15 => {
                    fg.push(format!("\x1b[9{}m", i - 8));
                    bg.push(format!("\x1b[10{}m", i - 8));
                }
                _ => {
                    fg.push(format!("\x1b[38;5;{i}m"));
                    bg.push(format!("\x1b[48;5;{i}m"));
                }
            }
        }
        Self { fg, bg }
    }

    /// Escape sequence for a palette entry.
    #[inline]
    #[must_use]
    pub fn code(&self, index: u8, layer: Layer) -> &str {
        match layer {
            Layer::Fg => &self.fg[usize::from(index)],
            Layer::Bg => &self.bg[usize::from(index)],
        }
    }
}

static PALETTE: LazyLock<Palette> = LazyLock::new(Palette::build);

/// Shared palette table.
///
/// # Example
/// ```
/// use fb_ascii::color_map::{palette, Layer};
/// assert_eq!(palette().code(1, Layer::Fg), "\x1b[31m");
/// assert_eq!(palette().code(9, Layer::Bg), "\x1b[101m");
/// assert_eq!(palette().code(196, Layer::Fg), "\x1b[38;5;196m");
/// ```
#[must_use]
pub fn palette() -> &'static Palette {
    &PALETTE
}

/// Palette index selected for a color, `None` for modes without a palette.
///
/// # Example
/// ```
/// use fb_ascii::color_map::palette_index;
/// use fb_core::config::ColorMode;
/// assert_eq!(palette_index(255, 255, 255, ColorMode::Cube256), Some(231));
/// assert_eq!(palette_index(0, 0, 0, ColorMode::Gray24), Some(232));
/// assert_eq!(palette_index(255, 255, 255, ColorMode::Basic8), Some(7));
/// assert_eq!(palette_index(1, 2, 3, ColorMode::TrueColor), None);
/// ```
#[inline]
#[must_use]
pub fn palette_index(r: u8, g: u8, b: u8, mode: ColorMode) -> Option<u8> {
    let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
    match mode {
        ColorMode::None | ColorMode::TrueColor => None,
        ColorMode::Basic8 => {
            let brightness = (r + g + b) / 3;
            Some((brightness / 32).min(7) as u8)
        }
        ColorMode::Cube256 => Some((16 + 36 * (r / 51) + 6 * (g / 51) + b / 51) as u8),
        ColorMode::Gray24 => {
            let gray = (r + g + b) / 3;
            Some((232 + gray * 24 / 256) as u8)
        }
    }
}

#[inline]
fn directive(r: u8, g: u8, b: u8, mode: ColorMode, layer: Layer) -> Directive {
    match mode {
        ColorMode::None => Directive::Empty,
        ColorMode::TrueColor => Directive::Rgb { r, g, b, layer },
        _ => palette_index(r, g, b, mode)
            .map_or(Directive::Empty, |index| Directive::Palette { index, layer }),
    }
}

/// Foreground directive for a color under `mode`.
#[inline]
#[must_use]
pub fn fg_directive(r: u8, g: u8, b: u8, mode: ColorMode) -> Directive {
    directive(r, g, b, mode, Layer::Fg)
}

/// Background directive for a color under `mode`.
///
/// # Example
/// ```
/// use fb_ascii::color_map::bg_directive;
/// use fb_core::config::ColorMode;
/// assert_eq!(bg_directive(0, 0, 0, ColorMode::Basic8).to_string(), "\x1b[40m");
/// ```
#[inline]
#[must_use]
pub fn bg_directive(r: u8, g: u8, b: u8, mode: ColorMode) -> Directive {
    directive(r, g, b, mode, Layer::Bg)
}
