use std::fmt::Write as _;

use fb_core::config::{ColorMode, DisplayConfig, Region};
use fb_core::error::CoreError;
use fb_core::frame::{FrameLine, RenderedFrame};
use fb_core::traits::PixelSource;

use crate::color_map::{self, Directive};
use crate::luminance::Sample;
use crate::{dither, glyph};

/// Effective capture rectangle, clamped to the source bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureRect {
    /// Origin column.
    pub x: u32,
    /// Origin row.
    pub y: u32,
    /// Width in pixels, always > 0.
    pub width: u32,
    /// Height in pixels, always > 0.
    pub height: u32,
}

/// Résout la région de capture contre une source `src_w × src_h`.
///
/// Une étendue nulle sur un axe signifie « jusqu'au bord de la source ».
/// L'origine et l'étendue sont ensuite bornées à la source.
///
/// # Errors
/// [`CoreError::InvalidRegion`] when the clamped width or height is zero.
///
/// # Example
/// ```
/// use fb_ascii::compositor::{resolve_region, CaptureRect};
/// use fb_core::config::Region;
/// let region = Region { x: 99, y: 99, width: 10, height: 10 };
/// let rect = resolve_region(100, 100, &region).unwrap();
/// assert_eq!(rect, CaptureRect { x: 99, y: 99, width: 1, height: 1 });
/// ```
pub fn resolve_region(src_w: u32, src_h: u32, region: &Region) -> Result<CaptureRect, CoreError> {
    let clamp_axis = |origin: u32, extent: u32, bound: u32| -> u32 {
        let room = bound.saturating_sub(origin);
        if extent == 0 { room } else { extent.min(room) }
    };
    let width = clamp_axis(region.x, region.width, src_w);
    let height = clamp_axis(region.y, region.height, src_h);
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidRegion {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        });
    }
    Ok(CaptureRect {
        x: region.x,
        y: region.y,
        width,
        height,
    })
}

/// Nearest-neighbour source coordinates for each output index on one axis.
fn sample_axis(origin: u32, extent: u32, out: u16) -> Vec<u32> {
    let step = f64::from(extent) / f64::from(out);
    let last = extent - 1;
    (0..out)
        .map(|i| {
            let offset = (f64::from(i) * step).floor() as u32;
            origin + offset.min(last)
        })
        .collect()
}

/// Upper bound of the bytes written for one row.
fn row_capacity(width: usize, color: ColorMode) -> usize {
    // glyphe ≤ 3 octets ; paire de directives truecolor ≤ 38 octets
    let per_cell = if color.is_colored() { 3 + 38 } else { 3 };
    width * per_cell + color_map::RESET.len()
}

/// Convertit la région configurée d'une source en un frame texte.
///
/// Échantillonnage au plus proche voisin, correction luminosité/contraste
/// par canal, directive fg pleine intensité et bg à mi-intensité, puis
/// glyphe selon la luma. Une paire (fg, bg) n'est émise que si elle
/// diffère de celle de la cellule précédente de la même ligne. Chaque
/// ligne colorée se termine par un reset.
///
/// Une lecture hors limites est rendue en noir.
///
/// # Errors
/// - [`CoreError::InvalidDimensions`] for a zero output grid.
/// - [`CoreError::InvalidRegion`] when the region is empty after clamping.
/// - [`CoreError::AllocationFailed`] when a row buffer cannot be reserved.
/// - Any non out-of-bounds error returned by the source.
///
/// # Example
/// ```
/// use fb_ascii::render;
/// use fb_core::config::{CharsetMode, ColorMode, DisplayConfig};
/// use fb_source::memory::MemorySource;
///
/// let src = MemorySource::solid(4, 4, (255, 0, 0));
/// let config = DisplayConfig {
///     output_width: 2,
///     output_height: 2,
///     color_mode: ColorMode::TrueColor,
///     charset: CharsetMode::Simple,
///     ..Default::default()
/// };
/// let frame = render(&src, &config).unwrap();
/// assert_eq!(frame.lines.len(), 2);
/// assert!(frame.lines[0].text.starts_with("\x1b[38;2;255;0;0m"));
/// ```
pub fn render<S: PixelSource + ?Sized>(
    source: &S,
    config: &DisplayConfig,
) -> Result<RenderedFrame, CoreError> {
    let (out_w, out_h) = (config.output_width, config.output_height);
    if out_w == 0 || out_h == 0 {
        return Err(CoreError::InvalidDimensions {
            width: u32::from(out_w),
            height: u32::from(out_h),
        });
    }

    let rect = resolve_region(source.width(), source.height(), &config.region)?;
    let xs = sample_axis(rect.x, rect.width, out_w);
    let ys = sample_axis(rect.y, rect.height, out_h);

    let mode = config.color_mode;
    let levels = glyph::bucket_count(config.charset);
    let capacity = row_capacity(usize::from(out_w), mode);

    let mut lines: Vec<FrameLine> = Vec::new();
    lines
        .try_reserve_exact(usize::from(out_h))
        .map_err(|_| CoreError::AllocationFailed {
            bytes: usize::from(out_h) * std::mem::size_of::<FrameLine>(),
        })?;

    for (row, &sy) in ys.iter().enumerate() {
        let mut text = String::new();
        text.try_reserve(capacity)
            .map_err(|_| CoreError::AllocationFailed { bytes: capacity })?;

        let mut directives = 0usize;
        let mut previous: Option<(Directive, Directive)> = None;

        for (col, &sx) in xs.iter().enumerate() {
            let raw = match source.read_pixel(sx, sy) {
                Ok(rgb) => rgb,
                Err(CoreError::OutOfBounds { .. }) => {
                    log::trace!("pixel ({sx}, {sy}) hors limites, rendu en noir");
                    (0, 0, 0)
                }
                Err(e) => return Err(e),
            };
            let sample = Sample::new(raw, config.brightness, config.contrast);

            let fg = color_map::fg_directive(sample.r, sample.g, sample.b, mode);
            let bg = if config.dim_background {
                let (r, g, b) = sample.dimmed();
                color_map::bg_directive(r, g, b, mode)
            } else {
                Directive::Empty
            };
            let pair = (fg, bg);
            if previous != Some(pair) && !(fg.is_empty() && bg.is_empty()) {
                write!(text, "{fg}{bg}")
                    .map_err(|_| CoreError::AllocationFailed { bytes: capacity })?;
                directives += 1;
            }
            previous = Some(pair);

            let luma = if config.dither {
                dither::apply_bayer_8x8(sample.luma, col as u32, row as u32, levels)
            } else {
                sample.luma
            };
            text.push_str(glyph::glyph(luma, config.charset));
        }

        if mode.is_colored() {
            text.push_str(color_map::RESET);
        }
        lines.push(FrameLine { text, directives });
    }

    Ok(RenderedFrame { lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::config::CharsetMode;
    use fb_core::pixel::{Geometry, PixelFormat};
    use fb_source::memory::MemorySource;

    fn config(w: u16, h: u16, color: ColorMode, charset: CharsetMode) -> DisplayConfig {
        DisplayConfig {
            output_width: w,
            output_height: h,
            color_mode: color,
            charset,
            ..Default::default()
        }
    }

    #[test]
    fn red_source_truecolor_simple() {
        let src = MemorySource::solid(4, 4, (255, 0, 0));
        let frame = render(&src, &config(2, 2, ColorMode::TrueColor, CharsetMode::Simple)).unwrap();
        let expected = "\x1b[38;2;255;0;0m\x1b[48;2;127;0;0m88\x1b[0m";
        for line in &frame.lines {
            assert_eq!(line.text, expected);
            assert_eq!(line.directives, 1);
        }
    }

    #[test]
    fn solid_region_emits_one_directive_per_row() {
        let src = MemorySource::solid(64, 32, (12, 200, 99));
        for mode in [ColorMode::Basic8, ColorMode::Cube256, ColorMode::TrueColor, ColorMode::Gray24] {
            let frame = render(&src, &config(40, 10, mode, CharsetMode::Braille)).unwrap();
            assert_eq!(frame.lines.len(), 10);
            assert!(frame.lines.iter().all(|l| l.directives == 1), "{mode}");
            assert_eq!(frame.directive_count(), 10);
        }
    }

    #[test]
    fn transitions_bound_directive_count() {
        // moitié gauche noire, moitié droite blanche
        let src = MemorySource::from_fn(8, 2, |x, _| if x < 4 { (0, 0, 0) } else { (255, 255, 255) });
        let frame = render(&src, &config(8, 2, ColorMode::TrueColor, CharsetMode::Blocks)).unwrap();
        assert!(frame.lines.iter().all(|l| l.directives == 2));
    }

    #[test]
    fn none_mode_has_no_escapes() {
        let src = MemorySource::from_fn(16, 16, |x, y| ((x * 16) as u8, (y * 16) as u8, 7));
        let frame = render(&src, &config(8, 4, ColorMode::None, CharsetMode::Simple)).unwrap();
        assert_eq!(frame.directive_count(), 0);
        assert!(!frame.to_text().contains('\x1b'));
        assert!(frame.lines.iter().all(|l| l.text.chars().count() == 8));
    }

    #[test]
    fn colored_rows_end_with_reset() {
        let src = MemorySource::solid(4, 4, (1, 2, 3));
        let frame = render(&src, &config(3, 3, ColorMode::Cube256, CharsetMode::Art)).unwrap();
        assert!(frame.lines.iter().all(|l| l.text.ends_with(color_map::RESET)));
    }

    #[test]
    fn background_off_emits_foreground_only() {
        let src = MemorySource::solid(4, 4, (255, 0, 0));
        let cfg = DisplayConfig {
            dim_background: false,
            ..config(2, 1, ColorMode::TrueColor, CharsetMode::Simple)
        };
        let frame = render(&src, &cfg).unwrap();
        assert_eq!(frame.lines[0].text, "\x1b[38;2;255;0;0m88\x1b[0m");
    }

    #[test]
    fn region_clamps_to_single_pixel() {
        let src = MemorySource::from_fn(100, 100, |x, y| (x as u8, y as u8, 0));
        let cfg = DisplayConfig {
            region: Region { x: 99, y: 99, width: 10, height: 10 },
            ..config(4, 2, ColorMode::TrueColor, CharsetMode::Simple)
        };
        let frame = render(&src, &cfg).unwrap();
        assert_eq!(frame.lines.len(), 2);
        assert!(frame.lines[0].text.starts_with("\x1b[38;2;99;99;0m"));
    }

    #[test]
    fn region_outside_source_is_invalid() {
        let src = MemorySource::solid(100, 100, (0, 0, 0));
        let cfg = DisplayConfig {
            region: Region { x: 100, y: 0, width: 10, height: 10 },
            ..Default::default()
        };
        assert!(matches!(render(&src, &cfg), Err(CoreError::InvalidRegion { .. })));
        assert!(resolve_region(100, 100, &Region { x: 0, y: 250, width: 0, height: 0 }).is_err());
    }

    #[test]
    fn zero_extent_selects_remaining_source() {
        let rect = resolve_region(640, 480, &Region { x: 40, y: 80, width: 0, height: 0 }).unwrap();
        assert_eq!(rect, CaptureRect { x: 40, y: 80, width: 600, height: 400 });
        let full = resolve_region(640, 480, &Region::default()).unwrap();
        assert_eq!((full.width, full.height), (640, 480));
    }

    #[test]
    fn upsampling_stays_inside_region() {
        let xs = sample_axis(10, 3, 8);
        assert_eq!(xs.len(), 8);
        assert!(xs.iter().all(|&x| (10..13).contains(&x)));
        assert_eq!(sample_axis(0, 100, 4), vec![0, 25, 50, 75]);
    }

    #[test]
    fn zero_grid_is_rejected() {
        let src = MemorySource::solid(4, 4, (0, 0, 0));
        let cfg = DisplayConfig { output_width: 0, ..Default::default() };
        assert!(matches!(render(&src, &cfg), Err(CoreError::InvalidDimensions { .. })));
    }

    #[test]
    fn padded_stride_renders_like_packed() {
        // RGB565, 2×2, stride 8 octets (4 de padding)
        let geo = Geometry {
            width: 2,
            height: 2,
            line_length: 8,
            bits_per_pixel: 16,
            format: PixelFormat::Rgb565,
        };
        let mut data = vec![0u8; 16];
        for row in 0..2 {
            data[row * 8..row * 8 + 4].copy_from_slice(&[0x00, 0xF8, 0x00, 0xF8]);
        }
        let src = MemorySource::new(geo, data).unwrap();
        let frame = render(&src, &config(2, 2, ColorMode::TrueColor, CharsetMode::Simple)).unwrap();
        assert!(frame.lines.iter().all(|l| l.text.starts_with("\x1b[38;2;248;0;0m")));
    }

    #[test]
    fn dither_keeps_grid_shape() {
        let src = MemorySource::from_fn(64, 64, |x, _| ((x * 4) as u8, (x * 4) as u8, (x * 4) as u8));
        let cfg = DisplayConfig {
            dither: true,
            ..config(32, 8, ColorMode::None, CharsetMode::Blocks)
        };
        let frame = render(&src, &cfg).unwrap();
        assert!(frame.lines.iter().all(|l| l.text.chars().count() == 32));
    }

    #[test]
    fn brightness_lifts_glyph_density() {
        let src = MemorySource::solid(4, 4, (100, 100, 100));
        let dark = render(&src, &config(1, 1, ColorMode::None, CharsetMode::Blocks)).unwrap();
        let cfg = DisplayConfig {
            brightness: 2.0,
            ..config(1, 1, ColorMode::None, CharsetMode::Blocks)
        };
        let bright = render(&src, &cfg).unwrap();
        assert_eq!(dark.lines[0].text, "▓");
        assert_eq!(bright.lines[0].text, "░");
    }

    /// Blanc, sauf une colonne qui n'existe plus (ou un device perdu).
    struct Patchy {
        missing: u32,
        lost: bool,
    }

    impl PixelSource for Patchy {
        fn geometry(&self) -> Geometry {
            Geometry::packed(4, 1, 24, PixelFormat::Rgb888)
        }

        fn read_pixel(&self, x: u32, y: u32) -> Result<(u8, u8, u8), CoreError> {
            if x != self.missing {
                return Ok((255, 255, 255));
            }
            if self.lost {
                Err(CoreError::MapFailed {
                    path: "/dev/fb0".into(),
                    reason: "unmapped".into(),
                })
            } else {
                Err(CoreError::OutOfBounds { x, y })
            }
        }

        fn close(&mut self) {}
    }

    #[test]
    fn out_of_bounds_pixel_renders_black() {
        let src = Patchy { missing: 3, lost: false };
        let frame = render(&src, &config(4, 1, ColorMode::TrueColor, CharsetMode::Simple)).unwrap();
        assert_eq!(
            frame.lines[0].text,
            "\x1b[38;2;255;255;255m\x1b[48;2;127;127;127m   \
             \x1b[38;2;0;0;0m\x1b[48;2;0;0;0m@\x1b[0m"
        );
        assert_eq!(frame.lines[0].directives, 2);
    }

    #[test]
    fn other_read_errors_propagate() {
        let src = Patchy { missing: 1, lost: true };
        let err = render(&src, &config(4, 1, ColorMode::TrueColor, CharsetMode::Simple)).unwrap_err();
        assert!(matches!(err, CoreError::MapFailed { .. }));
    }
}
