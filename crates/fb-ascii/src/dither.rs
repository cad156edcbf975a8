//! Tramage ordonné (Bayer 8×8) appliqué à la luma avant le choix du glyphe.
//! Casse le banding sur les dégradés lents quand le charset a peu de buckets.

/// Matrice de Bayer 8×8, 64 niveaux (0–63).
pub const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Dither a luma value at output cell `(x, y)`.
///
/// The offset spans one quantization step of a ramp with `levels` buckets,
/// centered on zero. Values at the extremes are left untouched so pure
/// black and white stay stable.
///
/// # Example
/// ```
/// use fb_ascii::dither::apply_bayer_8x8;
/// assert_eq!(apply_bayer_8x8(0, 3, 5, 9), 0);
/// assert_eq!(apply_bayer_8x8(255, 3, 5, 9), 255);
/// let v = apply_bayer_8x8(100, 0, 0, 9);
/// assert!(v.abs_diff(100) <= 15);
/// ```
#[must_use]
#[inline]
pub fn apply_bayer_8x8(luma: u8, x: u32, y: u32, levels: usize) -> u8 {
    if !(2..=253).contains(&luma) {
        return luma;
    }
    let bayer = f32::from(BAYER_8X8[(y % 8) as usize][(x % 8) as usize]);
    let threshold = bayer / 64.0 - 0.5;
    let step = 1.0 / (levels.max(2) as f32);
    let v = (f32::from(luma) / 255.0 + threshold * step).clamp(0.0, 1.0);
    (v * 255.0).round() as u8
}
