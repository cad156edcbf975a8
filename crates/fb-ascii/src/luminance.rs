/// Échantillon corrigé : couleur après luminosité/contraste et sa luma.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Corrected red.
    pub r: u8,
    /// Corrected green.
    pub g: u8,
    /// Corrected blue.
    pub b: u8,
    /// Rec. 601 luma of the corrected color.
    pub luma: u8,
}

impl Sample {
    /// Correct a raw pixel and compute its luma.
    ///
    /// # Example
    /// ```
    /// use fb_ascii::luminance::Sample;
    /// let s = Sample::new((255, 0, 0), 1.0, 1.0);
    /// assert_eq!((s.r, s.g, s.b, s.luma), (255, 0, 0, 76));
    /// ```
    #[inline]
    #[must_use]
    pub fn new((r, g, b): (u8, u8, u8), brightness: f32, contrast: f32) -> Self {
        let r = correct_channel(r, brightness, contrast);
        let g = correct_channel(g, brightness, contrast);
        let b = correct_channel(b, brightness, contrast);
        Self {
            r,
            g,
            b,
            luma: luma(r, g, b),
        }
    }

    /// Background color: same hue at half intensity.
    #[inline]
    #[must_use]
    pub fn dimmed(&self) -> (u8, u8, u8) {
        (self.r / 2, self.g / 2, self.b / 2)
    }
}

/// Contraste autour de 128 puis luminosité multiplicative sur le point milieu.
///
/// `clamp((raw - 128) × contrast + 128 × brightness, 0, 255)`
///
/// # Example
/// ```
/// use fb_ascii::luminance::correct_channel;
/// assert_eq!(correct_channel(128, 1.0, 1.0), 128);
/// assert_eq!(correct_channel(255, 2.0, 2.0), 255);
/// assert_eq!(correct_channel(0, 0.5, 2.0), 0);
/// ```
#[inline]
#[must_use]
pub fn correct_channel(raw: u8, brightness: f32, contrast: f32) -> u8 {
    let v = (f32::from(raw) - 128.0) * contrast + 128.0 * brightness;
    // NaN tombe à 0 via le cast saturant
    v.clamp(0.0, 255.0) as u8
}

/// Rec. 601 luma, `round(0.299r + 0.587g + 0.114b)`.
#[inline]
#[must_use]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
    y.round().min(255.0) as u8
}
