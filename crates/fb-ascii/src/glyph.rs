use fb_core::config::CharsetMode;

/// Table de glyphes partagée. Chaque charset possède une sous-plage
/// disjointe, ordonnée du plus dense au moins dense.
///
/// | Charset | Plage   | Buckets |
/// |---------|---------|---------|
/// | Blocks  | 0..4    | 4       |
/// | Half    | 4..8    | 4       |
/// | Simple  | 8..17   | 9       |
/// | Braille | 17..25  | 8       |
/// | Art     | 25..34  | 9       |
pub const GLYPH_TABLE: [&str; 34] = [
    // Blocks
    "█", "▓", "▒", "░",
    // Half
    "▀", "▄", "▌", "▐",
    // Simple
    "@", "#", "8", "&", "o", ":", "*", ".", " ",
    // Braille
    "⠀", "⠁", "⠂", "⠃", "⠄", "⠅", "⠆", "⠇",
    // Art
    "⣀", "⣁", "⣂", "⣃", "⣄", "⣅", "⣆", "⣇", "⣿",
];

/// Sub-range of [`GLYPH_TABLE`] owned by `charset`.
///
/// # Example
/// ```
/// use fb_ascii::glyph::span;
/// use fb_core::config::CharsetMode;
/// assert_eq!(span(CharsetMode::Simple), 8..17);
/// ```
#[must_use]
pub const fn span(charset: CharsetMode) -> std::ops::Range<usize> {
    match charset {
        CharsetMode::Blocks => 0..4,
        CharsetMode::Half => 4..8,
        CharsetMode::Simple => 8..17,
        CharsetMode::Braille => 17..25,
        CharsetMode::Art => 25..34,
    }
}

/// Nombre de buckets du charset.
#[inline]
#[must_use]
pub const fn bucket_count(charset: CharsetMode) -> usize {
    let r = span(charset);
    r.end - r.start
}

/// Bucket for a brightness: `min(brightness * n / 256, n - 1)`.
#[inline]
#[must_use]
pub fn bucket(brightness: u8, charset: CharsetMode) -> usize {
    let n = bucket_count(charset);
    (usize::from(brightness) * n / 256).min(n - 1)
}

/// Glyphe de densité pour une luminance donnée.
///
/// # Example
/// ```
/// use fb_ascii::glyph;
/// use fb_core::config::CharsetMode;
/// assert_eq!(glyph(0, CharsetMode::Blocks), "█");
/// assert_eq!(glyph(255, CharsetMode::Blocks), "░");
/// assert_eq!(glyph(76, CharsetMode::Simple), "8");
/// ```
#[inline]
#[must_use]
pub fn glyph(brightness: u8, charset: CharsetMode) -> &'static str {
    GLYPH_TABLE[span(charset).start + bucket(brightness, charset)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CharsetMode; 5] = [
        CharsetMode::Simple,
        CharsetMode::Blocks,
        CharsetMode::Half,
        CharsetMode::Braille,
        CharsetMode::Art,
    ];

    #[test]
    fn bucket_counts() {
        let counts: Vec<usize> = ALL.iter().map(|&c| bucket_count(c)).collect();
        assert_eq!(counts, vec![9, 4, 4, 8, 9]);
    }

    #[test]
    fn spans_are_disjoint_and_cover_table() {
        let mut owned = [0u8; GLYPH_TABLE.len()];
        for charset in ALL {
            for i in span(charset) {
                owned[i] += 1;
            }
        }
        assert!(owned.iter().all(|&n| n == 1));
    }

    #[test]
    fn every_brightness_stays_in_range() {
        for charset in ALL {
            let range = span(charset);
            for b in 0..=255u8 {
                let g = glyph(b, charset);
                assert!(GLYPH_TABLE[range.clone()].contains(&g), "{charset} {b}");
                assert!(bucket(b, charset) < bucket_count(charset));
            }
        }
    }

    #[test]
    fn extremes_hit_first_and_last_bucket() {
        for charset in ALL {
            assert_eq!(bucket(0, charset), 0);
            assert_eq!(bucket(255, charset), bucket_count(charset) - 1);
        }
    }

    #[test]
    fn buckets_are_monotonic() {
        for charset in ALL {
            let mut prev = 0;
            for b in 0..=255u8 {
                let cur = bucket(b, charset);
                assert!(cur >= prev);
                prev = cur;
            }
        }
    }
}
