/// One output row: glyphs interleaved with color directives.
///
/// `directives` counts the directive pairs emitted in the row, the
/// trailing reset excluded.
///
/// # Example
/// ```
/// use fb_core::frame::FrameLine;
/// let line = FrameLine { text: "\x1b[31m##\x1b[0m".into(), directives: 1 };
/// assert_eq!(line.text.len(), 11);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameLine {
    /// Escape-coded text of the row, without the newline.
    pub text: String,
    /// Number of (fg, bg) directive emissions.
    pub directives: usize,
}

/// Un frame texte complet, construit à chaque itération puis consommé.
///
/// # Example
/// ```
/// use fb_core::frame::{FrameLine, RenderedFrame};
/// let frame = RenderedFrame {
///     lines: vec![
///         FrameLine { text: "ab".into(), directives: 0 },
///         FrameLine { text: "cd".into(), directives: 0 },
///     ],
/// };
/// assert_eq!(frame.to_text(), "ab\ncd\n");
/// assert_eq!(frame.byte_len(), 6);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedFrame {
    /// Lignes dans l'ordre d'affichage.
    pub lines: Vec<FrameLine>,
}

impl RenderedFrame {
    /// Total directive emissions over all rows.
    #[must_use]
    pub fn directive_count(&self) -> usize {
        self.lines.iter().map(|l| l.directives).sum()
    }

    /// Size of the frame once written, newlines included.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.lines.iter().map(|l| l.text.len() + 1).sum()
    }

    /// Concatenate all rows, each terminated by `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.byte_len());
        for line in &self.lines {
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }
}
