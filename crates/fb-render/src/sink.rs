use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use fb_core::frame::RenderedFrame;
use fb_core::traits::FrameSink;

/// Écrit chaque frame sur un terminal : efface l'écran, ramène le curseur
/// en haut à gauche, puis écrit les lignes.
///
/// Chaque ligne est positionnée explicitement (`MoveTo`) : en mode raw,
/// `\n` ne ramène pas le curseur en colonne 0.
///
/// # Example
/// ```
/// use fb_render::sink::TerminalSink;
/// use fb_core::frame::{FrameLine, RenderedFrame};
/// use fb_core::traits::FrameSink;
///
/// let mut sink = TerminalSink::new(Vec::new());
/// let frame = RenderedFrame { lines: vec![FrameLine { text: "ab".into(), directives: 0 }] };
/// sink.present(&frame).unwrap();
/// let out = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(out.ends_with("ab"));
/// ```
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    /// Wrap a writer, typically a locked or buffered stdout.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn present(&mut self, frame: &RenderedFrame) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for (row, line) in frame.lines.iter().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(self.out, MoveTo(0, row))?;
            self.out.write_all(line.text.as_bytes())?;
        }
        self.out.flush()
    }
}

/// Sink sans sortie : compte les frames, octets et directives.
///
/// Sert au mode benchmark et aux tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountingSink {
    /// Frames presented.
    pub frames: u64,
    /// Total frame bytes, newlines included.
    pub bytes: u64,
    /// Total directive emissions.
    pub directives: u64,
    /// Text of the last frame, when `keep_last` is set.
    pub last: Option<String>,
    keep_last: bool,
}

impl CountingSink {
    /// Counting sink that discards frame contents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counting sink that also keeps the text of the latest frame.
    #[must_use]
    pub fn keeping_last() -> Self {
        Self {
            keep_last: true,
            ..Self::default()
        }
    }
}

impl FrameSink for CountingSink {
    fn present(&mut self, frame: &RenderedFrame) -> io::Result<()> {
        self.frames += 1;
        self.bytes += frame.byte_len() as u64;
        self.directives += frame.directive_count() as u64;
        if self.keep_last {
            self.last = Some(frame.to_text());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::frame::FrameLine;

    fn frame(rows: &[&str]) -> RenderedFrame {
        RenderedFrame {
            lines: rows
                .iter()
                .map(|t| FrameLine {
                    text: (*t).to_string(),
                    directives: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn terminal_sink_clears_then_positions_rows() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.present(&frame(&["\x1b[31m##\x1b[0m", "..\x1b[0m"])).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        // clear, home, then one MoveTo per row (1-based in CSI)
        assert!(out.starts_with("\x1b[2J\x1b[1;1H"));
        assert!(out.contains("\x1b[1;1H\x1b[31m##\x1b[0m"));
        assert!(out.contains("\x1b[2;1H..\x1b[0m"));
    }

    #[test]
    fn counting_sink_accumulates() {
        let mut sink = CountingSink::keeping_last();
        sink.present(&frame(&["ab", "cd"])).unwrap();
        sink.present(&frame(&["x"])).unwrap();
        assert_eq!(sink.frames, 2);
        assert_eq!(sink.bytes, 6 + 2);
        assert_eq!(sink.directives, 3);
        assert_eq!(sink.last.as_deref(), Some("x\n"));
    }

    #[test]
    fn counting_sink_discards_by_default() {
        let mut sink = CountingSink::new();
        sink.present(&frame(&["ab"])).unwrap();
        assert!(sink.last.is_none());
    }
}
