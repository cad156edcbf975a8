//! Pixel → text conversion engine for fbscii.
//!
//! Quantizes colors to terminal directives, picks density glyphs and
//! composes escape-coded frames.

pub mod color_map;
pub mod compositor;
pub mod dither;
pub mod glyph;
pub mod luminance;

pub use color_map::{Directive, Layer, bg_directive, fg_directive};
pub use compositor::{CaptureRect, render, resolve_region};
pub use glyph::glyph;
