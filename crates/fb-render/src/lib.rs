//! Terminal output for fbscii.
//!
//! Provides the frame sinks, terminal state guard and FPS tracking.

pub mod fps;
pub mod sink;
pub mod terminal;

pub use fps::{CaptureStats, FpsCounter};
pub use sink::{CountingSink, TerminalSink};
pub use terminal::TerminalGuard;
