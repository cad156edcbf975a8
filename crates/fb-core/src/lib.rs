//! Configuration, types, and shared structures for fbscii.
//!
//! This crate contains the pixel format decoder, the display
//! configuration, the rendered frame type, the error taxonomy and the
//! traits shared across the fbscii workspace.

pub mod config;
pub mod error;
pub mod frame;
pub mod pixel;
pub mod traits;

pub use config::{CharsetMode, ColorMode, DisplayConfig, Region};
pub use error::CoreError;
pub use frame::{FrameLine, RenderedFrame};
pub use pixel::{Geometry, PixelFormat};
pub use traits::{CancelSource, FrameSink, PixelSource};
