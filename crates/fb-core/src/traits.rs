use crate::error::CoreError;
use crate::frame::RenderedFrame;
use crate::pixel::Geometry;

/// Fournit des pixels au pipeline, lus par coordonnée.
///
/// Implémenté par : `FramebufferSource`, `MemorySource`.
///
/// # Example
/// ```
/// use fb_core::traits::PixelSource;
/// use fb_core::pixel::{Geometry, PixelFormat};
/// use fb_core::CoreError;
///
/// struct Flat;
/// impl PixelSource for Flat {
///     fn geometry(&self) -> Geometry { Geometry::packed(1, 1, 24, PixelFormat::Rgb888) }
///     fn read_pixel(&self, _x: u32, _y: u32) -> Result<(u8, u8, u8), CoreError> { Ok((1, 2, 3)) }
///     fn close(&mut self) {}
/// }
/// assert_eq!(Flat.width(), 1);
/// ```
pub trait PixelSource: Send {
    /// Dimensions, stride and format of the source.
    fn geometry(&self) -> Geometry;

    /// Decode pixel (x, y) into `(r, g, b)`.
    ///
    /// # Errors
    /// [`CoreError::OutOfBounds`] outside `[0, width) × [0, height)`, or
    /// when the source has already been closed.
    fn read_pixel(&self, x: u32, y: u32) -> Result<(u8, u8, u8), CoreError>;

    /// Release the underlying resources. Idempotent.
    fn close(&mut self);

    /// Width in pixels.
    fn width(&self) -> u32 {
        self.geometry().width
    }

    /// Height in pixels.
    fn height(&self) -> u32 {
        self.geometry().height
    }
}

impl<S: PixelSource + ?Sized> PixelSource for Box<S> {
    fn geometry(&self) -> Geometry {
        (**self).geometry()
    }

    fn read_pixel(&self, x: u32, y: u32) -> Result<(u8, u8, u8), CoreError> {
        (**self).read_pixel(x, y)
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// Consomme les frames rendus (terminal, compteur, tests).
pub trait FrameSink {
    /// Present one frame, replacing the previous one.
    ///
    /// # Errors
    /// Returns an error if the frame cannot be written.
    fn present(&mut self, frame: &RenderedFrame) -> std::io::Result<()>;
}

/// Non-blocking quit query, polled once per capture iteration.
pub trait CancelSource {
    /// `true` once a quit request is pending. Must never block.
    fn quit_requested(&mut self) -> bool;
}
