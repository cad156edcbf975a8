use fb_core::error::CoreError;
use fb_core::pixel::{Geometry, PixelFormat};
use fb_core::traits::PixelSource;

/// Source de pixels sur un buffer possédé, même décodage qu'un framebuffer.
///
/// # Example
/// ```
/// use fb_source::memory::MemorySource;
/// use fb_core::traits::PixelSource;
/// let src = MemorySource::from_fn(4, 4, |x, y| ((x * 10) as u8, (y * 10) as u8, 0));
/// assert_eq!(src.read_pixel(3, 2).unwrap(), (30, 20, 0));
/// ```
pub struct MemorySource {
    data: Vec<u8>,
    geometry: Geometry,
    closed: bool,
}

impl MemorySource {
    /// Wrap a raw buffer laid out according to `geometry`.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] for an empty extent, or
    /// [`CoreError::Config`] when `data` is shorter than
    /// `line_length * height`.
    pub fn new(geometry: Geometry, data: Vec<u8>) -> Result<Self, CoreError> {
        if geometry.width == 0 || geometry.height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: geometry.width,
                height: geometry.height,
            });
        }
        if data.len() < geometry.required_len() {
            return Err(CoreError::Config(format!(
                "buffer de {} octets, {} requis pour {}×{} (stride {})",
                data.len(),
                geometry.required_len(),
                geometry.width,
                geometry.height,
                geometry.line_length
            )));
        }
        Ok(Self {
            data,
            geometry,
            closed: false,
        })
    }

    /// Build a packed RGB888 source from a per-pixel color function.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> (u8, u8, u8)) -> Self {
        let geometry = Geometry::packed(width, height, 24, PixelFormat::Rgb888);
        let mut data = Vec::with_capacity(geometry.required_len());
        for y in 0..height {
            for x in 0..width {
                let (r, g, b) = f(x, y);
                data.extend_from_slice(&[r, g, b]);
            }
        }
        Self {
            data,
            geometry,
            closed: false,
        }
    }

    /// Uniform RGB888 source.
    ///
    /// # Example
    /// ```
    /// use fb_source::memory::MemorySource;
    /// use fb_core::traits::PixelSource;
    /// let src = MemorySource::solid(4, 4, (255, 0, 0));
    /// assert_eq!(src.read_pixel(0, 3).unwrap(), (255, 0, 0));
    /// ```
    #[must_use]
    pub fn solid(width: u32, height: u32, rgb: (u8, u8, u8)) -> Self {
        Self::from_fn(width, height, |_, _| rgb)
    }

    /// Replace the derived pixel format, keeping stride and depth.
    pub fn set_format(&mut self, format: PixelFormat) {
        self.geometry.format = format;
    }

    /// `true` until [`close`](PixelSource::close) is called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.closed
    }
}

impl PixelSource for MemorySource {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    fn read_pixel(&self, x: u32, y: u32) -> Result<(u8, u8, u8), CoreError> {
        if self.closed {
            return Err(CoreError::OutOfBounds { x, y });
        }
        self.geometry.read_pixel(&self.data, x, y)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.data = Vec::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        let geo = Geometry::packed(4, 4, 32, PixelFormat::Bgra8888);
        assert!(MemorySource::new(geo, vec![0; 63]).is_err());
        assert!(MemorySource::new(geo, vec![0; 64]).is_ok());
    }

    #[test]
    fn rejects_empty_extent() {
        let geo = Geometry::packed(0, 4, 16, PixelFormat::Rgb565);
        assert!(matches!(
            MemorySource::new(geo, vec![]),
            Err(CoreError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn rgb565_fixture() {
        let geo = Geometry::packed(2, 1, 16, PixelFormat::Rgb565);
        let src = MemorySource::new(geo, vec![0x00, 0xF8, 0x1F, 0x00]).unwrap();
        assert_eq!(src.read_pixel(0, 0).unwrap(), (248, 0, 0));
        assert_eq!(src.read_pixel(1, 0).unwrap(), (0, 0, 248));
    }

    #[test]
    fn format_override_changes_decode() {
        let geo = Geometry::packed(1, 1, 24, PixelFormat::Bgr888);
        let mut src = MemorySource::new(geo, vec![1, 2, 3]).unwrap();
        assert_eq!(src.read_pixel(0, 0).unwrap(), (3, 2, 1));
        src.set_format(PixelFormat::Rgb888);
        assert_eq!(src.read_pixel(0, 0).unwrap(), (1, 2, 3));
    }

    #[test]
    fn close_is_idempotent_and_blocks_reads() {
        let mut src = MemorySource::solid(2, 2, (1, 1, 1));
        src.close();
        src.close();
        assert!(!src.is_open());
        assert!(src.read_pixel(0, 0).is_err());
    }
}
