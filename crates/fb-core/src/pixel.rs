use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Layout of one pixel in a raw framebuffer.
///
/// # Example
/// ```
/// use fb_core::pixel::PixelFormat;
/// assert_eq!(PixelFormat::from_layout(16, 11, 5, 0), PixelFormat::Rgb565);
/// assert_eq!(PixelFormat::Rgb565.decode(&[0x00, 0xF8]), (248, 0, 0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 16 bits little-endian, 5/6/5.
    Rgb565,
    /// 3 bytes r, g, b.
    Rgb888,
    /// 3 bytes b, g, r.
    Bgr888,
    /// 4 bytes r, g, b, a (alpha ignoré).
    Rgba8888,
    /// 4 bytes b, g, r, a (alpha ignoré).
    Bgra8888,
    /// Layout inconnu : le premier octet est lu comme niveau de gris.
    #[default]
    Unknown,
}

impl PixelFormat {
    /// Derive the format from the bit depth and channel bit offsets
    /// reported by the device.
    ///
    /// 24 bpp is always reported as BGR888 (device convention, not queried).
    ///
    /// # Example
    /// ```
    /// use fb_core::pixel::PixelFormat;
    /// assert_eq!(PixelFormat::from_layout(32, 16, 8, 0), PixelFormat::Rgba8888);
    /// assert_eq!(PixelFormat::from_layout(32, 0, 8, 16), PixelFormat::Bgra8888);
    /// assert_eq!(PixelFormat::from_layout(32, 24, 16, 8), PixelFormat::Unknown);
    /// assert_eq!(PixelFormat::from_layout(24, 0, 0, 0), PixelFormat::Bgr888);
    /// assert_eq!(PixelFormat::from_layout(8, 0, 0, 0), PixelFormat::Unknown);
    /// ```
    #[must_use]
    pub fn from_layout(bpp: u32, red_offset: u32, green_offset: u32, blue_offset: u32) -> Self {
        match (bpp, red_offset, green_offset, blue_offset) {
            (32, 16, 8, 0) => Self::Rgba8888,
            (32, 0, 8, 16) => Self::Bgra8888,
            (24, ..) => Self::Bgr888,
            (16, ..) => Self::Rgb565,
            _ => Self::Unknown,
        }
    }

    /// Number of bytes the decoder reads for one pixel.
    #[must_use]
    pub const fn decoded_len(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Rgb888 | Self::Bgr888 | Self::Rgba8888 | Self::Bgra8888 => 3,
            Self::Unknown => 1,
        }
    }

    /// Decode one pixel into an 8-bit `(r, g, b)` triple.
    ///
    /// `bytes` must hold at least [`decoded_len`](Self::decoded_len) bytes;
    /// missing bytes read as zero.
    #[inline(always)]
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> (u8, u8, u8) {
        let at = |i: usize| bytes.get(i).copied().unwrap_or(0);
        match self {
            Self::Rgb565 => {
                let v = u16::from_le_bytes([at(0), at(1)]);
                let r = ((v >> 11) & 0x1F) as u8;
                let g = ((v >> 5) & 0x3F) as u8;
                let b = (v & 0x1F) as u8;
                (r << 3, g << 2, b << 3)
            }
            Self::Rgb888 | Self::Rgba8888 => (at(0), at(1), at(2)),
            Self::Bgr888 | Self::Bgra8888 => (at(2), at(1), at(0)),
            Self::Unknown => {
                let v = at(0);
                (v, v, v)
            }
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rgb565 => "rgb565",
            Self::Rgb888 => "rgb888",
            Self::Bgr888 => "bgr888",
            Self::Rgba8888 => "rgba8888",
            Self::Bgra8888 => "bgra8888",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb565" => Ok(Self::Rgb565),
            "rgb888" => Ok(Self::Rgb888),
            "bgr888" => Ok(Self::Bgr888),
            "rgba8888" => Ok(Self::Rgba8888),
            "bgra8888" => Ok(Self::Bgra8888),
            "unknown" | "gray" => Ok(Self::Unknown),
            other => Err(CoreError::Config(format!(
                "format de pixel inconnu '{other}' (rgb565, rgb888, bgr888, rgba8888, bgra8888, unknown)"
            ))),
        }
    }
}

/// Geometry of a raw pixel buffer.
///
/// `line_length` is the scanline stride in bytes and may exceed
/// `width * bytes_per_pixel` because of padding.
///
/// # Example
/// ```
/// use fb_core::pixel::{Geometry, PixelFormat};
/// let geo = Geometry::packed(4, 2, 24, PixelFormat::Rgb888);
/// assert_eq!(geo.line_length, 12);
/// assert_eq!(geo.required_len(), 24);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per scanline.
    pub line_length: u32,
    /// Bit depth reported by the device.
    pub bits_per_pixel: u32,
    /// Channel layout.
    pub format: PixelFormat,
}

impl Geometry {
    /// Geometry of a buffer without scanline padding.
    #[must_use]
    pub fn packed(width: u32, height: u32, bits_per_pixel: u32, format: PixelFormat) -> Self {
        let bpp = (bits_per_pixel / 8).max(1);
        Self {
            width,
            height,
            line_length: width * bpp,
            bits_per_pixel,
            format,
        }
    }

    /// `bits_per_pixel / 8`, never less than one byte.
    #[inline(always)]
    #[must_use]
    pub fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel as usize / 8).max(1)
    }

    /// Minimum buffer size covering every scanline.
    #[must_use]
    pub fn required_len(&self) -> usize {
        self.line_length as usize * self.height as usize
    }

    /// Byte offset of pixel (x, y) inside a buffer of `buf_len` bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::OutOfBounds`] if the coordinate lies outside
    /// `[0, width) × [0, height)` or the pixel would run past the buffer.
    #[inline(always)]
    pub fn pixel_offset(&self, x: u32, y: u32, buf_len: usize) -> Result<usize, CoreError> {
        if x >= self.width || y >= self.height {
            return Err(CoreError::OutOfBounds { x, y });
        }
        let offset =
            y as usize * self.line_length as usize + x as usize * self.bytes_per_pixel();
        if offset + self.format.decoded_len() > buf_len {
            return Err(CoreError::OutOfBounds { x, y });
        }
        Ok(offset)
    }

    /// Decode pixel (x, y) from `bytes`.
    ///
    /// # Errors
    /// Returns [`CoreError::OutOfBounds`] for coordinates outside the source.
    ///
    /// # Example
    /// ```
    /// use fb_core::pixel::{Geometry, PixelFormat};
    /// let geo = Geometry::packed(2, 1, 24, PixelFormat::Bgr888);
    /// let bytes = [1, 2, 3, 30, 20, 10];
    /// assert_eq!(geo.read_pixel(&bytes, 1, 0).unwrap(), (10, 20, 30));
    /// assert!(geo.read_pixel(&bytes, 2, 0).is_err());
    /// ```
    #[inline(always)]
    pub fn read_pixel(&self, bytes: &[u8], x: u32, y: u32) -> Result<(u8, u8, u8), CoreError> {
        let offset = self.pixel_offset(x, y, bytes.len())?;
        Ok(self.format.decode(&bytes[offset..]))
    }
}
