use std::path::Path;

use anyhow::Result;
use fb_core::config::DisplayConfig;
use fb_core::traits::PixelSource;
use fb_source::framebuffer::FramebufferSource;
use fb_source::memory::MemorySource;

/// Ouvre la source de pixels de la session.
///
/// Avec `image`, la source est l'image décodée (feature `image-source`) ;
/// sinon le framebuffer `config.device`. `config.pixel_format` remplace
/// le format déduit dans les deux cas.
///
/// # Errors
/// Propagates the [`CoreError`](fb_core::CoreError) from the device open,
/// or the decode error for an image.
pub fn open_source(image: Option<&Path>, config: &DisplayConfig) -> Result<Box<dyn PixelSource>> {
    if let Some(path) = image {
        let mut source = load_image(path)?;
        if let Some(format) = config.pixel_format {
            source.set_format(format);
        }
        return Ok(Box::new(source));
    }

    let mut fb = FramebufferSource::open(&config.device)?;
    if let Some(format) = config.pixel_format {
        fb.set_format(format);
    }
    Ok(Box::new(fb))
}

#[cfg(feature = "image-source")]
fn load_image(path: &Path) -> Result<MemorySource> {
    fb_source::image::load_image(path)
}

#[cfg(not(feature = "image-source"))]
fn load_image(path: &Path) -> Result<MemorySource> {
    anyhow::bail!(
        "{} : support image désactivé (feature image-source)",
        path.display()
    )
}

/// Dégradé RGB888 synthétique, utilisé quand aucun framebuffer n'est
/// accessible en mode benchmark.
#[must_use]
pub fn synthetic_source(width: u32, height: u32) -> MemorySource {
    let (w, h) = (width.max(1), height.max(1));
    MemorySource::from_fn(w, h, |x, y| {
        let r = (x * 255 / w) as u8;
        let g = (y * 255 / h) as u8;
        let b = ((x ^ y) & 0xFF) as u8;
        (r, g, b)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::CoreError;

    #[test]
    fn missing_device_surfaces_core_error() {
        let config = DisplayConfig {
            device: "/nonexistent/fb7".into(),
            ..Default::default()
        };
        let err = open_source(None, &config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::DeviceUnavailable { .. })
        ));
    }

    #[test]
    fn synthetic_source_has_requested_extent() {
        let src = synthetic_source(320, 200);
        assert_eq!((src.width(), src.height()), (320, 200));
        assert_eq!(src.read_pixel(0, 0).unwrap(), (0, 0, 0));
    }
}
