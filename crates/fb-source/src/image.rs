use std::path::Path;

use anyhow::{Context, Result};
use fb_core::pixel::{Geometry, PixelFormat};

use crate::memory::MemorySource;

/// Charge une image (PNG, JPEG, BMP, GIF) comme source RGB888 statique.
///
/// Permet de visualiser le rendu sans framebuffer.
///
/// # Errors
/// Returns an error if the image cannot be loaded or decoded.
///
/// # Example
/// ```no_run
/// use fb_source::image::load_image;
/// use std::path::Path;
/// let source = load_image(Path::new("screenshot.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<MemorySource> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let geometry = Geometry::packed(width, height, 24, PixelFormat::Rgb888);
    log::debug!("Image {} : {width}×{height}", path.display());
    MemorySource::new(geometry, rgb.into_raw())
        .with_context(|| format!("Image vide : {}", path.display()))
}
