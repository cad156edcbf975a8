//! Pixel sources for fbscii (framebuffer device, raw memory, image file).

pub mod framebuffer;
pub mod memory;

#[cfg(feature = "image-source")]
pub mod image;

pub use framebuffer::FramebufferSource;
pub use memory::MemorySource;
