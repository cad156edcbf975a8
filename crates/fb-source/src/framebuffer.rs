use std::fs::File;
use std::io;
use std::path::Path;

use fb_core::error::CoreError;
use fb_core::pixel::{Geometry, PixelFormat};
use fb_core::traits::PixelSource;

/// Source framebuffer Linux (`/dev/fbN`), mappée en lecture seule.
///
/// La géométrie et le format de pixel sont lus via `FBIOGET_FSCREENINFO`
/// et `FBIOGET_VSCREENINFO`. Le mapping et le descripteur sont libérés
/// exactement une fois, par [`close`](PixelSource::close) ou au drop.
///
/// # Example
/// ```no_run
/// use fb_source::framebuffer::FramebufferSource;
/// use fb_core::traits::PixelSource;
/// use std::path::Path;
/// let mut fb = FramebufferSource::open(Path::new("/dev/fb0")).unwrap();
/// let (r, g, b) = fb.read_pixel(0, 0).unwrap();
/// fb.close();
/// ```
pub struct FramebufferSource {
    path: String,
    geometry: Geometry,
    #[cfg(target_os = "linux")]
    mapping: Option<sys::Mapping>,
    file: Option<File>,
}

impl FramebufferSource {
    /// Open a framebuffer device, query its geometry and map it read-only.
    ///
    /// # Errors
    /// - [`CoreError::DeviceUnavailable`] when the path does not exist.
    /// - [`CoreError::PermissionDenied`] when open or mmap is refused.
    /// - [`CoreError::QueryFailed`] when the geometry ioctls fail.
    /// - [`CoreError::MapFailed`] when the mapping fails.
    #[cfg(target_os = "linux")]
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|e| open_error(&display, &e))?;

        let screen = sys::query(&file).map_err(|e| CoreError::QueryFailed {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let bpp = screen.var.bits_per_pixel;
        let format = PixelFormat::from_layout(
            bpp,
            screen.var.red.offset,
            screen.var.green.offset,
            screen.var.blue.offset,
        );
        let geometry = Geometry {
            width: screen.var.xres,
            height: screen.var.yres,
            line_length: screen.fix.line_length,
            bits_per_pixel: bpp,
            format,
        };
        if geometry.width == 0 || geometry.height == 0 {
            return Err(CoreError::QueryFailed {
                path: display,
                reason: format!("géométrie vide {}×{}", geometry.width, geometry.height),
            });
        }

        let map_len = if screen.fix.smem_len > 0 {
            screen.fix.smem_len as usize
        } else {
            geometry.required_len()
        };
        if map_len < geometry.required_len() {
            log::warn!(
                "{display} : buffer de {map_len} octets < {} attendus, les dernières lignes liront hors limites",
                geometry.required_len()
            );
        }

        let mapping = sys::Mapping::map_readonly(&file, map_len).map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                CoreError::PermissionDenied {
                    path: display.clone(),
                }
            } else {
                CoreError::MapFailed {
                    path: display.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        log::debug!(
            "Framebuffer {display} : {}×{}, {bpp} bpp, stride {}, format {format}, {map_len} octets mappés",
            geometry.width,
            geometry.height,
            geometry.line_length
        );

        Ok(Self {
            path: display,
            geometry,
            mapping: Some(mapping),
            file: Some(file),
        })
    }

    /// Framebuffer devices only exist on Linux.
    ///
    /// # Errors
    /// Always [`CoreError::DeviceUnavailable`].
    #[cfg(not(target_os = "linux"))]
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        Err(CoreError::DeviceUnavailable {
            path: path.display().to_string(),
        })
    }

    /// Override the pixel format derived from the device metadata.
    pub fn set_format(&mut self, format: PixelFormat) {
        if format != self.geometry.format {
            log::debug!(
                "{} : format {} remplacé par {format}",
                self.path,
                self.geometry.format
            );
            self.geometry.format = format;
        }
    }

    #[cfg(target_os = "linux")]
    fn bytes(&self) -> &[u8] {
        match &self.mapping {
            Some(mapping) => mapping.as_slice(),
            None => &[],
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn bytes(&self) -> &[u8] {
        &[]
    }
}

impl PixelSource for FramebufferSource {
    fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    fn read_pixel(&self, x: u32, y: u32) -> Result<(u8, u8, u8), CoreError> {
        self.geometry.read_pixel(self.bytes(), x, y)
    }

    fn close(&mut self) {
        #[cfg(target_os = "linux")]
        {
            // unmap before closing the descriptor
            drop(self.mapping.take());
        }
        if self.file.take().is_some() {
            log::debug!("Framebuffer {} fermé", self.path);
        }
    }
}

impl Drop for FramebufferSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(target_os = "linux")]
fn open_error(path: &str, e: &io::Error) -> CoreError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => CoreError::PermissionDenied {
            path: path.to_string(),
        },
        _ => CoreError::DeviceUnavailable {
            path: path.to_string(),
        },
    }
}

/// Raw ioctl and mmap plumbing for `linux/fb.h`.
#[cfg(target_os = "linux")]
mod sys {
    #![allow(unsafe_code)]

    use std::fs::File;
    use std::io;
    use std::os::fd::AsRawFd;
    use std::ptr::NonNull;

    const FBIOGET_VSCREENINFO: u32 = 0x4600;
    const FBIOGET_FSCREENINFO: u32 = 0x4602;

    #[repr(C)]
    #[derive(Default, Clone, Copy)]
    pub struct FbBitfield {
        pub offset: u32,
        pub length: u32,
        pub msb_right: u32,
    }

    #[repr(C)]
    #[derive(Default, Clone, Copy)]
    pub struct FbFixScreeninfo {
        pub id: [u8; 16],
        pub smem_start: libc::c_ulong,
        pub smem_len: u32,
        pub type_: u32,
        pub type_aux: u32,
        pub visual: u32,
        pub xpanstep: u16,
        pub ypanstep: u16,
        pub ywrapstep: u16,
        pub line_length: u32,
        pub mmio_start: libc::c_ulong,
        pub mmio_len: u32,
        pub accel: u32,
        pub capabilities: u16,
        pub reserved: [u16; 2],
    }

    #[repr(C)]
    #[derive(Default, Clone, Copy)]
    pub struct FbVarScreeninfo {
        pub xres: u32,
        pub yres: u32,
        pub xres_virtual: u32,
        pub yres_virtual: u32,
        pub xoffset: u32,
        pub yoffset: u32,
        pub bits_per_pixel: u32,
        pub grayscale: u32,
        pub red: FbBitfield,
        pub green: FbBitfield,
        pub blue: FbBitfield,
        pub transp: FbBitfield,
        pub nonstd: u32,
        pub activate: u32,
        pub height: u32,
        pub width: u32,
        pub accel_flags: u32,
        pub pixclock: u32,
        pub left_margin: u32,
        pub right_margin: u32,
        pub upper_margin: u32,
        pub lower_margin: u32,
        pub hsync_len: u32,
        pub vsync_len: u32,
        pub sync: u32,
        pub vmode: u32,
        pub rotate: u32,
        pub colorspace: u32,
        pub reserved: [u32; 4],
    }

    pub struct ScreenInfo {
        pub fix: FbFixScreeninfo,
        pub var: FbVarScreeninfo,
    }

    /// Query fixed then variable screen info.
    pub fn query(file: &File) -> io::Result<ScreenInfo> {
        let fd = file.as_raw_fd();
        let mut fix = FbFixScreeninfo::default();
        let mut var = FbVarScreeninfo::default();
        // SAFETY: both structs are repr(C) mirrors of linux/fb.h and live
        // for the duration of the call.
        unsafe {
            if libc::ioctl(fd, FBIOGET_FSCREENINFO as _, &raw mut fix) < 0 {
                return Err(io::Error::last_os_error());
            }
            if libc::ioctl(fd, FBIOGET_VSCREENINFO as _, &raw mut var) < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(ScreenInfo { fix, var })
    }

    /// Read-only shared mapping, unmapped on drop.
    pub struct Mapping {
        ptr: NonNull<u8>,
        len: usize,
    }

    // The region is mapped PROT_READ and never written from this process.
    unsafe impl Send for Mapping {}

    impl Mapping {
        pub fn map_readonly(file: &File, len: usize) -> io::Result<Self> {
            if len == 0 {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "longueur nulle"));
            }
            // SAFETY: fresh mapping chosen by the kernel; fd is valid for the call.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    len,
                    libc::PROT_READ,
                    libc::MAP_SHARED,
                    file.as_raw_fd(),
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }
            let ptr = NonNull::new(ptr.cast::<u8>())
                .ok_or_else(|| io::Error::other("mmap a retourné NULL"))?;
            Ok(Self { ptr, len })
        }

        pub fn as_slice(&self) -> &[u8] {
            // SAFETY: ptr/len describe a live PROT_READ mapping owned by self.
            unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
        }
    }

    impl Drop for Mapping {
        fn drop(&mut self) {
            // SAFETY: unmapping exactly the region returned by mmap, once.
            unsafe {
                libc::munmap(self.ptr.as_ptr().cast(), self.len);
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn struct_sizes_match_kernel_abi() {
            assert_eq!(std::mem::size_of::<FbVarScreeninfo>(), 160);
            #[cfg(target_pointer_width = "64")]
            assert_eq!(std::mem::size_of::<FbFixScreeninfo>(), 80);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_device_is_unavailable() {
        let err = FramebufferSource::open(Path::new("/nonexistent/fb9")).err();
        assert!(matches!(err, Some(CoreError::DeviceUnavailable { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn regular_file_fails_geometry_query() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = FramebufferSource::open(file.path()).err();
        assert!(matches!(err, Some(CoreError::QueryFailed { .. })), "{err:?}");
    }
}
