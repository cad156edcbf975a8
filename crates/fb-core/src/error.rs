use thiserror::Error;

/// Errors originating from the core module.
///
/// Covers the whole capture session: device access, region resolution,
/// per-pixel reads and frame construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// No such device or path.
    #[error("Périphérique introuvable : {path}")]
    DeviceUnavailable {
        /// Device path that was not found.
        path: String,
    },

    /// Open or mmap was refused by the OS.
    #[error("Accès refusé : {path}")]
    PermissionDenied {
        /// Device path.
        path: String,
    },

    /// Screen geometry query failed.
    #[error("Lecture de la géométrie impossible ({path}) : {reason}")]
    QueryFailed {
        /// Device path.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// Read-only memory mapping failed.
    #[error("Mapping mémoire impossible ({path}) : {reason}")]
    MapFailed {
        /// Device path.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// Capture sub-region is empty after clamping to the source bounds.
    #[error("Région invalide : origine ({x}, {y}), étendue {width}×{height}")]
    InvalidRegion {
        /// Requested origin x.
        x: u32,
        /// Requested origin y.
        y: u32,
        /// Requested width (0 = full source).
        width: u32,
        /// Requested height (0 = full source).
        height: u32,
    },

    /// Pixel coordinate outside the source extent.
    #[error("Pixel hors limites : ({x}, {y})")]
    OutOfBounds {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },

    /// Frame text buffer could not be reserved.
    #[error("Allocation du frame impossible ({bytes} octets)")]
    AllocationFailed {
        /// Requested size.
        bytes: usize,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}

impl CoreError {
    /// `true` for errors that only abort the current render call.
    ///
    /// # Example
    /// ```
    /// use fb_core::CoreError;
    /// let e = CoreError::InvalidRegion { x: 5, y: 5, width: 0, height: 0 };
    /// assert!(e.is_transient());
    /// assert!(!CoreError::AllocationFailed { bytes: 1 }.is_transient());
    /// ```
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::InvalidRegion { .. })
    }
}
