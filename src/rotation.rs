//! Mapping between logical (application-facing) and physical (hardware
//! raster) coordinates
//!
//! Drawing happens in the logical space, which may be rotated in 90°
//! increments relative to the panel raster. The panel itself only ever sees
//! physical coordinates; everything that reaches the hardware goes through
//! the mappings in this module first.

use crate::rect::Rect;

/// Display rotation, only 90° increments supported, always clockwise from
/// the physical origin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate by 90 degrees clockwise
    Rotate90,
    /// Rotate by 180 degrees clockwise
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

impl DisplayRotation {
    /// Nearest supported rotation for an arbitrary angle in degrees.
    ///
    /// Angles are taken modulo 360 and rounded to the nearest of the four
    /// supported values instead of raising an error; 45° rounds up to 90°.
    pub fn from_degrees(degrees: u16) -> Self {
        match ((degrees as u32 + 45) / 90) % 4 {
            0 => DisplayRotation::Rotate0,
            1 => DisplayRotation::Rotate90,
            2 => DisplayRotation::Rotate180,
            _ => DisplayRotation::Rotate270,
        }
    }

    /// Whether this rotation swaps width and height of the logical space.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, DisplayRotation::Rotate90 | DisplayRotation::Rotate270)
    }

    /// Logical dimensions for a panel with the given physical dimensions.
    pub fn logical_size(self, physical_width: u32, physical_height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (physical_height, physical_width)
        } else {
            (physical_width, physical_height)
        }
    }

    /// Maps a logical pixel to its physical raster position.
    ///
    /// `logical_width` and `logical_height` are the dimensions of the
    /// logical space the input coordinates live in; the input must be in
    /// bounds.
    pub fn to_physical(
        self,
        x: u32,
        y: u32,
        logical_width: u32,
        logical_height: u32,
    ) -> (u32, u32) {
        match self {
            DisplayRotation::Rotate0 => (x, y),
            DisplayRotation::Rotate90 => (y, logical_width - 1 - x),
            DisplayRotation::Rotate180 => {
                (logical_width - 1 - x, logical_height - 1 - y)
            }
            DisplayRotation::Rotate270 => (logical_height - 1 - y, x),
        }
    }

    /// Maps a physical raster position back to its logical pixel.
    ///
    /// Exact inverse of [`to_physical`](DisplayRotation::to_physical) for
    /// in-bounds coordinates.
    pub fn to_logical(
        self,
        x: u32,
        y: u32,
        logical_width: u32,
        logical_height: u32,
    ) -> (u32, u32) {
        match self {
            DisplayRotation::Rotate0 => (x, y),
            DisplayRotation::Rotate90 => (logical_width - 1 - y, x),
            DisplayRotation::Rotate180 => {
                (logical_width - 1 - x, logical_height - 1 - y)
            }
            DisplayRotation::Rotate270 => (y, logical_height - 1 - x),
        }
    }

    /// Maps an axis-aligned rectangle from logical to physical space.
    ///
    /// Transforms two opposite corners and renormalizes, so the result is
    /// again axis-aligned with non-negative extent. This is the step that
    /// has to run on every window before it may be handed to the partial
    /// refresh path.
    pub fn transform_window(
        self,
        window: Rect,
        logical_width: u32,
        logical_height: u32,
    ) -> Rect {
        if window.is_empty() {
            return Rect::new(0, 0, 0, 0);
        }
        let (x0, y0) = self.to_physical(window.x, window.y, logical_width, logical_height);
        let (x1, y1) = self.to_physical(
            window.x + window.w - 1,
            window.y + window.h - 1,
            logical_width,
            logical_height,
        );
        let x = x0.min(x1);
        let y = y0.min(y1);
        Rect::new(x, y, x0.max(x1) - x + 1, y0.max(y1) - y + 1)
    }
}
