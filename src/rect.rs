//! Rectangle operations for partial-refresh windows

use core::cmp;

/// An axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Rect {
    /// Origin X
    pub x: u32,
    /// Origin Y
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Rect {
    /// Construct a new rectangle
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Rect {
        Rect { x, y, w, h }
    }

    /// Compute intersection with another rectangle
    pub fn intersect(&self, other: Rect) -> Rect {
        let x = cmp::max(self.x, other.x);
        let y = cmp::max(self.y, other.y);
        let w = cmp::min(self.x + self.w, other.x + other.w).saturating_sub(x);
        let h = cmp::min(self.y + self.h, other.y + other.h).saturating_sub(y);
        Rect { x, y, w, h }
    }

    /// Test whether the rectangle is empty.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Test whether `self` lies entirely within `other`.
    pub fn contained_in(&self, other: Rect) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.x + self.w <= other.x + other.w
            && self.y + self.h <= other.y + other.h
    }

    /// Aligns the horizontal extent to the controller's byte-wide column
    /// addressing.
    ///
    /// X moves down to the largest multiple of 8 not above it, the width up
    /// to the smallest multiple of 8 not below it; the rounding directions
    /// are fixed and not symmetric. Y and height are untouched, rows are
    /// addressed per pixel.
    pub fn byte_aligned(&self) -> Rect {
        Rect {
            x: self.x & !7,
            y: self.y,
            w: (self.w + 7) & !7,
            h: self.h,
        }
    }
}
