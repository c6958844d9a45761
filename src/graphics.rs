//! Graphics support: the dual-plane logical frame buffer
//!
//! Drawing happens into two MSB-first bit-packed planes (black and
//! red/highlight) addressed in *logical* coordinates. Before anything
//! reaches the panel the buffers are materialized into the physical raster
//! order with [`Display::rotate_into`], or windowed out with
//! [`Display::window_bytes`] for partial refreshes.

use bit_field::BitField;

use crate::buffer_len;
use crate::color::Color;
use crate::rect::Rect;
use crate::rotation::DisplayRotation;

#[cfg(feature = "graphics")]
use crate::color::TriColor;
#[cfg(feature = "graphics")]
use embedded_graphics_core::prelude::*;

/// Identifies one of the two planes of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// The black/white plane
    Black,
    /// The red/highlight plane; unused by single-color panels but always
    /// present so the buffer handling stays uniform
    Red,
}

/// Errors from buffer-to-buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsError {
    /// The provided output buffer is too small for the requested extent.
    BufferTooSmall,
}

/// Frame buffer for one panel, holding both planes in logical coordinates.
///
/// - `WIDTH`/`HEIGHT`: *physical* panel dimensions
/// - `BYTECOUNT`: per-plane backing size, must be
///   [`rotated_buffer_len(WIDTH, HEIGHT)`](crate::rotated_buffer_len) so
///   every orientation fits (the strides of the two orientations round up
///   independently)
///
/// Planes start out all white; changing the rotation swaps the logical
/// dimensions and resets both planes to white, the hardware-side buffers
/// are untouched until the next display call.
pub struct Display<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize> {
    black: [u8; BYTECOUNT],
    red: [u8; BYTECOUNT],
    rotation: DisplayRotation,
}

/// Full-size display buffer for the 400x300 panel
pub type Display4in2 = Display<400, 300, { crate::rotated_buffer_len(400, 300) }>;

/// Full-size display buffer for the 128x296 panel
pub type Display2in9 = Display<128, 296, { crate::rotated_buffer_len(128, 296) }>;

impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize> Default
    for Display<WIDTH, HEIGHT, BYTECOUNT>
{
    // inline is necessary here to allow heap allocation via Box on stack
    // limited programs
    #[inline(always)]
    fn default() -> Self {
        Self {
            black: [Color::White.get_byte_value(); BYTECOUNT],
            red: [Color::White.get_byte_value(); BYTECOUNT],
            rotation: DisplayRotation::default(),
        }
    }
}

impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize>
    Display<WIDTH, HEIGHT, BYTECOUNT>
{
    /// Logical width, swapped against the physical one for 90°/270°.
    pub fn width(&self) -> u32 {
        self.rotation.logical_size(WIDTH, HEIGHT).0
    }

    /// Logical height.
    pub fn height(&self) -> u32 {
        self.rotation.logical_size(WIDTH, HEIGHT).1
    }

    /// Current rotation
    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    /// Set the display rotation.
    ///
    /// Changing the rotation swaps the logical dimensions and discards the
    /// drawn content, both planes come back blank (white). A full refresh
    /// is needed afterwards.
    pub fn set_rotation(&mut self, rotation: DisplayRotation) {
        if rotation == self.rotation {
            return;
        }
        self.rotation = rotation;
        self.clear();
    }

    /// Resets both planes to white.
    pub fn clear(&mut self) {
        self.black.fill(Color::White.get_byte_value());
        self.red.fill(Color::White.get_byte_value());
    }

    /// Fills one plane with a single color.
    pub fn fill(&mut self, plane: Plane, color: Color) {
        let len = self.logical_len();
        self.plane_mut(plane)[..len].fill(color.get_byte_value());
    }

    /// Sets one pixel, in logical coordinates.
    ///
    /// Out-of-bounds coordinates are silently ignored.
    pub fn set_pixel(&mut self, plane: Plane, x: u32, y: u32, color: Color) {
        let (width, height) = self.rotation.logical_size(WIDTH, HEIGHT);
        if x >= width || y >= height {
            return;
        }
        let stride = buffer_len(width as usize, 1);
        let index = y as usize * stride + x as usize / 8;
        self.plane_mut(plane)[index].set_bit(7 - (x as usize % 8), color.get_bit_value() != 0);
    }

    /// Reads one pixel, in logical coordinates.
    ///
    /// Out-of-bounds coordinates read as white.
    pub fn get_pixel(&self, plane: Plane, x: u32, y: u32) -> Color {
        let (width, height) = self.rotation.logical_size(WIDTH, HEIGHT);
        if x >= width || y >= height {
            return Color::White;
        }
        let stride = buffer_len(width as usize, 1);
        let index = y as usize * stride + x as usize / 8;
        if self.plane(plane)[index].get_bit(7 - (x as usize % 8)) {
            Color::White
        } else {
            Color::Black
        }
    }

    /// The bytes of one plane in the current logical layout.
    pub fn buffer(&self, plane: Plane) -> &[u8] {
        &self.plane(plane)[..self.logical_len()]
    }

    /// Materializes one plane into the physical raster order.
    ///
    /// `out` must hold at least `buffer_len(WIDTH, HEIGHT)` bytes; it is
    /// prefilled white and then only the non-white pixels are written
    /// through the rotation mapping, so the net result is a full overwrite
    /// of the used range. Logical and physical strides are computed
    /// independently; they differ whenever one dimension is not a multiple
    /// of 8.
    pub fn rotate_into(&self, plane: Plane, out: &mut [u8]) -> Result<(), GraphicsError> {
        let physical_len = buffer_len(WIDTH as usize, HEIGHT as usize);
        if out.len() < physical_len {
            return Err(GraphicsError::BufferTooSmall);
        }
        let out = &mut out[..physical_len];
        out.fill(Color::White.get_byte_value());

        if self.rotation == DisplayRotation::Rotate0 {
            out.copy_from_slice(self.buffer(plane));
            return Ok(());
        }

        let (width, height) = self.rotation.logical_size(WIDTH, HEIGHT);
        let physical_stride = buffer_len(WIDTH as usize, 1);
        for y in 0..height {
            for x in 0..width {
                if self.get_pixel(plane, x, y) == Color::Black {
                    let (px, py) = self.rotation.to_physical(x, y, width, height);
                    let index = py as usize * physical_stride + px as usize / 8;
                    out[index].set_bit(7 - (px as usize % 8), false);
                }
            }
        }
        Ok(())
    }

    /// Extracts a byte-aligned physical window from one plane, for the
    /// partial-refresh path.
    ///
    /// `window` is in physical coordinates and is byte-aligned before use;
    /// pass logical rectangles through
    /// [`DisplayRotation::transform_window`] first. `out` needs
    /// `(window.w / 8) * window.h` bytes after alignment. Window regions
    /// outside the raster read as white.
    pub fn window_bytes(
        &self,
        plane: Plane,
        window: Rect,
        out: &mut [u8],
    ) -> Result<Rect, GraphicsError> {
        let window = window.byte_aligned();
        let window_stride = (window.w / 8) as usize;
        let needed = window_stride * window.h as usize;
        if out.len() < needed {
            return Err(GraphicsError::BufferTooSmall);
        }
        let out = &mut out[..needed];
        out.fill(Color::White.get_byte_value());

        let (width, height) = self.rotation.logical_size(WIDTH, HEIGHT);
        for wy in 0..window.h {
            for wx in 0..window.w {
                let (px, py) = (window.x + wx, window.y + wy);
                if px >= WIDTH || py >= HEIGHT {
                    continue;
                }
                let (lx, ly) = self.rotation.to_logical(px, py, width, height);
                if self.get_pixel(plane, lx, ly) == Color::Black {
                    let index = wy as usize * window_stride + wx as usize / 8;
                    out[index].set_bit(7 - (wx as usize % 8), false);
                }
            }
        }
        Ok(window)
    }

    fn logical_len(&self) -> usize {
        let (width, height) = self.rotation.logical_size(WIDTH, HEIGHT);
        buffer_len(width as usize, height as usize)
    }

    fn plane(&self, plane: Plane) -> &[u8] {
        match plane {
            Plane::Black => &self.black,
            Plane::Red => &self.red,
        }
    }

    fn plane_mut(&mut self, plane: Plane) -> &mut [u8] {
        match plane {
            Plane::Black => &mut self.black,
            Plane::Red => &mut self.red,
        }
    }
}

#[cfg(feature = "graphics")]
impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize> DrawTarget
    for Display<WIDTH, HEIGHT, BYTECOUNT>
{
    type Color = TriColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            self.set_pixel(Plane::Black, x, y, color.black_plane());
            self.set_pixel(Plane::Red, x, y, color.red_plane());
        }
        Ok(())
    }
}

#[cfg(feature = "graphics")]
impl<const WIDTH: u32, const HEIGHT: u32, const BYTECOUNT: usize> OriginDimensions
    for Display<WIDTH, HEIGHT, BYTECOUNT>
{
    fn size(&self) -> Size {
        let (width, height) = self.rotation.logical_size(WIDTH, HEIGHT);
        Size::new(width, height)
    }
}
