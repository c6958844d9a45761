//! Color types for the panels
//!
//! On this controller family a set bit is an unlit ("white") pixel, so a
//! buffer byte of `0xFF` is a run of 8 white pixels. Getting this polarity
//! backwards inverts the whole image without any error signal, which is why
//! the convention is pinned down here and nowhere else.

#[cfg(feature = "graphics")]
use embedded_graphics_core::pixelcolor::BinaryColor;
#[cfg(feature = "graphics")]
use embedded_graphics_core::prelude::*;

/// A pixel on a single monochrome plane
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    /// Unset pixel (bit value 1); the default after a clear
    White,
    /// Set pixel (bit value 0)
    Black,
}

impl Color {
    /// Bit encoding of the color inside a packed byte
    pub fn get_bit_value(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 0,
        }
    }

    /// A full byte of this color, for plane fills
    pub fn get_byte_value(self) -> u8 {
        match self {
            Color::White => 0xFF,
            Color::Black => 0x00,
        }
    }

    /// The opposite color
    pub fn inverse(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl From<u8> for Color {
    fn from(value: u8) -> Self {
        match value {
            0 => Color::Black,
            1 => Color::White,
            e => panic!("Color only parses 0 and 1 (Black and White) and not `{}`", e),
        }
    }
}

#[cfg(feature = "graphics")]
impl PixelColor for Color {
    type Raw = ();
}

#[cfg(feature = "graphics")]
impl From<BinaryColor> for Color {
    fn from(b: BinaryColor) -> Color {
        match b {
            BinaryColor::On => Color::Black,
            BinaryColor::Off => Color::White,
        }
    }
}

/// A pixel across both planes of a black/red panel
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TriColor {
    /// Neither plane set
    White,
    /// Set on the black plane
    Black,
    /// Set on the red/highlight plane; takes precedence over black
    Chromatic,
}

impl TriColor {
    /// Color the black plane sees
    pub fn black_plane(self) -> Color {
        match self {
            TriColor::Black => Color::Black,
            _ => Color::White,
        }
    }

    /// Color the red plane sees
    pub fn red_plane(self) -> Color {
        match self {
            TriColor::Chromatic => Color::Black,
            _ => Color::White,
        }
    }
}

#[cfg(feature = "graphics")]
impl PixelColor for TriColor {
    type Raw = ();
}
