//! A driver for the dual-plane (black + red) e-paper panels of the Fone
//! handheld, built on [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/1.0
//!
//! # Requirements
//!
//! ### SPI
//!
//! - MISO is not connected; the one read the controller ever answers (the
//!   boot-time variant probe) is bit-banged over reclaimed pins, see
//!   [`interface::ProbePort`]
//! - SPI_MODE_0 is used (CPHL = 0, CPOL = 0)
//! - 8 bits per word, MSB first
//! - 4 MHz is the tested clock rate for these panels
//!
//! ### Buffers
//!
//! Wherever a full frame buffer is used it needs to be of size
//! `ceil(width / 8) * height`, where width and height are either the full
//! panel size or the partial-window size.
//!
//! # Example
//!
//! ```ignore
//! use fone_epd::prelude::*;
//!
//! let mut probe = SoftwareProbe::new(sck, din);
//! let mut epd = Epd::new(
//!     &mut spi, cs, busy, dc, rst,
//!     &mut probe, &mut delay,
//!     Config::new(FONE_4IN2),
//! )?;
//!
//! let mut display = Display4in2::default();
//! display.set_rotation(DisplayRotation::Rotate90);
//! display.set_pixel(Plane::Black, 0, 0, Color::Black);
//!
//! let mut black = [0xFFu8; buffer_len(400, 300)];
//! let mut red = [0xFFu8; buffer_len(400, 300)];
//! display.rotate_into(Plane::Black, &mut black)?;
//! display.rotate_into(Plane::Red, &mut red)?;
//!
//! epd.update_and_display_frame(&mut spi, &mut delay, &black, &red)?;
//! epd.sleep(&mut spi, &mut delay)?;
//! ```
#![no_std]
#![deny(missing_docs)]

pub mod color;

mod command;

mod dialect;
pub use dialect::Dialect;

pub mod error;

/// Interface for the physical connection between display and the controlling device
pub mod interface;

pub mod panel;

pub mod rect;

pub mod rotation;

#[cfg(feature = "graphics")]
pub mod graphics;

/// Everything a consumer of the driver usually needs
pub mod prelude {
    pub use crate::color::{Color, TriColor};
    pub use crate::dialect::Dialect;
    pub use crate::error::Error;
    pub use crate::interface::{ProbePort, SoftwareProbe};
    pub use crate::panel::{
        Config, Epd, Model, PowerState, FONE_2IN9, FONE_4IN2, MAX_PARTIAL_REFRESHES,
    };
    pub use crate::rect::Rect;
    pub use crate::rotation::DisplayRotation;
    pub use crate::{buffer_len, rotated_buffer_len, SPI_MODE};

    #[cfg(feature = "graphics")]
    pub use crate::graphics::{Display, Display2in9, Display4in2, Plane};
}

use embedded_hal::spi::{Mode, Phase, Polarity};

/// SPI mode needed for these panels
///
/// For more infos see [Requirements: SPI](index.html#spi)
pub const SPI_MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};

/// Computes the needed buffer length for one bit-packed plane. Takes care
/// of rounding up to the next whole byte per row (the stride).
pub const fn buffer_len(width: usize, height: usize) -> usize {
    (width + 7) / 8 * height
}

/// Buffer length big enough to hold one plane in any of the four supported
/// rotations.
///
/// The strides of the rotated and unrotated layouts are rounded up to whole
/// bytes independently, so the two sizes differ whenever one of the panel
/// dimensions is not a multiple of 8.
pub const fn rotated_buffer_len(width: usize, height: usize) -> usize {
    let portrait = buffer_len(width, height);
    let landscape = buffer_len(height, width);
    if portrait > landscape {
        portrait
    } else {
        landscape
    }
}
