//! Driver error type

/// Errors surfaced by the panel driver.
///
/// `E` is the error type of the SPI bus. GPIO line errors are not
/// represented: the data/command, chip-select and reset lines are treated as
/// infallible the way the panel firmware does, and a failing busy line reads
/// as "ready".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The SPI bus reported a fault.
    ///
    /// A refresh is not safe to blindly retry after this: a partially
    /// transferred frame corrupts the visible image until the next full
    /// refresh.
    Spi(E),

    /// The busy pin did not deassert within the configured timeout.
    ///
    /// The original panel firmware waits forever; the timeout exists so a
    /// dead controller surfaces as an error instead of a hang. See
    /// [`Config::busy_timeout_ms`](crate::panel::Config::busy_timeout_ms).
    BusyTimeout,

    /// A supplied frame buffer does not match `stride * height` for the
    /// requested transfer.
    BufferSize {
        /// Required length in bytes
        expected: usize,
        /// Length of the buffer that was passed in
        got: usize,
    },

    /// A partial-refresh window does not lie within the physical raster.
    InvalidWindow,

    /// The panel is in deep sleep; it needs
    /// [`wake_up`](crate::panel::Epd::wake_up) (a hardware reset plus
    /// re-init) before it accepts frame data again.
    Asleep,
}
