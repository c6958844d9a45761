//! Transport layer: command/data framing between driver and panel

use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::command::Command;
use crate::error::Error;

/// Inverted bytes are staged through a chunk this size so the stored plane
/// is never mutated on its way to the wire.
const INVERT_CHUNK: usize = 64;

/// Fill bytes for RAM clears are staged through the same sized chunk.
const FILL_CHUNK: usize = 64;

/// How often the busy pin is sampled while spinning, in ms.
const BUSY_POLL_MS: u32 = 100;

/// One software-clocked byte read from the panel's data-in line.
///
/// The controller answers the boot-time variant probe before it has been
/// told which protocol dialect to speak, so the read cannot go through the
/// SPI peripheral: the host has to reclaim SCK as a push-pull output and
/// MOSI as a pulled-up input and clock the bit stream by hand.
/// [`SoftwareProbe`] does exactly that; platforms with special pin-sharing
/// constraints can supply their own implementation.
pub trait ProbePort {
    /// Clock in one byte, MSB first.
    fn read_byte(&mut self) -> u8;
}

/// Bit-banged [`ProbePort`] over two reclaimed GPIO pins.
///
/// Samples the data-in line while the clock is held low, then raises the
/// clock, eight times, assembling the byte MSB first.
pub struct SoftwareProbe<SCK, DIN> {
    sck: SCK,
    din: DIN,
}

impl<SCK, DIN> SoftwareProbe<SCK, DIN>
where
    SCK: OutputPin,
    DIN: InputPin,
{
    /// Creates a probe from the reclaimed clock and data-in pins.
    pub fn new(sck: SCK, din: DIN) -> Self {
        SoftwareProbe { sck, din }
    }

    /// Releases the pins so they can be handed back to the SPI peripheral.
    pub fn release(self) -> (SCK, DIN) {
        (self.sck, self.din)
    }
}

impl<SCK, DIN> ProbePort for SoftwareProbe<SCK, DIN>
where
    SCK: OutputPin,
    DIN: InputPin,
{
    fn read_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for _ in 0..8 {
            let _ = self.sck.set_low();
            byte <<= 1;
            if self.din.is_high().unwrap_or(false) {
                byte |= 0x01;
            }
            let _ = self.sck.set_high();
        }
        byte
    }
}

/// The connection interface to the panel.
///
/// Owns the chip-select, busy, data/command and reset lines; the SPI bus
/// handle is passed into each call so it can be shared with the other
/// peripherals hanging off the same bus. Commands go out with D/C low, data
/// with D/C high, and chip-select frames every transfer.
pub(crate) struct DisplayInterface<SPI, CS, BUSY, DC, RST> {
    /// SPI
    _spi: PhantomData<SPI>,
    /// Chip-Select (low active)
    cs: CS,
    /// Busy status line, polarity depends on the controller dialect
    busy: BUSY,
    /// Data/Command control (high for data, low for command)
    dc: DC,
    /// Reset (low active)
    rst: RST,
    /// Ceiling for one busy wait in ms, 0 meaning no ceiling
    busy_timeout_ms: u32,
}

impl<SPI, CS, BUSY, DC, RST> DisplayInterface<SPI, CS, BUSY, DC, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Creates a new `DisplayInterface`.
    ///
    /// `busy_timeout_ms` bounds every busy wait; 0 disables the bound.
    pub(crate) fn new(cs: CS, busy: BUSY, dc: DC, rst: RST, busy_timeout_ms: u32) -> Self {
        DisplayInterface {
            _spi: PhantomData,
            cs,
            busy,
            dc,
            rst,
            busy_timeout_ms,
        }
    }

    /// Basic function for sending [Commands](Command).
    ///
    /// Enables direct interaction with the device with the help of
    /// [data()](DisplayInterface::data())
    pub(crate) fn cmd<T: Command>(
        &mut self,
        spi: &mut SPI,
        command: T,
    ) -> Result<(), Error<SPI::Error>> {
        // low for commands
        let _ = self.dc.set_low();
        self.write(spi, &[command.address()])
    }

    /// Basic function for sending an array of u8-values of data over spi.
    ///
    /// The whole block goes out in one chip-select framing; per-byte
    /// framing is an order of magnitude too slow for full-frame transfers.
    pub(crate) fn data(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), Error<SPI::Error>> {
        // high for data
        let _ = self.dc.set_high();
        self.write(spi, data)
    }

    /// Basic function for sending [Commands](Command) and the data belonging to it.
    pub(crate) fn cmd_with_data<T: Command>(
        &mut self,
        spi: &mut SPI,
        command: T,
        data: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        self.cmd(spi, command)?;
        self.data(spi, data)
    }

    /// Sends a block of data with every byte bit-inverted on the way out.
    ///
    /// The red/highlight plane is active-low on the wire while the stored
    /// plane keeps the 0xFF-is-white convention, so the inversion happens
    /// here at transmission time and never touches the source buffer.
    pub(crate) fn data_inverted(
        &mut self,
        spi: &mut SPI,
        data: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        let _ = self.dc.set_high();
        let _ = self.cs.set_low();
        let mut staged = [0u8; INVERT_CHUNK];
        for chunk in data.chunks(INVERT_CHUNK) {
            for (s, b) in staged.iter_mut().zip(chunk.iter()) {
                *s = !*b;
            }
            if let Err(e) = spi.write(&staged[..chunk.len()]) {
                let _ = self.cs.set_high();
                return Err(Error::Spi(e));
            }
        }
        let flushed = spi.flush();
        let _ = self.cs.set_high();
        flushed.map_err(Error::Spi)
    }

    /// Basic function for sending the same byte of data multiple times,
    /// used to clear the panel RAM without a host-side frame buffer.
    pub(crate) fn data_x_times(
        &mut self,
        spi: &mut SPI,
        val: u8,
        repetitions: u32,
    ) -> Result<(), Error<SPI::Error>> {
        let _ = self.dc.set_high();
        let _ = self.cs.set_low();
        let staged = [val; FILL_CHUNK];
        let mut remaining = repetitions as usize;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK);
            if let Err(e) = spi.write(&staged[..n]) {
                let _ = self.cs.set_high();
                return Err(Error::Spi(e));
            }
            remaining -= n;
        }
        let flushed = spi.flush();
        let _ = self.cs.set_high();
        flushed.map_err(Error::Spi)
    }

    /// One software-clocked status byte, framed like a data transfer.
    ///
    /// Callers must have reclaimed the bus pins into `probe` beforehand and
    /// re-initialize the SPI peripheral afterwards.
    pub(crate) fn read_probe_byte<P: ProbePort>(&mut self, probe: &mut P) -> u8 {
        let _ = self.dc.set_high();
        let _ = self.cs.set_low();
        let byte = probe.read_byte();
        let _ = self.cs.set_high();
        byte
    }

    // spi write helper with chip-select framing
    fn write(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), Error<SPI::Error>> {
        let _ = self.cs.set_low();
        // transfer spi data
        // Be careful!! Linux has a default limit of 4096 bytes per spi transfer
        // see https://raspberrypi.stackexchange.com/questions/65595/spi-transfer-fails-with-buffer-size-greater-than-4096
        let written = if cfg!(target_os = "linux") {
            let mut res = Ok(());
            for data_chunk in data.chunks(4096) {
                res = spi.write(data_chunk);
                if res.is_err() {
                    break;
                }
            }
            res
        } else {
            spi.write(data)
        };
        let flushed = written.and_then(|_| spi.flush());
        let _ = self.cs.set_high();
        flushed.map_err(Error::Spi)
    }

    /// Waits until the device isn't busy anymore.
    ///
    /// `busy_when_high` encodes the dialect's busy polarity: the newer
    /// controller holds the pin HIGH while busy, the legacy one holds it
    /// LOW.
    ///
    /// The pin is sampled every 100ms. The original panel firmware spins
    /// forever here; this implementation deliberately deviates and gives up
    /// with [`Error::BusyTimeout`] once the configured ceiling is reached,
    /// because a controller that never releases busy would otherwise hang
    /// the whole device.
    pub(crate) fn wait_until_idle<D: DelayNs>(
        &mut self,
        delay: &mut D,
        busy_when_high: bool,
    ) -> Result<(), Error<SPI::Error>> {
        #[cfg(feature = "log")]
        log::trace!("waiting for e-paper busy release");
        let mut elapsed_ms: u32 = 0;
        loop {
            if !self.is_busy(busy_when_high) {
                return Ok(());
            }
            if self.busy_timeout_ms != 0 && elapsed_ms >= self.busy_timeout_ms {
                #[cfg(feature = "log")]
                log::warn!("busy pin stuck for {}ms, giving up", elapsed_ms);
                return Err(Error::BusyTimeout);
            }
            delay.delay_ms(BUSY_POLL_MS);
            elapsed_ms = elapsed_ms.saturating_add(BUSY_POLL_MS);
        }
    }

    /// Checks if the device is still busy.
    ///
    /// A failing busy line reads as "ready" rather than wedging the driver.
    pub(crate) fn is_busy(&mut self, busy_when_high: bool) -> bool {
        if busy_when_high {
            self.busy.is_high().unwrap_or(false)
        } else {
            self.busy.is_low().unwrap_or(false)
        }
    }

    /// Resets the device.
    ///
    /// Used to awake the module from deep sleep as well. The panel needs
    /// the line low for at least 2ms and then 200ms to come back up before
    /// it accepts the first command.
    pub(crate) fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        let _ = self.rst.set_high();
        delay.delay_ms(200);
        let _ = self.rst.set_low();
        delay.delay_ms(2);
        let _ = self.rst.set_high();
        delay.delay_ms(200);
    }
}
