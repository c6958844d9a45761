//! Controller dialect selection and the variant-specific command sequences
//!
//! The panels shipped with two controller revisions. Variant A is the newer
//! low-voltage part with explicit RAM-address windowing; variant B is the
//! legacy part with fixed full-panel addressing. Which one is installed is
//! only known after reading the boot-time status byte; everything
//! variant-specific lives behind [`Dialect`] so the rest of the driver
//! never branches on it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::command::{Command, TypeACommand, TypeBCommand};
use crate::error::Error;
use crate::interface::DisplayInterface;

/// The probe response identifying the newer controller; everything else
/// falls back to the legacy dialect.
const PROBE_TYPE_A: u8 = 0x01;

/// The command dialect spoken by the installed controller, chosen once at
/// boot and held by the panel for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Newer controller: RAM windowing, busy while the pin is HIGH
    TypeA,
    /// Legacy controller: full-panel addressing, busy while the pin is LOW
    TypeB,
}

impl Dialect {
    /// Selects the dialect from the boot-time status byte.
    ///
    /// An unrecognized response selects the legacy dialect rather than
    /// failing: old panels predate the status read and answer with floating
    /// bus noise.
    pub fn from_probe(byte: u8) -> Self {
        match byte {
            PROBE_TYPE_A => Dialect::TypeA,
            _ => {
                if byte != 0x00 {
                    #[cfg(feature = "log")]
                    log::warn!(
                        "unrecognized controller probe response {:#04x}, assuming legacy controller",
                        byte
                    );
                }
                Dialect::TypeB
            }
        }
    }

    /// Busy-pin polarity: variant A keeps the pin HIGH while busy, variant
    /// B keeps it LOW.
    pub fn busy_when_high(self) -> bool {
        matches!(self, Dialect::TypeA)
    }
}

// The sequences below are generic over the interface, so they hang off the
// enum as methods rather than a trait object.
impl Dialect {
    /// Variant-specific power-up sequence, run after every hardware reset.
    pub(crate) fn init<SPI, CS, BUSY, DC, RST, D>(
        self,
        iface: &mut DisplayInterface<SPI, CS, BUSY, DC, RST>,
        spi: &mut SPI,
        delay: &mut D,
        width: u32,
        height: u32,
    ) -> Result<(), Error<SPI::Error>>
    where
        SPI: SpiBus<u8>,
        CS: OutputPin,
        BUSY: InputPin,
        DC: OutputPin,
        RST: OutputPin,
        D: DelayNs,
    {
        match self {
            Dialect::TypeA => {
                iface.wait_until_idle(delay, self.busy_when_high())?;
                iface.cmd(spi, TypeACommand::SwReset)?;
                iface.wait_until_idle(delay, self.busy_when_high())?;

                iface.cmd_with_data(spi, TypeACommand::BorderWaveformControl, &[0x05])?;
                iface.cmd_with_data(spi, TypeACommand::TemperatureSensorControl, &[0x80])?;
                // x increment, y increment, counter updated in x direction
                iface.cmd_with_data(spi, TypeACommand::DataEntryModeSetting, &[0x03])?;

                set_ram_window(iface, spi, 0, 0, width, height)?;
                set_ram_counter(iface, spi, 0, 0)?;
                iface.wait_until_idle(delay, self.busy_when_high())
            }
            Dialect::TypeB => {
                iface.cmd(spi, TypeBCommand::PowerOn)?;
                iface.wait_until_idle(delay, self.busy_when_high())?;
                // LUT from OTP, black/white/red mode
                iface.cmd_with_data(spi, TypeBCommand::PanelSetting, &[0x0F])
            }
        }
    }

    /// RAM write command for the black plane.
    pub(crate) fn black_ram<SPI, CS, BUSY, DC, RST>(
        self,
        iface: &mut DisplayInterface<SPI, CS, BUSY, DC, RST>,
        spi: &mut SPI,
    ) -> Result<(), Error<SPI::Error>>
    where
        SPI: SpiBus<u8>,
        CS: OutputPin,
        BUSY: InputPin,
        DC: OutputPin,
        RST: OutputPin,
    {
        match self {
            Dialect::TypeA => iface.cmd(spi, TypeACommand::WriteRamBlack),
            Dialect::TypeB => iface.cmd(spi, TypeBCommand::DataStartTransmission1),
        }
    }

    /// RAM write command for the red/highlight plane. The plane data itself
    /// must go out bit-inverted, red is active-low on the wire.
    pub(crate) fn red_ram<SPI, CS, BUSY, DC, RST>(
        self,
        iface: &mut DisplayInterface<SPI, CS, BUSY, DC, RST>,
        spi: &mut SPI,
    ) -> Result<(), Error<SPI::Error>>
    where
        SPI: SpiBus<u8>,
        CS: OutputPin,
        BUSY: InputPin,
        DC: OutputPin,
        RST: OutputPin,
    {
        match self {
            Dialect::TypeA => iface.cmd(spi, TypeACommand::WriteRamRed),
            Dialect::TypeB => iface.cmd(spi, TypeBCommand::DataStartTransmission2),
        }
    }

    /// The update sequence: pushes the freshly written RAM onto the glass,
    /// then blocks until the controller releases busy.
    ///
    /// This is the single synchronization point after every transfer.
    pub(crate) fn turn_on_display<SPI, CS, BUSY, DC, RST, D>(
        self,
        iface: &mut DisplayInterface<SPI, CS, BUSY, DC, RST>,
        spi: &mut SPI,
        delay: &mut D,
    ) -> Result<(), Error<SPI::Error>>
    where
        SPI: SpiBus<u8>,
        CS: OutputPin,
        BUSY: InputPin,
        DC: OutputPin,
        RST: OutputPin,
        D: DelayNs,
    {
        match self {
            Dialect::TypeA => {
                // full update cycle: clock on, analog on, display, analog off
                iface.cmd_with_data(spi, TypeACommand::DisplayUpdateControl2, &[0xF7])?;
                iface.cmd(spi, TypeACommand::MasterActivation)?;
                iface.wait_until_idle(delay, self.busy_when_high())
            }
            Dialect::TypeB => {
                iface.cmd(spi, TypeBCommand::DisplayRefresh)?;
                delay.delay_ms(100);
                iface.wait_until_idle(delay, self.busy_when_high())
            }
        }
    }

    /// Deep-sleep sequence; waking needs a hardware reset and re-init.
    pub(crate) fn enter_sleep<SPI, CS, BUSY, DC, RST, D>(
        self,
        iface: &mut DisplayInterface<SPI, CS, BUSY, DC, RST>,
        spi: &mut SPI,
        delay: &mut D,
    ) -> Result<(), Error<SPI::Error>>
    where
        SPI: SpiBus<u8>,
        CS: OutputPin,
        BUSY: InputPin,
        DC: OutputPin,
        RST: OutputPin,
        D: DelayNs,
    {
        match self {
            Dialect::TypeA => iface.cmd_with_data(spi, TypeACommand::DeepSleepMode, &[0x03]),
            Dialect::TypeB => {
                // float the border, power down, then the guarded deep sleep
                iface.cmd_with_data(spi, TypeBCommand::VcomAndDataIntervalSetting, &[0xF7])?;
                iface.cmd(spi, TypeBCommand::PowerOff)?;
                iface.wait_until_idle(delay, self.busy_when_high())?;
                iface.cmd_with_data(spi, TypeBCommand::DeepSleep, &[0xA5])
            }
        }
    }
}

/// Sets the RAM address window, in physical coordinates. X values are in
/// byte (8 pixel) units on the wire; callers must pass byte-aligned x and
/// width.
pub(crate) fn set_ram_window<SPI, CS, BUSY, DC, RST>(
    iface: &mut DisplayInterface<SPI, CS, BUSY, DC, RST>,
    spi: &mut SPI,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<(), Error<SPI::Error>>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    let x_end = x + width - 1;
    let y_end = y + height - 1;
    iface.cmd_with_data(
        spi,
        TypeACommand::SetRamXAddressRange,
        &[(x >> 3) as u8, (x_end >> 3) as u8],
    )?;
    iface.cmd_with_data(
        spi,
        TypeACommand::SetRamYAddressRange,
        &[y as u8, (y >> 8) as u8, y_end as u8, (y_end >> 8) as u8],
    )
}

/// Sets the RAM address counters to the window origin.
pub(crate) fn set_ram_counter<SPI, CS, BUSY, DC, RST>(
    iface: &mut DisplayInterface<SPI, CS, BUSY, DC, RST>,
    spi: &mut SPI,
    x: u32,
    y: u32,
) -> Result<(), Error<SPI::Error>>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    iface.cmd_with_data(spi, TypeACommand::SetRamXAddressCounter, &[(x >> 3) as u8])?;
    iface.cmd_with_data(
        spi,
        TypeACommand::SetRamYAddressCounter,
        &[y as u8, (y >> 8) as u8],
    )
}
