//! The panel driver: probe, refresh, partial refresh, sleep
//!
//! One [`Epd`] owns the control pins and the detected controller
//! [`Dialect`] for the whole session. The handful of panel sizes differ
//! only in their raster dimensions, so they share this type and are told
//! apart by a [`Model`] descriptor instead of per-size driver code.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

use crate::buffer_len;
use crate::command::{constants::LUT_PARTIAL, PartialCommand, ProbeCommand};
use crate::dialect::{set_ram_counter, set_ram_window, Dialect};
use crate::error::Error;
use crate::interface::{DisplayInterface, ProbePort};
use crate::rect::Rect;

/// Partial refreshes accumulate ghosting; after this many the image is
/// expected to degrade visibly and a full refresh is due.
///
/// The driver only counts (see [`Epd::partial_refresh_count`]); scheduling
/// the full refresh is the caller's job, so a caller may be stricter or
/// combine the count with a timer.
pub const MAX_PARTIAL_REFRESHES: u32 = 10;

const DEFAULT_BUSY_TIMEOUT_MS: u32 = 30_000;

/// Physical description of one panel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Model {
    width: u32,
    height: u32,
    name: &'static str,
}

impl Model {
    /// Describes a panel by its physical raster size.
    pub const fn new(width: u32, height: u32, name: &'static str) -> Self {
        Self {
            width,
            height,
            name,
        }
    }

    /// Physical width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Physical height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Marketing name of the panel
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Bytes per plane for a full frame of this panel.
    pub const fn frame_len(&self) -> usize {
        buffer_len(self.width as usize, self.height as usize)
    }
}

/// The 4.2 inch 400x300 panel
pub const FONE_4IN2: Model = Model::new(400, 300, "4.2in");

/// The 2.9 inch 128x296 panel
pub const FONE_2IN9: Model = Model::new(128, 296, "2.9in");

/// Driver configuration, passed once at construction.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    model: Model,
    busy_timeout_ms: u32,
}

impl Config {
    /// Configuration for `model` with the default busy timeout.
    pub const fn new(model: Model) -> Self {
        Self {
            model,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Overrides how long a busy-wait may block before it fails with
    /// [`Error::BusyTimeout`]. `0` disables the timeout and spins forever,
    /// matching the behavior of the factory firmware.
    pub const fn busy_timeout_ms(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// The configured panel model.
    pub const fn model(&self) -> Model {
        self.model
    }
}

/// Whether the controller is reachable or in deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// Powered up and accepting commands
    Active,
    /// In deep sleep; only [`Epd::wake_up`] works
    Sleeping,
}

/// An e-paper panel, probed and initialized.
///
/// All refresh entry points take the SPI bus and a delay by reference so
/// both can be shared with other peripherals between calls. The buffers
/// handed in are *physical* raster planes; rotated drawing goes through
/// [`Display::rotate_into`](crate::graphics::Display::rotate_into) first.
pub struct Epd<SPI, CS, BUSY, DC, RST> {
    interface: DisplayInterface<SPI, CS, BUSY, DC, RST>,
    model: Model,
    dialect: Dialect,
    power: PowerState,
    partial_refreshes: u32,
}

impl<SPI, CS, BUSY, DC, RST> Epd<SPI, CS, BUSY, DC, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Resets the panel, probes the controller variant and runs the
    /// matching init sequence.
    ///
    /// `probe` answers the one read of the whole protocol; on hardware
    /// where the bus pins double as the probe pins, reclaim them into a
    /// [`SoftwareProbe`](crate::interface::SoftwareProbe) before
    /// constructing the driver and hand the pins back afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn new<P: ProbePort, D: DelayNs>(
        spi: &mut SPI,
        cs: CS,
        busy: BUSY,
        dc: DC,
        rst: RST,
        probe: &mut P,
        delay: &mut D,
        config: Config,
    ) -> Result<Self, Error<SPI::Error>> {
        let mut interface = DisplayInterface::new(cs, busy, dc, rst, config.busy_timeout_ms);
        interface.reset(delay);

        interface.cmd(spi, ProbeCommand::ReadStatus)?;
        delay.delay_ms(100);
        let status = interface.read_probe_byte(probe);
        let dialect = Dialect::from_probe(status);
        #[cfg(feature = "log")]
        log::debug!("controller probe answered {:#04x}, dialect {:?}", status, dialect);

        let model = config.model;
        dialect.init(&mut interface, spi, delay, model.width, model.height)?;

        Ok(Self {
            interface,
            model,
            dialect,
            power: PowerState::Active,
            partial_refreshes: 0,
        })
    }

    /// Transfers both full planes into the controller RAM without
    /// refreshing the glass.
    ///
    /// `black` and `red` are physical-raster planes of
    /// [`Model::frame_len`] bytes, 0xFF meaning white in both; the red
    /// plane is bit-inverted on the wire.
    pub fn update_frame<D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
        black: &[u8],
        red: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        self.ensure_active()?;
        self.check_len(black)?;
        self.check_len(red)?;
        self.interface
            .wait_until_idle(delay, self.dialect.busy_when_high())?;

        self.dialect.black_ram(&mut self.interface, spi)?;
        self.interface.data(spi, black)?;
        self.dialect.red_ram(&mut self.interface, spi)?;
        self.interface.data_inverted(spi, red)
    }

    /// Pushes the controller RAM onto the glass and waits for completion.
    ///
    /// A full refresh, so the partial-refresh count goes back to zero.
    pub fn display_frame<D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
    ) -> Result<(), Error<SPI::Error>> {
        self.ensure_active()?;
        self.dialect.turn_on_display(&mut self.interface, spi, delay)?;
        self.partial_refreshes = 0;
        Ok(())
    }

    /// [`update_frame`](Self::update_frame) followed by
    /// [`display_frame`](Self::display_frame).
    pub fn update_and_display_frame<D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
        black: &[u8],
        red: &[u8],
    ) -> Result<(), Error<SPI::Error>> {
        self.update_frame(spi, delay, black, red)?;
        self.display_frame(spi, delay)
    }

    /// Blanks the panel to white without a host-side frame buffer.
    ///
    /// Counts as a full refresh.
    pub fn clear_frame<D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
    ) -> Result<(), Error<SPI::Error>> {
        self.ensure_active()?;
        self.interface
            .wait_until_idle(delay, self.dialect.busy_when_high())?;

        let len = self.model.frame_len() as u32;
        self.dialect.black_ram(&mut self.interface, spi)?;
        self.interface.data_x_times(spi, 0xFF, len)?;
        self.dialect.red_ram(&mut self.interface, spi)?;
        // the red plane is inverted on the wire, so white is 0x00 here
        self.interface.data_x_times(spi, 0x00, len)?;

        self.display_frame(spi, delay)
    }

    /// Refreshes only `window`, leaving the rest of the glass untouched.
    ///
    /// `window` is in *physical* coordinates and is byte-aligned before
    /// use (x floored, width ceiled to multiples of 8); rotated callers
    /// must translate through
    /// [`DisplayRotation::transform_window`](crate::rotation::DisplayRotation::transform_window)
    /// first. `black` and `red` hold only the window bytes, row by row,
    /// `(aligned_w / 8) * h` each, as produced by
    /// [`Display::window_bytes`](crate::graphics::Display::window_bytes).
    ///
    /// Uses the fast partial waveform, which ghosts; check
    /// [`partial_refresh_count`](Self::partial_refresh_count) against
    /// [`MAX_PARTIAL_REFRESHES`] and schedule full refreshes accordingly.
    pub fn display_partial_frame<D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
        black: &[u8],
        red: &[u8],
        window: Rect,
    ) -> Result<(), Error<SPI::Error>> {
        self.ensure_active()?;
        let window = window.byte_aligned();
        if window.is_empty() {
            return Ok(());
        }
        let raster = Rect::new(0, 0, self.model.width, self.model.height);
        if !window.contained_in(raster) {
            return Err(Error::InvalidWindow);
        }
        let expected = (window.w / 8 * window.h) as usize;
        for plane in [black, red] {
            if plane.len() != expected {
                return Err(Error::BufferSize {
                    expected,
                    got: plane.len(),
                });
            }
        }

        self.interface
            .wait_until_idle(delay, self.dialect.busy_when_high())?;

        set_ram_window(
            &mut self.interface,
            spi,
            window.x,
            window.y,
            window.w,
            window.h,
        )?;

        set_ram_counter(&mut self.interface, spi, window.x, window.y)?;
        self.dialect.black_ram(&mut self.interface, spi)?;
        self.interface.data(spi, black)?;

        // the counter advanced past the window during the first plane
        set_ram_counter(&mut self.interface, spi, window.x, window.y)?;
        self.dialect.red_ram(&mut self.interface, spi)?;
        self.interface.data_inverted(spi, red)?;

        self.interface
            .cmd_with_data(spi, PartialCommand::LoadPartialLut, &LUT_PARTIAL)?;
        self.dialect.turn_on_display(&mut self.interface, spi, delay)?;
        self.interface.cmd(spi, PartialCommand::PartialOut)?;

        self.partial_refreshes += 1;
        Ok(())
    }

    /// Puts the controller into deep sleep. A no-op when already sleeping.
    ///
    /// Everything except [`wake_up`](Self::wake_up) fails with
    /// [`Error::Asleep`] afterwards.
    pub fn sleep<D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
    ) -> Result<(), Error<SPI::Error>> {
        if self.power == PowerState::Sleeping {
            return Ok(());
        }
        self.dialect.enter_sleep(&mut self.interface, spi, delay)?;
        self.power = PowerState::Sleeping;
        Ok(())
    }

    /// Wakes the controller with a hardware reset and re-runs init.
    ///
    /// The controller RAM does not survive deep sleep; follow up with a
    /// full refresh before any partial one.
    pub fn wake_up<D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
    ) -> Result<(), Error<SPI::Error>> {
        self.interface.reset(delay);
        self.dialect
            .init(&mut self.interface, spi, delay, self.model.width, self.model.height)?;
        self.power = PowerState::Active;
        Ok(())
    }

    /// Blocks until the controller releases the busy line.
    pub fn wait_until_idle<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), Error<SPI::Error>> {
        self.interface
            .wait_until_idle(delay, self.dialect.busy_when_high())
    }

    /// Whether the controller currently holds the busy line.
    pub fn is_busy(&mut self) -> bool {
        self.interface.is_busy(self.dialect.busy_when_high())
    }

    /// Physical width in pixels
    pub fn width(&self) -> u32 {
        self.model.width
    }

    /// Physical height in pixels
    pub fn height(&self) -> u32 {
        self.model.height
    }

    /// The dialect chosen at probe time.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Current power state.
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Partial refreshes since the last full refresh.
    pub fn partial_refresh_count(&self) -> u32 {
        self.partial_refreshes
    }

    fn ensure_active(&self) -> Result<(), Error<SPI::Error>> {
        match self.power {
            PowerState::Active => Ok(()),
            PowerState::Sleeping => Err(Error::Asleep),
        }
    }

    fn check_len(&self, buffer: &[u8]) -> Result<(), Error<SPI::Error>> {
        let expected = self.model.frame_len();
        if buffer.len() != expected {
            return Err(Error::BufferSize {
                expected,
                got: buffer.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    /// Answers the one probe read with a fixed byte.
    struct FixedProbe(u8);
    impl ProbePort for FixedProbe {
        fn read_byte(&mut self) -> u8 {
            self.0
        }
    }

    const TEST_MODEL: Model = Model::new(16, 4, "test");

    /// Per-pin expectation streams, built up operation by operation.
    ///
    /// The pin mocks check ordering per pin, not across pins, so each
    /// helper only has to append its own pin's transitions in order.
    #[derive(Default)]
    struct Expect {
        spi: Vec<SpiTransaction<u8>>,
        cs: Vec<PinTransaction>,
        dc: Vec<PinTransaction>,
        busy: Vec<PinTransaction>,
        rst: Vec<PinTransaction>,
    }

    impl Expect {
        fn reset(&mut self) {
            self.rst.push(PinTransaction::set(PinState::High));
            self.rst.push(PinTransaction::set(PinState::Low));
            self.rst.push(PinTransaction::set(PinState::High));
        }

        fn cmd(&mut self, byte: u8) {
            self.dc.push(PinTransaction::set(PinState::Low));
            self.cs.push(PinTransaction::set(PinState::Low));
            self.spi.push(SpiTransaction::write_vec(vec![byte]));
            self.spi.push(SpiTransaction::flush());
            self.cs.push(PinTransaction::set(PinState::High));
        }

        fn data(&mut self, bytes: &[u8]) {
            self.dc.push(PinTransaction::set(PinState::High));
            self.cs.push(PinTransaction::set(PinState::Low));
            self.spi.push(SpiTransaction::write_vec(bytes.to_vec()));
            self.spi.push(SpiTransaction::flush());
            self.cs.push(PinTransaction::set(PinState::High));
        }

        fn cmd_with_data(&mut self, byte: u8, data: &[u8]) {
            self.cmd(byte);
            self.data(data);
        }

        fn data_inverted(&mut self, bytes: &[u8]) {
            self.dc.push(PinTransaction::set(PinState::High));
            self.cs.push(PinTransaction::set(PinState::Low));
            let inverted: Vec<u8> = bytes.iter().map(|b| !*b).collect();
            for chunk in inverted.chunks(64) {
                self.spi.push(SpiTransaction::write_vec(chunk.to_vec()));
            }
            self.spi.push(SpiTransaction::flush());
            self.cs.push(PinTransaction::set(PinState::High));
        }

        fn data_fill(&mut self, val: u8, n: usize) {
            self.dc.push(PinTransaction::set(PinState::High));
            self.cs.push(PinTransaction::set(PinState::Low));
            let mut remaining = n;
            while remaining > 0 {
                let chunk = remaining.min(64);
                self.spi.push(SpiTransaction::write_vec(vec![val; chunk]));
                remaining -= chunk;
            }
            self.spi.push(SpiTransaction::flush());
            self.cs.push(PinTransaction::set(PinState::High));
        }

        fn probe_read(&mut self) {
            self.dc.push(PinTransaction::set(PinState::High));
            self.cs.push(PinTransaction::set(PinState::Low));
            self.cs.push(PinTransaction::set(PinState::High));
        }

        // one idle sample per busy wait
        fn busy_idle(&mut self, dialect: Dialect) {
            let idle = if dialect.busy_when_high() {
                PinState::Low
            } else {
                PinState::High
            };
            self.busy.push(PinTransaction::get(idle));
        }

        fn boot(&mut self, dialect: Dialect, model: Model) {
            self.reset();
            self.cmd(0x2F);
            self.probe_read();
            match dialect {
                Dialect::TypeA => {
                    self.busy_idle(dialect);
                    self.cmd(0x12);
                    self.busy_idle(dialect);
                    self.cmd_with_data(0x3C, &[0x05]);
                    self.cmd_with_data(0x18, &[0x80]);
                    self.cmd_with_data(0x11, &[0x03]);
                    let x_end = ((model.width - 1) >> 3) as u8;
                    let y_end = model.height - 1;
                    self.cmd_with_data(0x44, &[0x00, x_end]);
                    self.cmd_with_data(0x45, &[0x00, 0x00, y_end as u8, (y_end >> 8) as u8]);
                    self.cmd_with_data(0x4E, &[0x00]);
                    self.cmd_with_data(0x4F, &[0x00, 0x00]);
                    self.busy_idle(dialect);
                }
                Dialect::TypeB => {
                    self.cmd(0x04);
                    self.busy_idle(dialect);
                    self.cmd_with_data(0x00, &[0x0F]);
                }
            }
        }

        fn full_refresh(&mut self, dialect: Dialect, black: &[u8], red: &[u8]) {
            self.busy_idle(dialect);
            match dialect {
                Dialect::TypeA => {
                    self.cmd(0x24);
                    self.data(black);
                    self.cmd(0x26);
                    self.data_inverted(red);
                    self.cmd_with_data(0x22, &[0xF7]);
                    self.cmd(0x20);
                    self.busy_idle(dialect);
                }
                Dialect::TypeB => {
                    self.cmd(0x10);
                    self.data(black);
                    self.cmd(0x13);
                    self.data_inverted(red);
                    self.cmd(0x12);
                    self.busy_idle(dialect);
                }
            }
        }
    }

    /// The mocks share state with their clones, so the driver can consume
    /// one handle while the test keeps another for verification.
    struct Harness {
        spi: SpiMock<u8>,
        cs: PinMock,
        busy: PinMock,
        dc: PinMock,
        rst: PinMock,
    }

    impl Harness {
        fn new(expect: &Expect) -> Self {
            Harness {
                spi: SpiMock::new(&expect.spi),
                cs: PinMock::new(&expect.cs),
                busy: PinMock::new(&expect.busy),
                dc: PinMock::new(&expect.dc),
                rst: PinMock::new(&expect.rst),
            }
        }

        fn boot(
            &mut self,
            probe_byte: u8,
            config: Config,
        ) -> Epd<SpiMock<u8>, PinMock, PinMock, PinMock, PinMock> {
            Epd::new(
                &mut self.spi,
                self.cs.clone(),
                self.busy.clone(),
                self.dc.clone(),
                self.rst.clone(),
                &mut FixedProbe(probe_byte),
                &mut NoopDelay::new(),
                config,
            )
            .unwrap()
        }

        fn done(&mut self) {
            self.spi.done();
            self.cs.done();
            self.busy.done();
            self.dc.done();
            self.rst.done();
        }
    }

    #[test]
    fn model_frame_lengths() {
        assert_eq!(FONE_4IN2.frame_len(), 50 * 300);
        assert_eq!(FONE_2IN9.frame_len(), 16 * 296);
        assert_eq!(FONE_4IN2.name(), "4.2in");
    }

    #[test]
    fn config_defaults_and_override() {
        let config = Config::new(FONE_4IN2);
        assert_eq!(config.busy_timeout_ms, 30_000);
        assert_eq!(config.model().width(), 400);

        let config = config.busy_timeout_ms(0);
        assert_eq!(config.busy_timeout_ms, 0);
    }

    #[test]
    fn boot_probes_newer_controller() {
        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);

        let mut harness = Harness::new(&expect);
        let epd = harness.boot(0x01, Config::new(TEST_MODEL));

        assert_eq!(epd.dialect(), Dialect::TypeA);
        assert_eq!(epd.power_state(), PowerState::Active);
        assert_eq!(epd.partial_refresh_count(), 0);
        harness.done();
    }

    #[test]
    fn boot_falls_back_to_legacy_controller() {
        let mut expect = Expect::default();
        expect.boot(Dialect::TypeB, TEST_MODEL);

        let mut harness = Harness::new(&expect);
        // noise on the probe line, not one of the known tags
        let epd = harness.boot(0x42, Config::new(TEST_MODEL));

        assert_eq!(epd.dialect(), Dialect::TypeB);
        harness.done();
    }

    #[test]
    fn full_refresh_sends_both_planes() {
        let black = [0x0Fu8; 8];
        let red = [0xFFu8; 8];

        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);
        expect.full_refresh(Dialect::TypeA, &black, &red);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0x01, Config::new(TEST_MODEL));
        epd.update_and_display_frame(&mut harness.spi, &mut NoopDelay::new(), &black, &red)
            .unwrap();

        assert_eq!(epd.partial_refresh_count(), 0);
        harness.done();
    }

    #[test]
    fn full_refresh_speaks_the_legacy_dialect() {
        let black = [0x00u8; 8];
        let red = [0xFFu8; 8];

        let mut expect = Expect::default();
        expect.boot(Dialect::TypeB, TEST_MODEL);
        expect.full_refresh(Dialect::TypeB, &black, &red);
        // legacy deep sleep: float border, power off, guarded sleep
        expect.cmd_with_data(0x50, &[0xF7]);
        expect.cmd(0x02);
        expect.busy_idle(Dialect::TypeB);
        expect.cmd_with_data(0x07, &[0xA5]);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0xFF, Config::new(TEST_MODEL));
        let mut delay = NoopDelay::new();
        epd.update_and_display_frame(&mut harness.spi, &mut delay, &black, &red)
            .unwrap();
        epd.sleep(&mut harness.spi, &mut delay).unwrap();

        assert_eq!(epd.power_state(), PowerState::Sleeping);
        harness.done();
    }

    #[test]
    fn update_frame_rejects_wrong_buffer_size() {
        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0x01, Config::new(TEST_MODEL));
        let result = epd.update_frame(&mut harness.spi, &mut NoopDelay::new(), &[0u8; 7], &[0u8; 8]);

        assert_eq!(
            result,
            Err(Error::BufferSize {
                expected: 8,
                got: 7
            })
        );
        harness.done();
    }

    #[test]
    fn clear_frame_blanks_both_planes() {
        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);
        expect.busy_idle(Dialect::TypeA);
        expect.cmd(0x24);
        expect.data_fill(0xFF, 8);
        expect.cmd(0x26);
        // red plane is inverted on the wire, white goes out as 0x00
        expect.data_fill(0x00, 8);
        expect.cmd_with_data(0x22, &[0xF7]);
        expect.cmd(0x20);
        expect.busy_idle(Dialect::TypeA);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0x01, Config::new(TEST_MODEL));
        epd.clear_frame(&mut harness.spi, &mut NoopDelay::new()).unwrap();

        harness.done();
    }

    #[test]
    fn partial_refresh_windows_and_counts() {
        // requested (3,1,6,2) aligns to (0,1,8,2): one byte per row
        let black = [0b1101_1111u8, 0xFF];
        let red = [0xFFu8, 0xFF];

        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);
        expect.busy_idle(Dialect::TypeA);
        expect.cmd_with_data(0x44, &[0x00, 0x00]);
        expect.cmd_with_data(0x45, &[0x01, 0x00, 0x02, 0x00]);
        expect.cmd_with_data(0x4E, &[0x00]);
        expect.cmd_with_data(0x4F, &[0x01, 0x00]);
        expect.cmd(0x24);
        expect.data(&black);
        expect.cmd_with_data(0x4E, &[0x00]);
        expect.cmd_with_data(0x4F, &[0x01, 0x00]);
        expect.cmd(0x26);
        expect.data_inverted(&red);
        expect.cmd_with_data(0x20, &LUT_PARTIAL);
        expect.cmd_with_data(0x22, &[0xF7]);
        expect.cmd(0x20);
        expect.busy_idle(Dialect::TypeA);
        expect.cmd(0x92);
        // the following full refresh resets the count
        expect.cmd_with_data(0x22, &[0xF7]);
        expect.cmd(0x20);
        expect.busy_idle(Dialect::TypeA);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0x01, Config::new(TEST_MODEL));
        let mut delay = NoopDelay::new();
        epd.display_partial_frame(&mut harness.spi, &mut delay, &black, &red, Rect::new(3, 1, 6, 2))
            .unwrap();
        assert_eq!(epd.partial_refresh_count(), 1);

        epd.display_frame(&mut harness.spi, &mut delay).unwrap();
        assert_eq!(epd.partial_refresh_count(), 0);
        harness.done();
    }

    #[test]
    fn partial_refresh_validates_window_and_buffers() {
        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0x01, Config::new(TEST_MODEL));
        let mut delay = NoopDelay::new();

        // window past the right edge after alignment
        assert_eq!(
            epd.display_partial_frame(
                &mut harness.spi,
                &mut delay,
                &[0u8; 4],
                &[0u8; 4],
                Rect::new(8, 0, 16, 2),
            ),
            Err(Error::InvalidWindow)
        );

        // window fits but the buffers are sized for a different one
        assert_eq!(
            epd.display_partial_frame(
                &mut harness.spi,
                &mut delay,
                &[0u8; 4],
                &[0u8; 4],
                Rect::new(0, 0, 8, 2),
            ),
            Err(Error::BufferSize {
                expected: 2,
                got: 4
            })
        );

        // an empty window is a no-op, not an error
        epd.display_partial_frame(&mut harness.spi, &mut delay, &[], &[], Rect::new(0, 0, 0, 2))
            .unwrap();
        assert_eq!(epd.partial_refresh_count(), 0);
        harness.done();
    }

    #[test]
    fn sleep_guards_frame_operations() {
        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);
        expect.cmd_with_data(0x10, &[0x03]);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0x01, Config::new(TEST_MODEL));
        let mut delay = NoopDelay::new();
        epd.sleep(&mut harness.spi, &mut delay).unwrap();
        assert_eq!(epd.power_state(), PowerState::Sleeping);

        assert_eq!(
            epd.update_frame(&mut harness.spi, &mut delay, &[0u8; 8], &[0u8; 8]),
            Err(Error::Asleep)
        );
        assert_eq!(
            epd.display_frame(&mut harness.spi, &mut delay),
            Err(Error::Asleep)
        );
        assert_eq!(
            epd.clear_frame(&mut harness.spi, &mut delay),
            Err(Error::Asleep)
        );

        // sleeping twice is fine and sends nothing
        epd.sleep(&mut harness.spi, &mut delay).unwrap();
        harness.done();
    }

    #[test]
    fn wake_up_resets_and_reinitializes() {
        let mut expect = Expect::default();
        expect.boot(Dialect::TypeA, TEST_MODEL);
        expect.cmd_with_data(0x10, &[0x03]);
        // wake: hardware reset plus the full init sequence again
        expect.reset();
        expect.busy_idle(Dialect::TypeA);
        expect.cmd(0x12);
        expect.busy_idle(Dialect::TypeA);
        expect.cmd_with_data(0x3C, &[0x05]);
        expect.cmd_with_data(0x18, &[0x80]);
        expect.cmd_with_data(0x11, &[0x03]);
        expect.cmd_with_data(0x44, &[0x00, 0x01]);
        expect.cmd_with_data(0x45, &[0x00, 0x00, 0x03, 0x00]);
        expect.cmd_with_data(0x4E, &[0x00]);
        expect.cmd_with_data(0x4F, &[0x00, 0x00]);
        expect.busy_idle(Dialect::TypeA);

        let mut harness = Harness::new(&expect);
        let mut epd = harness.boot(0x01, Config::new(TEST_MODEL));
        let mut delay = NoopDelay::new();
        epd.sleep(&mut harness.spi, &mut delay).unwrap();
        epd.wake_up(&mut harness.spi, &mut delay).unwrap();

        assert_eq!(epd.power_state(), PowerState::Active);
        harness.done();
    }
}
