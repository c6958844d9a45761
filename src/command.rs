//! SPI command tables for the two controller dialects
//!
//! The Fone's panels shipped with two different controller revisions that
//! speak different command sets; which one is installed is only known after
//! probing at boot (see [`Dialect`](crate::dialect::Dialect)).

/// All commands need to have this trait which gives the address of the
/// command which needs to be send via SPI with activated CommandPin
/// (Data/Command Pin in CommandMode)
pub(crate) trait Command: Copy {
    fn address(self) -> u8;
}

/// Commands of the newer low-voltage controller (variant A).
///
/// This dialect addresses RAM through explicit X/Y windows and counters,
/// which is also what makes windowed partial refresh possible.
#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum TypeACommand {
    /// Deep Sleep Mode Control
    ///     1 Databyte, 0x03 enters deep sleep (wake needs a hardware reset)
    DeepSleepMode = 0x10,
    /// Data Entry mode setting
    ///     1 Databyte, 0x03: x increment, y increment
    DataEntryModeSetting = 0x11,
    SwReset = 0x12,
    /// Temperature Sensor Control, 0x80 selects the internal sensor
    TemperatureSensorControl = 0x18,
    /// Activate Display Update Sequence, loaded by DisplayUpdateControl2
    MasterActivation = 0x20,
    /// Display Update Control 2
    ///     1 Databyte selecting the update sequence, 0xF7 for a full cycle
    DisplayUpdateControl2 = 0x22,
    /// Write RAM of the black/white plane
    WriteRamBlack = 0x24,
    /// Write RAM of the red/highlight plane
    WriteRamRed = 0x26,
    /// Border Waveform Control
    BorderWaveformControl = 0x3C,
    /// Set RAM X-address Start/End position
    ///     2 Databytes: start and end, both in byte (8 pixel) units
    SetRamXAddressRange = 0x44,
    /// Set RAM Y-address Start/End position
    ///     4 Databytes: A[7:0], A[8], B[7:0], B[8]
    SetRamYAddressRange = 0x45,
    /// Set RAM X-address counter, in byte units
    SetRamXAddressCounter = 0x4E,
    /// Set RAM Y-address counter
    ///     2 Databytes: A[7:0], A[8]
    SetRamYAddressCounter = 0x4F,
}

impl Command for TypeACommand {
    fn address(self) -> u8 {
        self as u8
    }
}

/// Commands of the legacy controller (variant B), fixed full-panel
/// addressing only.
#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum TypeBCommand {
    /// Panel Setting, 0x0F: LUT from OTP, black/white/red mode
    PanelSetting = 0x00,
    PowerOff = 0x02,
    PowerOn = 0x04,
    /// Deep Sleep, guarded by the check code 0xA5
    DeepSleep = 0x07,
    /// Data Start Transmission 1 (black/white plane)
    DataStartTransmission1 = 0x10,
    DisplayRefresh = 0x12,
    /// Data Start Transmission 2 (red/highlight plane)
    DataStartTransmission2 = 0x13,
    /// VCOM and Data Interval Setting, 0xF7 floats the border before sleep
    VcomAndDataIntervalSetting = 0x50,
}

impl Command for TypeBCommand {
    fn address(self) -> u8 {
        self as u8
    }
}

/// The one command both dialects answer before initialization.
#[derive(Copy, Clone)]
pub(crate) enum ProbeCommand {
    /// Status read; the response byte identifies the controller revision
    /// and has to be clocked in by hand, see
    /// [`ProbePort`](crate::interface::ProbePort)
    ReadStatus = 0x2F,
}

impl Command for ProbeCommand {
    fn address(self) -> u8 {
        self as u8
    }
}

/// Commands used only on the windowed (partial refresh) path.
#[derive(Copy, Clone)]
pub(crate) enum PartialCommand {
    /// Load the fast partial waveform table; followed by
    /// [`constants::LUT_PARTIAL`]
    LoadPartialLut = 0x20,
    /// Leave windowed mode after a partial update
    PartialOut = 0x92,
}

impl Command for PartialCommand {
    fn address(self) -> u8 {
        self as u8
    }
}

pub(crate) mod constants {
    /// The fast partial-refresh waveform, replacing the ghost-free full
    /// waveform baked into the controller OTP for the duration of a
    /// windowed update.
    pub(crate) const LUT_PARTIAL: [u8; 42] = [
        0x10, 0x18, 0x18, 0x08, 0x18, 0x18, 0x08, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x13, 0x14, 0x44, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x22, 0x17,
    ];
}
