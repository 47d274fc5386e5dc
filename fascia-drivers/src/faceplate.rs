//! uPD16432B faceplate driver
//!
//! Drives the faceplate's display controller as SPI master. Each transfer
//! is one strobed transaction: strobe high, command byte plus data bytes
//! out, strobe low. The controller accepts at most 32 bytes per
//! transaction.
//!
//! The driver keeps a shadow copy of everything it has transmitted, so
//! deciding whether hardware needs an update is a pure comparison against
//! the shadow - no SPI traffic happens for unchanged state.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::spi::SpiBus;

use fascia_core::upd::{
    cmd as upd_cmd, Upd, CHARGEN_GLYPH_COUNT, CHARGEN_GLYPH_LEN, DISPLAY_DATA_RAM_SIZE,
    PICTOGRAPH_RAM_SIZE,
};
use fascia_protocol::MAX_SPI_DATA;

/// Command bytes this driver puts on the wire
mod cmd {
    use super::upd_cmd;

    /// Duty and drive selection; sent once during init
    pub const DISPLAY_SETTING: u8 = upd_cmd::GROUP_DISPLAY_SETTING | 0x04;
    pub const DATA_SETTING_DISPLAY_DATA: u8 =
        upd_cmd::GROUP_DATA_SETTING | upd_cmd::RAM_AREA_DISPLAY_DATA;
    pub const DATA_SETTING_PICTOGRAPH: u8 =
        upd_cmd::GROUP_DATA_SETTING | upd_cmd::RAM_AREA_PICTOGRAPH;
    pub const DATA_SETTING_CHARGEN: u8 = upd_cmd::GROUP_DATA_SETTING | upd_cmd::RAM_AREA_CHARGEN;
    pub const ADDRESS_SETTING: u8 = upd_cmd::GROUP_ADDRESS_SETTING;
}

/// Blank display data character
const BLANK: u8 = 0x20;

/// Faceplate driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceplateError<SpiE, PinE> {
    /// SPI bus error
    Spi(SpiE),
    /// Strobe pin error
    Pin(PinE),
    /// A transaction needs at least a command byte
    EmptyCommand,
    /// The controller accepts at most 32 bytes per transaction
    CommandTooLong,
}

/// Which RAM areas differ between desired state and hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AreaSet {
    pub display_data: bool,
    pub pictograph: bool,
    pub chargen: bool,
}

impl AreaSet {
    /// True if any area needs transmission
    pub fn any(&self) -> bool {
        self.display_data || self.pictograph || self.chargen
    }
}

/// uPD16432B faceplate driver
///
/// Owns the SPI bus and the strobe pin for the faceplate's display
/// controller.
pub struct Faceplate<SPI, STB> {
    spi: SPI,
    stb: STB,
    shadow: Upd,
}

impl<SPI, STB> Faceplate<SPI, STB>
where
    SPI: SpiBus,
    STB: OutputPin,
{
    /// Create a driver around an SPI bus and strobe pin
    ///
    /// The shadow starts at the controller's power-on state; call
    /// [`init`](Faceplate::init) before relying on it.
    pub fn new(spi: SPI, stb: STB) -> Self {
        Self {
            spi,
            stb,
            shadow: Upd::new(),
        }
    }

    /// State last transmitted to the hardware
    pub fn shadow(&self) -> &Upd {
        &self.shadow
    }

    /// Give the bus and strobe pin back
    pub fn release(self) -> (SPI, STB) {
        (self.spi, self.stb)
    }

    /// Configure the controller and blank the display
    ///
    /// Safe to call again at any time; the hardware ends up in the same
    /// state regardless of what it held before.
    pub async fn init(&mut self) -> Result<(), FaceplateError<SPI::Error, STB::Error>> {
        self.send_command(&[cmd::DISPLAY_SETTING]).await?;
        self.clear_display().await
    }

    /// Transmit one strobed transaction and mirror it into the shadow
    pub async fn send_command(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), FaceplateError<SPI::Error, STB::Error>> {
        if bytes.is_empty() {
            return Err(FaceplateError::EmptyCommand);
        }
        if bytes.len() > MAX_SPI_DATA {
            return Err(FaceplateError::CommandTooLong);
        }

        self.stb.set_high().map_err(FaceplateError::Pin)?;
        let written = self.spi.write(bytes).await;
        let flushed = self.spi.flush().await;
        self.stb.set_low().map_err(FaceplateError::Pin)?;
        written.map_err(FaceplateError::Spi)?;
        flushed.map_err(FaceplateError::Spi)?;

        self.shadow.process_command(bytes);
        Ok(())
    }

    /// Blank the display: spaces across display data, pictographs all off
    pub async fn clear_display(&mut self) -> Result<(), FaceplateError<SPI::Error, STB::Error>> {
        let mut transaction = [BLANK; 1 + DISPLAY_DATA_RAM_SIZE];
        transaction[0] = cmd::ADDRESS_SETTING;
        self.send_command(&[cmd::DATA_SETTING_DISPLAY_DATA]).await?;
        self.send_command(&transaction).await?;

        let mut transaction = [0u8; 1 + PICTOGRAPH_RAM_SIZE];
        transaction[0] = cmd::ADDRESS_SETTING;
        self.send_command(&[cmd::DATA_SETTING_PICTOGRAPH]).await?;
        self.send_command(&transaction).await
    }

    /// Which areas of `desired` differ from what the hardware holds
    ///
    /// Pure decision path: no bus traffic, no state change.
    pub fn pending(&self, desired: &Upd) -> AreaSet {
        AreaSet {
            display_data: desired.display_data() != self.shadow.display_data(),
            pictograph: desired.pictograph() != self.shadow.pictograph(),
            chargen: desired.chargen() != self.shadow.chargen(),
        }
    }

    /// Bring the hardware in line with `desired`, transmitting only the
    /// areas that differ
    ///
    /// Returns the areas that were sent. Unchanged state produces no SPI
    /// traffic at all.
    pub async fn update_from(
        &mut self,
        desired: &Upd,
    ) -> Result<AreaSet, FaceplateError<SPI::Error, STB::Error>> {
        let pending = self.pending(desired);

        if pending.display_data {
            let mut transaction = [0u8; 1 + DISPLAY_DATA_RAM_SIZE];
            transaction[0] = cmd::ADDRESS_SETTING;
            transaction[1..].copy_from_slice(desired.display_data());
            self.send_command(&[cmd::DATA_SETTING_DISPLAY_DATA]).await?;
            self.send_command(&transaction).await?;
        }

        if pending.pictograph {
            let mut transaction = [0u8; 1 + PICTOGRAPH_RAM_SIZE];
            transaction[0] = cmd::ADDRESS_SETTING;
            transaction[1..].copy_from_slice(desired.pictograph());
            self.send_command(&[cmd::DATA_SETTING_PICTOGRAPH]).await?;
            self.send_command(&transaction).await?;
        }

        if pending.chargen {
            // Chargen exceeds one transaction; re-upload changed glyphs only
            self.send_command(&[cmd::DATA_SETTING_CHARGEN]).await?;
            for glyph in 0..CHARGEN_GLYPH_COUNT {
                let base = glyph * CHARGEN_GLYPH_LEN;
                let wanted = &desired.chargen()[base..base + CHARGEN_GLYPH_LEN];
                if wanted == &self.shadow.chargen()[base..base + CHARGEN_GLYPH_LEN] {
                    continue;
                }
                let mut transaction = [0u8; 1 + CHARGEN_GLYPH_LEN];
                transaction[0] = cmd::ADDRESS_SETTING | glyph as u8;
                transaction[1..].copy_from_slice(wanted);
                self.send_command(&transaction).await?;
            }
        }

        Ok(pending)
    }
}
