//! uPD16432B display controller emulation
//!
//! The uPD16432B drives the faceplate LCD and scans its keys. The radio
//! talks to it over SPI in strobed transactions of one command byte plus
//! up to 31 data bytes. The top two bits of the command byte select the
//! command group:
//!
//! - `0b00`: Display Setting (duty/drive selection; no RAM effect)
//! - `0b01`: Data Setting (selects a RAM area and the increment mode)
//! - `0b10`: Address Setting (positions the write pointer)
//! - `0b11`: Status (key scan request; no RAM effect)
//!
//! Data bytes following a Data Setting or Address Setting command are
//! written into the selected RAM area. The emulator mirrors all of this
//! into plain arrays and tracks which areas actually changed, so a driver
//! can retransmit only what differs.

use fascia_protocol::{DISPLAY_TEXT_LEN, KEY_DATA_LEN, UPD_STATE_DUMP_LEN};

/// Display data RAM size (11 visible characters live in the low addresses)
pub const DISPLAY_DATA_RAM_SIZE: usize = 25;

/// Pictograph RAM size (one bit per segment icon)
pub const PICTOGRAPH_RAM_SIZE: usize = 8;

/// Character generator RAM size
pub const CHARGEN_RAM_SIZE: usize = 112;

/// Bytes per character generator glyph
pub const CHARGEN_GLYPH_LEN: usize = 7;

/// Number of character generator glyphs
pub const CHARGEN_GLYPH_COUNT: usize = CHARGEN_RAM_SIZE / CHARGEN_GLYPH_LEN;

/// Command byte layout
pub mod cmd {
    /// Command group selector (top two bits)
    pub const GROUP_MASK: u8 = 0b1100_0000;
    pub const GROUP_DISPLAY_SETTING: u8 = 0b0000_0000;
    pub const GROUP_DATA_SETTING: u8 = 0b0100_0000;
    pub const GROUP_ADDRESS_SETTING: u8 = 0b1000_0000;
    pub const GROUP_STATUS: u8 = 0b1100_0000;

    /// Data Setting: RAM area select (low three bits)
    pub const RAM_AREA_MASK: u8 = 0b0000_0111;
    pub const RAM_AREA_DISPLAY_DATA: u8 = 0b000;
    pub const RAM_AREA_PICTOGRAPH: u8 = 0b001;
    pub const RAM_AREA_CHARGEN: u8 = 0b010;

    /// Data Setting: address auto-increment off when set
    pub const INCREMENT_OFF: u8 = 0b0000_1000;

    /// Address Setting: area-relative address (low six bits)
    pub const ADDRESS_MASK: u8 = 0b0011_1111;
}

/// Wire codes for the selected RAM area in a state dump
mod area_code {
    pub const DISPLAY_DATA: u8 = 0;
    pub const PICTOGRAPH: u8 = 1;
    pub const CHARGEN: u8 = 2;
    pub const NONE: u8 = 0xFF;
}

/// A writable RAM area inside the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RamArea {
    DisplayData,
    Pictograph,
    Chargen,
}

impl RamArea {
    /// Size of this area in bytes
    pub const fn size(self) -> usize {
        match self {
            RamArea::DisplayData => DISPLAY_DATA_RAM_SIZE,
            RamArea::Pictograph => PICTOGRAPH_RAM_SIZE,
            RamArea::Chargen => CHARGEN_RAM_SIZE,
        }
    }
}

/// Emulated uPD16432B register file
///
/// Feed it SPI transaction bytes with [`process_command`](Upd::process_command)
/// and read the mirrored RAM back out. Per-area dirty flags latch on any
/// write that changes a stored value and stay set until
/// [`clear_dirty`](Upd::clear_dirty) or [`reset`](Upd::reset).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Upd {
    area: Option<RamArea>,
    address: u8,
    increment: bool,
    display_data: [u8; DISPLAY_DATA_RAM_SIZE],
    display_data_dirty: bool,
    pictograph: [u8; PICTOGRAPH_RAM_SIZE],
    pictograph_dirty: bool,
    chargen: [u8; CHARGEN_RAM_SIZE],
    chargen_dirty: bool,
    key_data: [u8; KEY_DATA_LEN],
}

impl Default for Upd {
    fn default() -> Self {
        Self::new()
    }
}

impl Upd {
    /// Create an emulator in power-on state
    pub const fn new() -> Self {
        Self {
            area: None,
            address: 0,
            increment: false,
            display_data: [0; DISPLAY_DATA_RAM_SIZE],
            display_data_dirty: false,
            pictograph: [0; PICTOGRAPH_RAM_SIZE],
            pictograph_dirty: false,
            chargen: [0; CHARGEN_RAM_SIZE],
            chargen_dirty: false,
            key_data: [0; KEY_DATA_LEN],
        }
    }

    /// Return to power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Process one SPI transaction (command byte + data bytes)
    ///
    /// Empty transactions are ignored. Data bytes are written only after a
    /// Data Setting or Address Setting command; the Display Setting and
    /// Status groups carry no emulator-visible state.
    pub fn process_command(&mut self, bytes: &[u8]) {
        let Some((&command, data)) = bytes.split_first() else {
            return;
        };

        match command & cmd::GROUP_MASK {
            cmd::GROUP_DATA_SETTING => self.data_setting(command),
            cmd::GROUP_ADDRESS_SETTING => self.address_setting(command),
            _ => return,
        }

        for &byte in data {
            self.write_data(byte);
        }
    }

    /// Currently selected RAM area
    pub fn area(&self) -> Option<RamArea> {
        self.area
    }

    /// Current write address within the selected area
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Address auto-increment mode
    pub fn increment(&self) -> bool {
        self.increment
    }

    pub fn display_data(&self) -> &[u8; DISPLAY_DATA_RAM_SIZE] {
        &self.display_data
    }

    pub fn pictograph(&self) -> &[u8; PICTOGRAPH_RAM_SIZE] {
        &self.pictograph
    }

    pub fn chargen(&self) -> &[u8; CHARGEN_RAM_SIZE] {
        &self.chargen
    }

    pub fn display_data_dirty(&self) -> bool {
        self.display_data_dirty
    }

    pub fn pictograph_dirty(&self) -> bool {
        self.pictograph_dirty
    }

    pub fn chargen_dirty(&self) -> bool {
        self.chargen_dirty
    }

    /// True if any RAM area changed since the last [`clear_dirty`](Upd::clear_dirty)
    pub fn any_dirty(&self) -> bool {
        self.display_data_dirty || self.pictograph_dirty || self.chargen_dirty
    }

    /// Mark all RAM areas as synced
    pub fn clear_dirty(&mut self) {
        self.display_data_dirty = false;
        self.pictograph_dirty = false;
        self.chargen_dirty = false;
    }

    /// Key scan latch contents
    pub fn key_data(&self) -> &[u8; KEY_DATA_LEN] {
        &self.key_data
    }

    /// Load the key scan latch a polling radio reads back
    pub fn load_key_data(&mut self, key_data: [u8; KEY_DATA_LEN]) {
        self.key_data = key_data;
    }

    /// The visible characters in reading order
    ///
    /// Display data RAM runs right to left: address 0 holds the rightmost
    /// character. Unwritten cells read as blanks.
    pub fn display_text(&self) -> [u8; DISPLAY_TEXT_LEN] {
        let mut text = [0u8; DISPLAY_TEXT_LEN];
        for (i, ch) in text.iter_mut().enumerate() {
            let byte = self.display_data[DISPLAY_TEXT_LEN - 1 - i];
            *ch = if byte == 0 { b' ' } else { byte };
        }
        text
    }

    /// Serialize into the fixed wire layout used by state dump replies
    pub fn dump(&self) -> [u8; UPD_STATE_DUMP_LEN] {
        let mut out = [0u8; UPD_STATE_DUMP_LEN];
        out[0] = match self.area {
            Some(RamArea::DisplayData) => area_code::DISPLAY_DATA,
            Some(RamArea::Pictograph) => area_code::PICTOGRAPH,
            Some(RamArea::Chargen) => area_code::CHARGEN,
            None => area_code::NONE,
        };
        out[1] = self.area.map_or(0, |area| area.size() as u8);
        out[2] = self.address;
        out[3] = self.increment as u8;
        out[4..29].copy_from_slice(&self.display_data);
        out[29] = self.display_data_dirty as u8;
        out[30..38].copy_from_slice(&self.pictograph);
        out[38] = self.pictograph_dirty as u8;
        out[39..151].copy_from_slice(&self.chargen);
        out[151] = self.chargen_dirty as u8;
        out
    }

    fn data_setting(&mut self, command: u8) {
        self.address = 0;
        match command & cmd::RAM_AREA_MASK {
            cmd::RAM_AREA_DISPLAY_DATA => {
                self.area = Some(RamArea::DisplayData);
                self.increment = command & cmd::INCREMENT_OFF == 0;
            }
            cmd::RAM_AREA_PICTOGRAPH => {
                self.area = Some(RamArea::Pictograph);
                self.increment = command & cmd::INCREMENT_OFF == 0;
            }
            cmd::RAM_AREA_CHARGEN => {
                // Chargen writes are always 7-byte glyph bursts; the
                // increment-off bit has no effect
                self.area = Some(RamArea::Chargen);
                self.increment = true;
            }
            _ => {
                self.area = None;
                self.increment = true;
            }
        }
    }

    fn address_setting(&mut self, command: u8) {
        let address = command & cmd::ADDRESS_MASK;
        self.address = match self.area {
            Some(RamArea::DisplayData) if (address as usize) < DISPLAY_DATA_RAM_SIZE => address,
            Some(RamArea::Pictograph) if (address as usize) < PICTOGRAPH_RAM_SIZE => address,
            // Chargen addresses are glyph indexes
            Some(RamArea::Chargen) if (address as usize) < CHARGEN_GLYPH_COUNT => {
                address * CHARGEN_GLYPH_LEN as u8
            }
            _ => 0,
        };
    }

    fn write_data(&mut self, value: u8) {
        match self.area {
            Some(RamArea::DisplayData) => write_cell(
                &mut self.display_data,
                &mut self.display_data_dirty,
                &mut self.address,
                self.increment,
                value,
            ),
            Some(RamArea::Pictograph) => write_cell(
                &mut self.pictograph,
                &mut self.pictograph_dirty,
                &mut self.address,
                self.increment,
                value,
            ),
            Some(RamArea::Chargen) => write_cell(
                &mut self.chargen,
                &mut self.chargen_dirty,
                &mut self.address,
                self.increment,
                value,
            ),
            None => {}
        }
    }
}

/// Write one byte at the current address, latching the dirty flag on change
/// and advancing (with wraparound) when increment mode is on.
fn write_cell(ram: &mut [u8], dirty: &mut bool, address: &mut u8, increment: bool, value: u8) {
    let index = *address as usize;
    if ram[index] != value {
        ram[index] = value;
        *dirty = true;
    }
    if increment {
        *address = if index + 1 == ram.len() {
            0
        } else {
            (index + 1) as u8
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_setting(area_bits: u8, increment_off: bool) -> u8 {
        let mut command = cmd::GROUP_DATA_SETTING | area_bits;
        if increment_off {
            command |= cmd::INCREMENT_OFF;
        }
        command
    }

    #[test]
    fn test_resets_to_known_state() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false), 1, 2, 3]);
        upd.reset();

        assert_eq!(upd.area(), None);
        assert_eq!(upd.address(), 0);
        assert!(!upd.increment());
        assert_eq!(upd.display_data(), &[0; DISPLAY_DATA_RAM_SIZE]);
        assert_eq!(upd.pictograph(), &[0; PICTOGRAPH_RAM_SIZE]);
        assert_eq!(upd.chargen(), &[0; CHARGEN_RAM_SIZE]);
        assert!(!upd.any_dirty());
    }

    #[test]
    fn test_empty_transaction_ignored() {
        let mut upd = Upd::new();
        upd.process_command(&[]);
        assert_eq!(upd, Upd::new());
    }

    #[test]
    fn test_data_setting_selects_display_data_increment_off() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, true)]);
        assert_eq!(upd.area(), Some(RamArea::DisplayData));
        assert!(!upd.increment());
    }

    #[test]
    fn test_data_setting_selects_display_data_increment_on() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false)]);
        assert_eq!(upd.area(), Some(RamArea::DisplayData));
        assert!(upd.increment());
    }

    #[test]
    fn test_data_setting_selects_pictograph_increment_off() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_PICTOGRAPH, true)]);
        assert_eq!(upd.area(), Some(RamArea::Pictograph));
        assert!(!upd.increment());
    }

    #[test]
    fn test_data_setting_selects_chargen_increment_on() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_CHARGEN, false)]);
        assert_eq!(upd.area(), Some(RamArea::Chargen));
        assert!(upd.increment());
    }

    #[test]
    fn test_data_setting_chargen_ignores_increment_off() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_CHARGEN, true)]);
        assert_eq!(upd.area(), Some(RamArea::Chargen));
        assert!(upd.increment());
    }

    #[test]
    fn test_data_setting_unrecognized_area_selects_none() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(0b111, false)]);
        assert_eq!(upd.area(), None);
        assert_eq!(upd.address(), 0);
        assert!(upd.increment());
    }

    #[test]
    fn test_data_setting_unrecognized_area_ignores_increment_off() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(0b111, true)]);
        assert_eq!(upd.area(), None);
        assert!(upd.increment());
    }

    #[test]
    fn test_address_setting_without_area_sets_zero() {
        let mut upd = Upd::new();
        assert_eq!(upd.area(), None);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING | 0x03]);
        assert_eq!(upd.address(), 0);
    }

    #[test]
    fn test_address_setting_validates_per_area() {
        // (area bits, requested address, stored address)
        let cases = [
            (cmd::RAM_AREA_DISPLAY_DATA, 0x00, 0x00), // min
            (cmd::RAM_AREA_DISPLAY_DATA, 0x18, 0x18), // max
            (cmd::RAM_AREA_DISPLAY_DATA, 0x19, 0x00), // out of range
            (cmd::RAM_AREA_PICTOGRAPH, 0x00, 0x00),
            (cmd::RAM_AREA_PICTOGRAPH, 0x07, 0x07),
            (cmd::RAM_AREA_PICTOGRAPH, 0x08, 0x00),
            (cmd::RAM_AREA_CHARGEN, 0x00, 0x00),
            (cmd::RAM_AREA_CHARGEN, 0x0F, 0x69), // glyph index * 7
            (cmd::RAM_AREA_CHARGEN, 0x10, 0x00),
        ];

        for (area_bits, address, expected) in cases {
            let mut upd = Upd::new();
            upd.process_command(&[data_setting(area_bits, false)]);
            upd.process_command(&[cmd::GROUP_ADDRESS_SETTING | address]);
            assert_eq!(upd.address(), expected, "area {:03b} addr {:#04x}", area_bits, address);
        }
    }

    #[test]
    fn test_writes_without_area_are_ignored() {
        let mut upd = Upd::new();
        let before = upd.clone();
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(upd, before);
    }

    #[test]
    fn test_display_data_write_with_increment_wraps() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false)]);

        let mut transaction = [0u8; 1 + DISPLAY_DATA_RAM_SIZE];
        transaction[0] = cmd::GROUP_ADDRESS_SETTING;
        for (i, byte) in transaction[1..].iter_mut().enumerate() {
            *byte = (i + 1) as u8;
        }
        upd.process_command(&transaction);

        assert_eq!(upd.area(), Some(RamArea::DisplayData));
        assert!(upd.increment());
        assert_eq!(upd.address(), 0); // wrapped around
        for (i, &byte) in upd.display_data().iter().enumerate() {
            assert_eq!(byte, (i + 1) as u8);
        }
    }

    #[test]
    fn test_display_data_write_with_increment_off_rewrites_cell() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, true)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING | 5, 1, 2, 3, 4, 5, 6, 7]);

        assert!(!upd.increment());
        assert_eq!(upd.address(), 5);
        assert_eq!(upd.display_data()[5], 7);
        assert_eq!(upd.display_data()[6], 0);
    }

    #[test]
    fn test_writing_same_value_does_not_set_dirty() {
        for area_bits in [
            cmd::RAM_AREA_DISPLAY_DATA,
            cmd::RAM_AREA_PICTOGRAPH,
            cmd::RAM_AREA_CHARGEN,
        ] {
            let mut upd = Upd::new();
            upd.process_command(&[data_setting(area_bits, false)]);
            upd.process_command(&[cmd::GROUP_ADDRESS_SETTING, 0]);
            assert!(!upd.any_dirty(), "area {:03b}", area_bits);
        }
    }

    #[test]
    fn test_writing_new_value_sets_dirty() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING, 1]);
        assert!(upd.display_data_dirty());
        assert!(!upd.pictograph_dirty());
        assert!(!upd.chargen_dirty());

        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_PICTOGRAPH, false)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING, 1]);
        assert!(upd.pictograph_dirty());

        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_CHARGEN, false)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING, 1]);
        assert!(upd.chargen_dirty());
    }

    #[test]
    fn test_clear_dirty_keeps_ram_contents() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING, 0x41]);
        assert!(upd.display_data_dirty());

        upd.clear_dirty();
        assert!(!upd.any_dirty());
        assert_eq!(upd.display_data()[0], 0x41);
    }

    #[test]
    fn test_display_setting_and_status_groups_ignored() {
        let mut upd = Upd::new();
        let before = upd.clone();
        upd.process_command(&[cmd::GROUP_DISPLAY_SETTING | 0x04, 1, 2, 3]);
        upd.process_command(&[cmd::GROUP_STATUS, 0xFF]);
        assert_eq!(upd, before);
    }

    #[test]
    fn test_same_command_stream_gives_identical_state() {
        let transactions: [&[u8]; 3] = [
            &[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false)],
            &[cmd::GROUP_ADDRESS_SETTING, 0, 0, 0x6F, 0x6C, 0x6C, 0x65, 0x48],
            &[data_setting(cmd::RAM_AREA_PICTOGRAPH, true)],
        ];

        let mut a = Upd::new();
        let mut b = Upd::new();
        for transaction in transactions {
            a.process_command(transaction);
            b.process_command(transaction);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_text_reads_right_to_left() {
        let mut upd = Upd::new();
        // Write "Hello" backwards starting at address 0, the way a radio does
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING, 0, 0, b'o', b'l', b'l', b'e', b'H']);

        assert_eq!(&upd.display_text(), b"    Hello  ");
    }

    #[test]
    fn test_load_key_data() {
        let mut upd = Upd::new();
        upd.load_key_data([0x10, 0x20, 0x30, 0x40]);
        assert_eq!(upd.key_data(), &[0x10, 0x20, 0x30, 0x40]);
        upd.reset();
        assert_eq!(upd.key_data(), &[0; KEY_DATA_LEN]);
    }

    #[test]
    fn test_dump_layout() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_DISPLAY_DATA, false)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING | 2, 0x41, 0x42]);

        let dump = upd.dump();
        assert_eq!(dump.len(), UPD_STATE_DUMP_LEN);
        assert_eq!(dump[0], 0); // display data area
        assert_eq!(dump[1], DISPLAY_DATA_RAM_SIZE as u8);
        assert_eq!(dump[2], 4); // two writes from address 2
        assert_eq!(dump[3], 1); // increment on
        assert_eq!(dump[4 + 2], 0x41);
        assert_eq!(dump[4 + 3], 0x42);
        assert_eq!(dump[29], 1); // display data dirty
        assert_eq!(dump[38], 0); // pictograph clean
        assert_eq!(dump[151], 0); // chargen clean
    }

    #[test]
    fn test_dump_reports_no_area_as_0xff() {
        let dump = Upd::new().dump();
        assert_eq!(dump[0], 0xFF);
        assert_eq!(dump[1], 0);
        assert_eq!(dump[2], 0);
        assert_eq!(dump[3], 0);
    }

    #[test]
    fn test_chargen_write_fills_glyph() {
        let mut upd = Upd::new();
        upd.process_command(&[data_setting(cmd::RAM_AREA_CHARGEN, false)]);
        upd.process_command(&[cmd::GROUP_ADDRESS_SETTING | 0x02, 1, 2, 3, 4, 5, 6, 7]);

        let base = 2 * CHARGEN_GLYPH_LEN;
        assert_eq!(&upd.chargen()[base..base + CHARGEN_GLYPH_LEN], &[1, 2, 3, 4, 5, 6, 7]);
        assert!(upd.chargen_dirty());
        // Address advanced to the start of the next glyph
        assert_eq!(upd.address() as usize, base + CHARGEN_GLYPH_LEN);
    }

    #[test]
    fn test_address_stays_in_bounds_for_any_command_stream() {
        // A coarse exhaustive sweep: every command byte followed by a burst
        // of writes must keep the address inside the selected area.
        for command in 0..=255u8 {
            let mut upd = Upd::new();
            upd.process_command(&[data_setting(cmd::RAM_AREA_CHARGEN, false)]);
            upd.process_command(&[command, 9, 9, 9, 9, 9, 9, 9, 9, 9]);
            if let Some(area) = upd.area() {
                assert!((upd.address() as usize) < area.size(), "command {:#04x}", command);
            } else {
                assert_eq!(upd.address(), 0);
            }
        }
    }
}
