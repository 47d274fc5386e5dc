//! Radio state decoding
//!
//! The radio never exposes its internal state directly; everything it knows
//! shows up as 11 characters of display text. This module classifies each
//! display frame (tuner, tape, CD, SAFE screens, sound adjustments) and
//! accumulates the results into a [`RadioState`].
//!
//! Both Premium 4 and Premium 5 screen layouts are recognized. Frames that
//! match no known screen leave the decoded fields untouched so a momentary
//! glitch cannot wipe good state.

use fascia_protocol::{DISPLAY_TEXT_LEN, RADIO_STATE_DUMP_LEN};

/// What the radio is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperationMode {
    Unknown = 0,
    /// SAFE code entry screen
    SafeEntry = 10,
    /// SAFE lockout screen
    SafeLocked = 11,
    TunerPlaying = 20,
    TunerScanning = 21,
    CdPlaying = 30,
    CdCueing = 31,
    CdNoDisc = 33,
    CdNoChanger = 34,
    CdCheckMagazine = 35,
    /// CD changer reports an empty slot
    CdxNoCd = 36,
    /// CD changer reports an unreadable disc
    CdxCdError = 37,
    TapePlaying = 40,
    TapeLoad = 41,
    TapeMetal = 42,
    TapeFastForward = 43,
    TapeRewind = 44,
    /// Music search fast-forward
    TapeMssFastForward = 45,
    /// Music search rewind
    TapeMssRewind = 46,
    TapeNoTape = 47,
    TapeError = 48,
}

/// What the display is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DisplayMode {
    Unknown = 0,
    /// Normal operation readout (tuner, tape, CD, SAFE)
    ShowingOperation = 10,
    AdjustingVolume = 20,
    AdjustingBalance = 21,
    AdjustingFade = 22,
    AdjustingBass = 23,
    AdjustingTreble = 24,
    AdjustingMidrange = 25,
}

/// Tuner band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TunerBand {
    Unknown = 0,
    Fm1 = 1,
    Fm2 = 2,
    Am = 3,
}

/// Decoded radio state, accumulated across display frames
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioState {
    pub operation_mode: OperationMode,
    pub display_mode: DisplayMode,
    /// SAFE code attempts used (leading digit of the SAFE screens)
    pub safe_tries: u8,
    /// Last SAFE code seen on the entry screen
    pub safe_code: u16,
    pub sound_bass: i8,
    pub sound_treble: i8,
    pub sound_midrange: i8,
    /// Negative is left
    pub sound_balance: i8,
    /// Negative is rear
    pub sound_fade: i8,
    /// 0 = unknown, 1 = side A, 2 = side B
    pub tape_side: u8,
    pub cd_disc: u8,
    pub cd_track: u8,
    pub cd_cue_pos: u16,
    /// FM: tenths of MHz. AM: tenths of kHz x100 (both fit a u16)
    pub tuner_freq: u16,
    /// 0 = none
    pub tuner_preset: u8,
    pub tuner_band: TunerBand,
    /// Last non-blank display frame
    pub display: [u8; DISPLAY_TEXT_LEN],
}

/// SAFE counter shown while the radio is locked out
const SAFE_LOCKED_CODE: u16 = 1000;

impl Default for RadioState {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioState {
    pub const fn new() -> Self {
        Self {
            operation_mode: OperationMode::Unknown,
            display_mode: DisplayMode::Unknown,
            safe_tries: 0,
            safe_code: 0,
            sound_bass: 0,
            sound_treble: 0,
            sound_midrange: 0,
            sound_balance: 0,
            sound_fade: 0,
            tape_side: 0,
            cd_disc: 0,
            cd_track: 0,
            cd_cue_pos: 0,
            tuner_freq: 0,
            tuner_preset: 0,
            tuner_band: TunerBand::Unknown,
            display: [b' '; DISPLAY_TEXT_LEN],
        }
    }

    /// Forget everything decoded so far
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Classify one display frame and fold it into the state
    ///
    /// Blank frames (all NUL or all spaces) are ignored entirely.
    pub fn process(&mut self, text: &[u8; DISPLAY_TEXT_LEN]) {
        if text.iter().all(|&b| b == 0) || text.iter().all(|&b| b == b' ') {
            return;
        }

        let _ = self.parse_safe(text)
            || self.parse_adjustment(text)
            || self.parse_tape(text)
            || self.parse_cd(text)
            || self.parse_tuner(text);

        self.display = *text;
    }

    /// Serialize into the fixed wire layout used by state dump replies
    pub fn dump(&self) -> [u8; RADIO_STATE_DUMP_LEN] {
        let mut out = [0u8; RADIO_STATE_DUMP_LEN];
        out[0] = self.operation_mode as u8;
        out[1] = self.display_mode as u8;
        out[2] = self.safe_tries;
        out[3..5].copy_from_slice(&self.safe_code.to_le_bytes());
        out[5] = self.sound_bass as u8;
        out[6] = self.sound_treble as u8;
        out[7] = self.sound_midrange as u8;
        out[8] = self.sound_balance as u8;
        out[9] = self.sound_fade as u8;
        out[10] = self.tape_side;
        out[11] = self.cd_disc;
        out[12] = self.cd_track;
        out[13..15].copy_from_slice(&self.cd_cue_pos.to_le_bytes());
        out[15..17].copy_from_slice(&self.tuner_freq.to_le_bytes());
        out[17] = self.tuner_preset;
        out[18] = self.tuner_band as u8;
        out[19..30].copy_from_slice(&self.display);
        out
    }

    fn parse_safe(&mut self, t: &[u8; DISPLAY_TEXT_LEN]) -> bool {
        // Lockout screen, both generations: "     SAFE  " / "1    SAFE  "
        if &t[5..9] == b"SAFE" {
            self.safe_tries = digit(t[0]).unwrap_or(0);
            self.safe_code = SAFE_LOCKED_CODE;
            self.operation_mode = OperationMode::SafeLocked;
            self.display_mode = DisplayMode::ShowingOperation;
            return true;
        }

        // Premium 4 code entry: "1    1234  "
        if t[1..5] == *b"    " && t[9..11] == *b"  " {
            if let Some(code) = parse_code(&t[5..9]) {
                self.safe_tries = digit(t[0]).unwrap_or(0);
                self.safe_code = code;
                self.operation_mode = OperationMode::SafeEntry;
                self.display_mode = DisplayMode::ShowingOperation;
                return true;
            }
        }

        // Premium 5 code entry: "1   1234   "
        if t[1..4] == *b"   " && t[8..11] == *b"   " {
            if let Some(code) = parse_code(&t[4..8]) {
                self.safe_tries = digit(t[0]).unwrap_or(0);
                self.safe_code = code;
                self.operation_mode = OperationMode::SafeEntry;
                self.display_mode = DisplayMode::ShowingOperation;
                return true;
            }
        }

        false
    }

    /// Sound adjustment screens change only the display mode and the value
    /// being adjusted; the radio keeps playing whatever it was playing.
    fn parse_adjustment(&mut self, t: &[u8; DISPLAY_TEXT_LEN]) -> bool {
        if &t[6..9] == b"MIN" || &t[6..9] == b"MAX" {
            self.display_mode = DisplayMode::AdjustingVolume;
            return true;
        }
        if &t[0..4] == b"BASS" {
            self.sound_bass = parse_level(t);
            self.display_mode = DisplayMode::AdjustingBass;
            return true;
        }
        if &t[0..4] == b"TREB" {
            self.sound_treble = parse_level(t);
            self.display_mode = DisplayMode::AdjustingTreble;
            return true;
        }
        if &t[0..3] == b"MID" {
            self.sound_midrange = parse_level(t);
            self.display_mode = DisplayMode::AdjustingMidrange;
            return true;
        }
        if &t[0..3] == b"BAL" {
            if let Some(balance) = parse_side(t, b"LEFT", b"RIGHT") {
                self.sound_balance = balance;
                self.display_mode = DisplayMode::AdjustingBalance;
                return true;
            }
        }
        if &t[0..4] == b"FADE" {
            if let Some(fade) = parse_side(t, b"REAR", b"FRONT") {
                self.sound_fade = fade;
                self.display_mode = DisplayMode::AdjustingFade;
                return true;
            }
        }
        false
    }

    fn parse_tape(&mut self, t: &[u8; DISPLAY_TEXT_LEN]) -> bool {
        let (mode, side) = match t {
            b"TAPE PLAY A" => (OperationMode::TapePlaying, Some(1)),
            b"TAPE PLAY B" => (OperationMode::TapePlaying, Some(2)),
            b"TAPE LOAD  " => (OperationMode::TapeLoad, Some(0)),
            b"TAPE METAL " => (OperationMode::TapeMetal, Some(0)),
            b"TAPE  FF   " => (OperationMode::TapeFastForward, None),
            b"TAPE  REW  " => (OperationMode::TapeRewind, None),
            b"TAPEMSS FF " => (OperationMode::TapeMssFastForward, None),
            b"TAPEMSS REW" => (OperationMode::TapeMssRewind, None),
            b"TAPE ERROR " => (OperationMode::TapeError, Some(0)),
            b"    NO TAPE" => (OperationMode::TapeNoTape, Some(0)),
            _ => return false,
        };

        self.operation_mode = mode;
        if let Some(side) = side {
            self.tape_side = side;
        }
        self.display_mode = DisplayMode::ShowingOperation;
        true
    }

    fn parse_cd(&mut self, t: &[u8; DISPLAY_TEXT_LEN]) -> bool {
        let mode = match t {
            b"CHK MAGAZIN" => Some(OperationMode::CdCheckMagazine),
            b"    NO DISC" => Some(OperationMode::CdNoDisc),
            b"NO  CHANGER" => Some(OperationMode::CdNoChanger),
            _ => None,
        };
        if let Some(mode) = mode {
            self.cd_disc = 0;
            self.cd_track = 0;
            self.cd_cue_pos = 0;
            self.operation_mode = mode;
            self.display_mode = DisplayMode::ShowingOperation;
            return true;
        }

        if &t[0..3] == b"CUE" {
            if let Some(pos) = parse_number(&t[4..9]) {
                self.cd_cue_pos = pos;
                self.operation_mode = OperationMode::CdCueing;
                self.display_mode = DisplayMode::ShowingOperation;
                return true;
            }
        }

        if &t[0..2] != b"CD" {
            return false;
        }

        // "CD1 CD ERR " - changer slot numbers pack against "CD" on errors
        if &t[4..10] == b"CD ERR" {
            self.cd_disc = digit(t[2]).unwrap_or(0);
            self.cd_track = 0;
            self.cd_cue_pos = 0;
            self.operation_mode = OperationMode::CdxCdError;
            self.display_mode = DisplayMode::ShowingOperation;
            return true;
        }

        // "CD 2 NO CD "
        if &t[5..10] == b"NO CD" {
            self.cd_disc = digit(t[3]).unwrap_or(0);
            self.cd_track = 0;
            self.cd_cue_pos = 0;
            self.operation_mode = OperationMode::CdxNoCd;
            self.display_mode = DisplayMode::ShowingOperation;
            return true;
        }

        // "CD 1 TR 01 "
        if &t[5..8] == b"TR " {
            let (Some(disc), Some(tens), Some(ones)) = (digit(t[3]), digit(t[8]), digit(t[9]))
            else {
                return false;
            };
            self.cd_disc = disc;
            self.cd_track = tens * 10 + ones;
            self.operation_mode = OperationMode::CdPlaying;
            self.display_mode = DisplayMode::ShowingOperation;
            return true;
        }

        false
    }

    fn parse_tuner(&mut self, t: &[u8; DISPLAY_TEXT_LEN]) -> bool {
        let fm = t[8..11].eq_ignore_ascii_case(b"MHZ");
        let am = t[8..11].eq_ignore_ascii_case(b"KHZ");
        if !fm && !am {
            return false;
        }

        let Some(mut freq) = parse_number(&t[4..8]) else {
            return false;
        };
        if am {
            // AM frequencies are displayed in kHz; store in the same tenths
            // scale the FM side uses
            freq *= 10;
        }

        if &t[0..4] == b"SCAN" {
            self.tuner_band = if am {
                TunerBand::Am
            } else {
                match self.tuner_band {
                    TunerBand::Fm1 | TunerBand::Fm2 => self.tuner_band,
                    _ => TunerBand::Fm1,
                }
            };
            self.tuner_preset = 0;
            self.operation_mode = OperationMode::TunerScanning;
        } else {
            self.tuner_band = if am {
                if &t[0..2] != b"AM" {
                    return false;
                }
                TunerBand::Am
            } else {
                match (&t[0..2], t[2]) {
                    (b"FM", b'1') => TunerBand::Fm1,
                    (b"FM", b'2') => TunerBand::Fm2,
                    _ => return false,
                }
            };
            self.tuner_preset = digit(t[3]).unwrap_or(0);
            self.operation_mode = OperationMode::TunerPlaying;
        }

        self.tuner_freq = freq;
        self.display_mode = DisplayMode::ShowingOperation;
        true
    }
}

/// ASCII digit value
fn digit(byte: u8) -> Option<u8> {
    byte.is_ascii_digit().then(|| byte - b'0')
}

/// Four-digit SAFE code
fn parse_code(text: &[u8]) -> Option<u16> {
    let mut code: u16 = 0;
    for &byte in text {
        code = code * 10 + digit(byte)? as u16;
    }
    Some(code)
}

/// Number with optional leading spaces, digits to the end of the slice
fn parse_number(text: &[u8]) -> Option<u16> {
    let first = text.iter().position(|b| *b != b' ')?;
    let mut value: u16 = 0;
    for &byte in &text[first..] {
        value = value * 10 + digit(byte)? as u16;
    }
    Some(value)
}

/// Signed single-digit level: "BASS  - 9  " -> -9, "TREB    0  " -> 0
fn parse_level(t: &[u8; DISPLAY_TEXT_LEN]) -> i8 {
    let Some(magnitude) = digit(t[8]) else {
        return 0;
    };
    match t[6] {
        b'-' => -(magnitude as i8),
        _ => magnitude as i8,
    }
}

/// Left/right style value: negative side, "CENTER", or positive side, with
/// the magnitude in the last column
fn parse_side(
    t: &[u8; DISPLAY_TEXT_LEN],
    negative: &[u8; 4],
    positive: &[u8; 5],
) -> Option<i8> {
    if &t[4..10] == b"CENTER" {
        return Some(0);
    }
    let magnitude = digit(t[10])? as i8;
    if &t[4..8] == negative {
        Some(-magnitude)
    } else if &t[4..9] == positive {
        Some(magnitude)
    } else {
        None
    }
}
