//! Typed commands and their wire ids.
//!
//! A command body is the frame payload produced by
//! [`CommandReader`](crate::reader::CommandReader): one id byte followed by
//! arguments. Parsing validates argument counts and ranges; any violation
//! maps to a NAK reply.

use crate::{DISPLAY_TEXT_LEN, KEY_DATA_LEN, MAX_SPI_DATA};

/// Command ids
pub mod id {
    pub const SET_LED: u8 = 0x01;
    pub const ECHO: u8 = 0x02;
    pub const SET_RUN_MODE: u8 = 0x03;

    pub const EMULATED_UPD_DUMP_STATE: u8 = 0x10;
    pub const EMULATED_UPD_SEND_COMMAND: u8 = 0x11;
    pub const EMULATED_UPD_RESET: u8 = 0x12;

    pub const RADIO_LOAD_KEY_DATA: u8 = 0x20;
    pub const RADIO_STATE_PROCESS: u8 = 0x21;
    pub const RADIO_STATE_DUMP: u8 = 0x22;
    pub const RADIO_STATE_RESET: u8 = 0x23;

    pub const FACEPLATE_UPD_DUMP_STATE: u8 = 0x30;
    pub const FACEPLATE_UPD_SEND_COMMAND: u8 = 0x31;
    pub const FACEPLATE_CLEAR_DISPLAY: u8 = 0x32;
}

// Wire format values
const RUN_MODE_NORMAL: u8 = 0x00;
const RUN_MODE_TEST: u8 = 0x01;
const LED_GREEN: u8 = 0x00;
const LED_RED: u8 = 0x01;

/// Tool run modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunMode {
    /// Emulated state is mirrored to the faceplate continuously and the
    /// radio decoder runs on every display change
    Normal,
    /// Automatic mirroring pauses; the host owns all state
    Test,
}

impl RunMode {
    /// Parse a run mode from its wire format byte
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            RUN_MODE_NORMAL => Some(RunMode::Normal),
            RUN_MODE_TEST => Some(RunMode::Test),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub const fn to_byte(self) -> u8 {
        match self {
            RunMode::Normal => RUN_MODE_NORMAL,
            RunMode::Test => RUN_MODE_TEST,
        }
    }
}

/// Board status LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Led {
    Green,
    Red,
}

impl Led {
    /// Parse an LED selector from its wire format byte
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            LED_GREEN => Some(Led::Green),
            LED_RED => Some(Led::Red),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub const fn to_byte(self) -> u8 {
        match self {
            Led::Green => LED_GREEN,
            Led::Red => LED_RED,
        }
    }
}

/// Errors that reject a command body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Zero-length frame
    Empty,
    /// Unrecognized command id
    UnknownCommand,
    /// Argument count or value out of range
    BadArgs,
}

/// A parsed host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Switch a board status LED
    SetLed { led: Led, on: bool },
    /// Reply with the arguments unchanged
    Echo(&'a [u8]),
    /// Switch between NORMAL and TEST run modes
    SetRunMode(RunMode),
    /// Dump the emulated uPD16432B state
    EmulatedUpdDumpState,
    /// Feed one SPI transaction to the emulated uPD16432B
    EmulatedUpdSendCommand(&'a [u8]),
    /// Reset the emulated uPD16432B to power-on state
    EmulatedUpdReset,
    /// Load the key scan latch a polling radio reads back
    RadioLoadKeyData(&'a [u8; KEY_DATA_LEN]),
    /// Run the radio decoder over one display frame
    RadioStateProcess(&'a [u8; DISPLAY_TEXT_LEN]),
    /// Dump the decoded radio state
    RadioStateDump,
    /// Reset the decoded radio state
    RadioStateReset,
    /// Dump the state last transmitted to the physical faceplate
    FaceplateUpdDumpState,
    /// Transmit one SPI transaction to the physical faceplate
    FaceplateUpdSendCommand(&'a [u8]),
    /// Clear the physical faceplate display
    FaceplateClearDisplay,
}

impl<'a> Command<'a> {
    /// Parse a command body (id byte + args)
    pub fn parse(body: &'a [u8]) -> Result<Self, CommandError> {
        let (&cmd, args) = body.split_first().ok_or(CommandError::Empty)?;

        match cmd {
            id::SET_LED => {
                if args.len() != 2 {
                    return Err(CommandError::BadArgs);
                }
                let led = Led::from_byte(args[0]).ok_or(CommandError::BadArgs)?;
                Ok(Command::SetLed {
                    led,
                    on: args[1] != 0,
                })
            }
            id::ECHO => Ok(Command::Echo(args)),
            id::SET_RUN_MODE => {
                if args.len() != 1 {
                    return Err(CommandError::BadArgs);
                }
                let mode = RunMode::from_byte(args[0]).ok_or(CommandError::BadArgs)?;
                Ok(Command::SetRunMode(mode))
            }
            id::EMULATED_UPD_DUMP_STATE => Self::no_args(args, Command::EmulatedUpdDumpState),
            id::EMULATED_UPD_SEND_COMMAND => {
                if args.len() > MAX_SPI_DATA {
                    return Err(CommandError::BadArgs);
                }
                Ok(Command::EmulatedUpdSendCommand(args))
            }
            id::EMULATED_UPD_RESET => Self::no_args(args, Command::EmulatedUpdReset),
            id::RADIO_LOAD_KEY_DATA => {
                let key_data = args.try_into().map_err(|_| CommandError::BadArgs)?;
                Ok(Command::RadioLoadKeyData(key_data))
            }
            id::RADIO_STATE_PROCESS => {
                let text = args.try_into().map_err(|_| CommandError::BadArgs)?;
                Ok(Command::RadioStateProcess(text))
            }
            id::RADIO_STATE_DUMP => Self::no_args(args, Command::RadioStateDump),
            id::RADIO_STATE_RESET => Self::no_args(args, Command::RadioStateReset),
            id::FACEPLATE_UPD_DUMP_STATE => Self::no_args(args, Command::FaceplateUpdDumpState),
            id::FACEPLATE_UPD_SEND_COMMAND => {
                if args.is_empty() || args.len() > MAX_SPI_DATA {
                    return Err(CommandError::BadArgs);
                }
                Ok(Command::FaceplateUpdSendCommand(args))
            }
            id::FACEPLATE_CLEAR_DISPLAY => Self::no_args(args, Command::FaceplateClearDisplay),
            _ => Err(CommandError::UnknownCommand),
        }
    }

    fn no_args(args: &[u8], command: Command<'a>) -> Result<Command<'a>, CommandError> {
        if args.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::BadArgs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_rejected() {
        assert_eq!(Command::parse(&[]), Err(CommandError::Empty));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert_eq!(Command::parse(&[0xFF]), Err(CommandError::UnknownCommand));
    }

    #[test]
    fn test_echo_accepts_any_args() {
        assert_eq!(Command::parse(&[id::ECHO]), Ok(Command::Echo(&[])));
        assert_eq!(
            Command::parse(&[id::ECHO, 1, 2, 3]),
            Ok(Command::Echo(&[1, 2, 3][..]))
        );
    }

    #[test]
    fn test_set_led() {
        assert_eq!(
            Command::parse(&[id::SET_LED, 0x00, 1]),
            Ok(Command::SetLed {
                led: Led::Green,
                on: true
            })
        );
        assert_eq!(
            Command::parse(&[id::SET_LED, 0x01, 0]),
            Ok(Command::SetLed {
                led: Led::Red,
                on: false
            })
        );
    }

    #[test]
    fn test_set_led_rejects_bad_args_length() {
        assert_eq!(Command::parse(&[id::SET_LED]), Err(CommandError::BadArgs));
        assert_eq!(
            Command::parse(&[id::SET_LED, 0x00]),
            Err(CommandError::BadArgs)
        );
        assert_eq!(
            Command::parse(&[id::SET_LED, 0x00, 1, 1]),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn test_set_led_rejects_bad_led() {
        assert_eq!(
            Command::parse(&[id::SET_LED, 0xFF, 1]),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn test_set_run_mode() {
        assert_eq!(
            Command::parse(&[id::SET_RUN_MODE, 0x00]),
            Ok(Command::SetRunMode(RunMode::Normal))
        );
        assert_eq!(
            Command::parse(&[id::SET_RUN_MODE, 0x01]),
            Ok(Command::SetRunMode(RunMode::Test))
        );
    }

    #[test]
    fn test_set_run_mode_rejects_bad_args_length() {
        assert_eq!(
            Command::parse(&[id::SET_RUN_MODE]),
            Err(CommandError::BadArgs)
        );
        assert_eq!(
            Command::parse(&[id::SET_RUN_MODE, 0x01, 1]),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn test_set_run_mode_rejects_bad_mode() {
        assert_eq!(
            Command::parse(&[id::SET_RUN_MODE, 0xFF]),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn test_dump_and_reset_commands_reject_args() {
        for cmd in [
            id::EMULATED_UPD_DUMP_STATE,
            id::EMULATED_UPD_RESET,
            id::RADIO_STATE_DUMP,
            id::RADIO_STATE_RESET,
            id::FACEPLATE_UPD_DUMP_STATE,
            id::FACEPLATE_CLEAR_DISPLAY,
        ] {
            assert!(Command::parse(&[cmd]).is_ok());
            assert_eq!(Command::parse(&[cmd, 1]), Err(CommandError::BadArgs));
        }
    }

    #[test]
    fn test_emulated_upd_send_allows_empty_spi_data() {
        assert_eq!(
            Command::parse(&[id::EMULATED_UPD_SEND_COMMAND]),
            Ok(Command::EmulatedUpdSendCommand(&[]))
        );
    }

    #[test]
    fn test_emulated_upd_send_allows_max_spi_data_size_of_32() {
        let mut body = [0u8; 33];
        body[0] = id::EMULATED_UPD_SEND_COMMAND;
        assert!(Command::parse(&body).is_ok());
    }

    #[test]
    fn test_emulated_upd_send_rejects_spi_data_exceeding_32() {
        let mut body = [0u8; 34];
        body[0] = id::EMULATED_UPD_SEND_COMMAND;
        assert_eq!(Command::parse(&body), Err(CommandError::BadArgs));
    }

    #[test]
    fn test_faceplate_send_requires_at_least_one_byte() {
        assert_eq!(
            Command::parse(&[id::FACEPLATE_UPD_SEND_COMMAND]),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn test_faceplate_send_allows_max_spi_data_size_of_32() {
        let mut body = [0u8; 33];
        body[0] = id::FACEPLATE_UPD_SEND_COMMAND;
        body[1] = 0x80;
        assert!(Command::parse(&body).is_ok());
    }

    #[test]
    fn test_faceplate_send_rejects_spi_data_exceeding_32() {
        let mut body = [0u8; 34];
        body[0] = id::FACEPLATE_UPD_SEND_COMMAND;
        assert_eq!(Command::parse(&body), Err(CommandError::BadArgs));
    }

    #[test]
    fn test_radio_load_key_data_requires_four_bytes() {
        assert_eq!(
            Command::parse(&[id::RADIO_LOAD_KEY_DATA, 1, 2, 3, 4]),
            Ok(Command::RadioLoadKeyData(&[1, 2, 3, 4]))
        );
        assert_eq!(
            Command::parse(&[id::RADIO_LOAD_KEY_DATA, 1, 2, 3]),
            Err(CommandError::BadArgs)
        );
        assert_eq!(
            Command::parse(&[id::RADIO_LOAD_KEY_DATA, 1, 2, 3, 4, 5]),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn test_radio_state_process_requires_display_length() {
        let body = [id::RADIO_STATE_PROCESS, b'F', b'M', b'1', b' ', b' ', b'8', b'8', b'7', b'M', b'H', b'z'];
        match Command::parse(&body) {
            Ok(Command::RadioStateProcess(text)) => assert_eq!(&text[..], b"FM1  887MHz"),
            other => panic!("unexpected parse result: {:?}", other),
        }
        assert_eq!(
            Command::parse(&[id::RADIO_STATE_PROCESS, b'A']),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn test_run_mode_roundtrip() {
        for mode in [RunMode::Normal, RunMode::Test] {
            assert_eq!(RunMode::from_byte(mode.to_byte()), Some(mode));
        }
        assert!(RunMode::from_byte(0xFF).is_none());
    }

    #[test]
    fn test_led_roundtrip() {
        for led in [Led::Green, Led::Red] {
            assert_eq!(Led::from_byte(led.to_byte()), Some(led));
        }
        assert!(Led::from_byte(0x02).is_none());
    }
}
