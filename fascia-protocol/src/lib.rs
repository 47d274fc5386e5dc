//! Host Serial Command Protocol
//!
//! This crate defines the serial protocol between a host PC and the fascia
//! tool. The host drives everything: it pokes the uPD16432B emulator, reads
//! back decoded radio state, and pushes commands at the physical faceplate.
//!
//! # Protocol Overview
//!
//! Commands use a length-prefixed binary frame:
//! ```text
//! ┌────────┬─────────┬───────────┐
//! │ LENGTH │ COMMAND │ ARGS      │
//! │ 1B     │ 1B      │ 0–254B    │
//! └────────┴─────────┴───────────┘
//! ```
//!
//! Every command is answered with a framed reply whose first byte is ACK or
//! NAK, optionally followed by reply data:
//! ```text
//! ┌────────┬─────────┬───────────┐
//! │ LENGTH │ ACK/NAK │ DATA      │
//! │ 1B     │ 1B      │ 0–254B    │
//! └────────┴─────────┴───────────┘
//! ```
//!
//! A command frame that stalls mid-transfer is discarded after 2.25 seconds
//! of bus silence; the timer restarts on every received byte.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod reader;
pub mod response;

pub use command::{Command, CommandError, Led, RunMode};
pub use reader::{CommandReader, MAX_COMMAND_LEN};
pub use response::{ack, ack_with, nak, Reply, ReplyError, ACK, NAK};

/// Maximum args in one command frame (LENGTH covers COMMAND + ARGS)
pub const MAX_ARGS: usize = 254;

/// Maximum bytes in one uPD16432B SPI transaction (command byte + data)
pub const MAX_SPI_DATA: usize = 32;

/// Serialized uPD16432B emulator state size in bytes
pub const UPD_STATE_DUMP_LEN: usize = 152;

/// Serialized radio state size in bytes
pub const RADIO_STATE_DUMP_LEN: usize = 30;

/// Visible characters on the faceplate display
pub const DISPLAY_TEXT_LEN: usize = 11;

/// Key scan latch size in bytes
pub const KEY_DATA_LEN: usize = 4;

/// Silence period after which a partial command frame is discarded
pub const INTER_BYTE_TIMEOUT_MS: u64 = 2250;
