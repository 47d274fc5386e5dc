//! Incremental command frame reader.
//!
//! Frame format:
//! - LENGTH (1 byte): number of bytes that follow (command id + args)
//! - BODY (LENGTH bytes): command id followed by its arguments
//!
//! The reader is sans-io: feed it bytes as they arrive and it hands back
//! complete frames. Timeout handling belongs to the caller - on bus silence
//! mid-frame, call [`CommandReader::reset`] to discard the partial frame.

use heapless::Vec;

/// Maximum complete command size (command id + args)
pub const MAX_COMMAND_LEN: usize = 255;

/// State machine for reading incoming command frames
#[derive(Debug, Clone)]
pub struct CommandReader {
    state: ReadState,
    buf: Vec<u8, MAX_COMMAND_LEN>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Waiting for a LENGTH byte
    Idle,
    /// Collecting body bytes
    Reading { remaining: u8 },
}

impl Default for CommandReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandReader {
    /// Create a new command reader
    pub const fn new() -> Self {
        Self {
            state: ReadState::Idle,
            buf: Vec::new(),
        }
    }

    /// Discard any partially received frame
    pub fn reset(&mut self) {
        self.state = ReadState::Idle;
        self.buf.clear();
    }

    /// True while a frame is partially received
    ///
    /// The caller arms the inter-byte timeout only in this state.
    pub fn receiving(&self) -> bool {
        self.state != ReadState::Idle
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Some(body)` when a frame completes. A zero LENGTH byte
    /// completes immediately with an empty body; the dispatcher rejects it.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8, MAX_COMMAND_LEN>> {
        match self.state {
            ReadState::Idle => {
                if byte == 0 {
                    return Some(Vec::new());
                }
                self.buf.clear();
                self.state = ReadState::Reading { remaining: byte };
                None
            }
            ReadState::Reading { remaining } => {
                // Cannot overflow: remaining <= 255 == capacity
                let _ = self.buf.push(byte);
                if remaining == 1 {
                    self.state = ReadState::Idle;
                    Some(core::mem::take(&mut self.buf))
                } else {
                    self.state = ReadState::Reading {
                        remaining: remaining - 1,
                    };
                    None
                }
            }
        }
    }
}
