//! Reply framing.
//!
//! Every command is answered with `LENGTH | ACK/NAK | DATA...` where LENGTH
//! counts the ACK/NAK byte plus the data.

use heapless::Vec;

use crate::MAX_ARGS;

/// Command accepted
pub const ACK: u8 = 0x06;

/// Command rejected
pub const NAK: u8 = 0x15;

/// Maximum complete reply frame (LENGTH + ACK/NAK + data)
pub const MAX_REPLY_LEN: usize = 2 + MAX_ARGS;

/// A complete reply frame, ready to transmit
pub type Reply = Vec<u8, MAX_REPLY_LEN>;

/// Errors that can occur building a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// Reply data exceeds what one frame can carry
    DataTooLong,
}

/// Build a bare ACK reply
pub fn ack() -> Reply {
    let mut reply = Vec::new();
    let _ = reply.push(1);
    let _ = reply.push(ACK);
    reply
}

/// Build a bare NAK reply
pub fn nak() -> Reply {
    let mut reply = Vec::new();
    let _ = reply.push(1);
    let _ = reply.push(NAK);
    reply
}

/// Build an ACK reply carrying data
pub fn ack_with(data: &[u8]) -> Result<Reply, ReplyError> {
    if data.len() > MAX_ARGS {
        return Err(ReplyError::DataTooLong);
    }

    let mut reply = Vec::new();
    let _ = reply.push((1 + data.len()) as u8);
    let _ = reply.push(ACK);
    reply
        .extend_from_slice(data)
        .map_err(|_| ReplyError::DataTooLong)?;
    Ok(reply)
}
