//! Inter-task communication channels
//!
//! Defines the static state and channels shared between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use core::sync::atomic::AtomicU8;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use heapless::Vec;

use fascia_core::radio::RadioState;
use fascia_core::upd::Upd;
use fascia_protocol::{RunMode, MAX_SPI_DATA, UPD_STATE_DUMP_LEN};

/// Channel capacity for faceplate requests
const FACEPLATE_CHANNEL_SIZE: usize = 4;

/// Work for the faceplate task
pub enum FaceplateRequest {
    /// Transmit one raw transaction (host-driven)
    SendCommand(Vec<u8, MAX_SPI_DATA>),
    /// Blank the display (host-driven)
    Clear,
    /// Report the state last transmitted to the hardware (host-driven)
    DumpState,
    /// Mirror an emulator snapshot onto the hardware (mirror task)
    UpdateFrom(Upd),
}

/// Outcome of a host-driven faceplate request
pub enum FaceplateReply {
    Done,
    State([u8; UPD_STATE_DUMP_LEN]),
    Failed,
}

/// The emulated uPD16432B the host (or a future radio capture path) feeds
pub static UPD: Mutex<CriticalSectionRawMutex, Upd> = Mutex::new(Upd::new());

/// Decoded radio state
pub static RADIO: Mutex<CriticalSectionRawMutex, RadioState> = Mutex::new(RadioState::new());

/// Current run mode as its wire byte (NORMAL mirrors automatically)
pub static RUN_MODE: AtomicU8 = AtomicU8::new(RunMode::Normal.to_byte());

/// Requests for the faceplate task
pub static FACEPLATE_REQ: Channel<
    CriticalSectionRawMutex,
    FaceplateRequest,
    FACEPLATE_CHANNEL_SIZE,
> = Channel::new();

/// Replies for host-driven faceplate requests
///
/// Mirror updates never signal here, so the serial task only ever sees
/// replies to its own requests.
pub static FACEPLATE_REPLY: Signal<CriticalSectionRawMutex, FaceplateReply> = Signal::new();
