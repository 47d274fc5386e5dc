//! Faceplate driver task
//!
//! Owns the faceplate SPI bus and serves requests from the serial task
//! (raw transactions, clears, state dumps) and the mirror task (emulator
//! snapshots).

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};

use fascia_drivers::Faceplate;

use crate::channels::{FaceplateReply, FaceplateRequest, FACEPLATE_REPLY, FACEPLATE_REQ};

/// Faceplate task - sole owner of the faceplate SPI bus
#[embassy_executor::task]
pub async fn faceplate_task(spi: Spi<'static, SPI0, Async>, stb: Output<'static>) {
    info!("faceplate task started");

    let mut faceplate = Faceplate::new(spi, stb);
    if faceplate.init().await.is_err() {
        // Keep serving requests; an unplugged faceplate answers with NAKs
        warn!("faceplate init failed");
    }

    loop {
        match FACEPLATE_REQ.receive().await {
            FaceplateRequest::SendCommand(bytes) => {
                let outcome = faceplate.send_command(&bytes).await;
                signal_outcome(outcome.is_ok());
            }
            FaceplateRequest::Clear => {
                let outcome = faceplate.clear_display().await;
                signal_outcome(outcome.is_ok());
            }
            FaceplateRequest::DumpState => {
                FACEPLATE_REPLY.signal(FaceplateReply::State(faceplate.shadow().dump()));
            }
            FaceplateRequest::UpdateFrom(state) => {
                // Mirror updates are fire-and-forget; nothing waits on them
                match faceplate.update_from(&state).await {
                    Ok(sent) if sent.any() => {
                        trace!(
                            "faceplate updated: display={} pictograph={} chargen={}",
                            sent.display_data,
                            sent.pictograph,
                            sent.chargen
                        );
                    }
                    Ok(_) => {}
                    Err(_) => warn!("faceplate update failed"),
                }
            }
        }
    }
}

fn signal_outcome(ok: bool) {
    if ok {
        FACEPLATE_REPLY.signal(FaceplateReply::Done);
    } else {
        FACEPLATE_REPLY.signal(FaceplateReply::Failed);
    }
}
