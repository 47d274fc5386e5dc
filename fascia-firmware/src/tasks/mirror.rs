//! Emulator-to-faceplate mirror task
//!
//! In NORMAL run mode this task keeps the physical faceplate in sync with
//! the emulated uPD16432B and feeds every display change to the radio
//! decoder. In TEST mode it idles so the host owns all state.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_time::{Duration, Ticker};

use fascia_protocol::RunMode;

use crate::channels::{FaceplateRequest, FACEPLATE_REQ, RADIO, RUN_MODE, UPD};

/// How often the emulator is checked for changes
const MIRROR_INTERVAL_MS: u64 = 50;

/// Mirror task - emulator state out to hardware and decoder
#[embassy_executor::task]
pub async fn mirror_task() {
    info!("mirror task started");

    let mut ticker = Ticker::every(Duration::from_millis(MIRROR_INTERVAL_MS));

    loop {
        ticker.next().await;

        if RUN_MODE.load(Ordering::Relaxed) != RunMode::Normal.to_byte() {
            continue;
        }

        // Snapshot and mark synced inside one lock, then work on the copy
        let snapshot = {
            let mut upd = UPD.lock().await;
            if upd.any_dirty() {
                let display_changed = upd.display_data_dirty();
                upd.clear_dirty();
                Some((upd.clone(), display_changed))
            } else {
                None
            }
        };

        let Some((state, display_changed)) = snapshot else {
            continue;
        };

        if display_changed {
            let text = state.display_text();
            RADIO.lock().await.process(&text);
        }

        FACEPLATE_REQ.send(FaceplateRequest::UpdateFrom(state)).await;
    }
}
