//! Host serial command task
//!
//! Reads length-prefixed command frames from the host UART, dispatches
//! them, and writes framed ACK/NAK replies. A frame that stalls for 2.25
//! seconds is discarded; the timer restarts on every received byte.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};

use fascia_protocol::{
    response, Command, CommandReader, Led, Reply, RunMode, INTER_BYTE_TIMEOUT_MS,
};

use crate::channels::{
    FaceplateReply, FaceplateRequest, FACEPLATE_REPLY, FACEPLATE_REQ, RADIO, RUN_MODE, UPD,
};

/// Serial command task - host protocol endpoint
#[embassy_executor::task]
pub async fn serial_task(
    mut rx: BufferedUartRx<'static, UART0>,
    mut tx: BufferedUartTx<'static, UART0>,
    mut green: Output<'static>,
    mut red: Output<'static>,
) {
    info!("serial task started");

    let mut reader = CommandReader::new();
    let mut buf = [0u8; 64];

    loop {
        let read = if reader.receiving() {
            match with_timeout(
                Duration::from_millis(INTER_BYTE_TIMEOUT_MS),
                rx.read(&mut buf),
            )
            .await
            {
                Ok(read) => read,
                Err(_) => {
                    warn!("command frame timed out, discarding");
                    reader.reset();
                    continue;
                }
            }
        } else {
            rx.read(&mut buf).await
        };

        let count = match read {
            Ok(0) => continue,
            Ok(count) => count,
            Err(e) => {
                warn!("uart read error: {:?}", e);
                reader.reset();
                continue;
            }
        };

        for &byte in &buf[..count] {
            let Some(body) = reader.feed(byte) else {
                continue;
            };
            let reply = dispatch(&body, &mut green, &mut red).await;
            if let Err(e) = tx.write_all(&reply).await {
                warn!("uart write error: {:?}", e);
            }
        }
    }
}

/// Execute one command body and build its reply
async fn dispatch(body: &[u8], green: &mut Output<'static>, red: &mut Output<'static>) -> Reply {
    let command = match Command::parse(body) {
        Ok(command) => command,
        Err(e) => {
            warn!("rejected command: {:?}", e);
            return response::nak();
        }
    };

    match command {
        Command::Echo(data) => response::ack_with(data).unwrap_or_else(|_| response::nak()),
        Command::SetLed { led, on } => {
            let pin = match led {
                Led::Green => green,
                Led::Red => red,
            };
            if on {
                pin.set_high();
            } else {
                pin.set_low();
            }
            response::ack()
        }
        Command::SetRunMode(mode) => {
            RUN_MODE.store(mode.to_byte(), Ordering::Relaxed);
            info!("run mode set to {:?}", mode);
            // Green LED doubles as the run-mode indicator
            if mode == RunMode::Normal {
                green.set_high();
            } else {
                green.set_low();
            }
            response::ack()
        }
        Command::EmulatedUpdDumpState => {
            let upd = UPD.lock().await;
            response::ack_with(&upd.dump()).unwrap_or_else(|_| response::nak())
        }
        Command::EmulatedUpdSendCommand(bytes) => {
            UPD.lock().await.process_command(bytes);
            response::ack()
        }
        Command::EmulatedUpdReset => {
            UPD.lock().await.reset();
            response::ack()
        }
        Command::RadioLoadKeyData(key_data) => {
            UPD.lock().await.load_key_data(*key_data);
            response::ack()
        }
        Command::RadioStateProcess(text) => {
            RADIO.lock().await.process(text);
            response::ack()
        }
        Command::RadioStateDump => {
            let radio = RADIO.lock().await;
            response::ack_with(&radio.dump()).unwrap_or_else(|_| response::nak())
        }
        Command::RadioStateReset => {
            RADIO.lock().await.reset();
            response::ack()
        }
        Command::FaceplateUpdDumpState => faceplate_request(FaceplateRequest::DumpState).await,
        Command::FaceplateUpdSendCommand(bytes) => {
            let mut transaction = heapless::Vec::new();
            // Length already validated by the parser
            let _ = transaction.extend_from_slice(bytes);
            faceplate_request(FaceplateRequest::SendCommand(transaction)).await
        }
        Command::FaceplateClearDisplay => faceplate_request(FaceplateRequest::Clear).await,
    }
}

/// Hand a request to the faceplate task and wait for its outcome
async fn faceplate_request(request: FaceplateRequest) -> Reply {
    FACEPLATE_REPLY.reset();
    FACEPLATE_REQ.send(request).await;
    match FACEPLATE_REPLY.wait().await {
        FaceplateReply::Done => response::ack(),
        FaceplateReply::State(dump) => {
            response::ack_with(&dump).unwrap_or_else(|_| response::nak())
        }
        FaceplateReply::Failed => response::nak(),
    }
}
