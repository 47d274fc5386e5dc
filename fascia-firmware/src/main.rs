//! Fascia - VW head-unit faceplate bench tool
//!
//! Firmware binary for RP2040 boards. Speaks the host serial protocol on
//! UART0, drives the faceplate's uPD16432B over SPI0, and mirrors the
//! emulated display state onto hardware in NORMAL run mode.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("fascia firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("peripherals initialized");

    // Host link on UART0 (GP0 TX, GP1 RX), 115200 baud default
    let uart_config = UartConfig::default();
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("host uart initialized");

    // Faceplate on SPI0 (GP18 SCK, GP19 MOSI, GP16 MISO) with the
    // controller strobe on GP17. The uPD16432B clocks slowly.
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 250_000;
    let spi = Spi::new(
        p.SPI0,
        p.PIN_18,
        p.PIN_19,
        p.PIN_16,
        p.DMA_CH0,
        p.DMA_CH1,
        spi_config,
    );
    let stb = Output::new(p.PIN_17, Level::Low);
    info!("faceplate spi initialized");

    // Status LEDs; green starts high because the default run mode is NORMAL
    let green = Output::new(p.PIN_14, Level::High);
    let red = Output::new(p.PIN_15, Level::Low);

    spawner.spawn(tasks::serial_task(rx, tx, green, red)).unwrap();
    spawner.spawn(tasks::faceplate_task(spi, stb)).unwrap();
    spawner.spawn(tasks::mirror_task()).unwrap();

    info!("all tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("main loop heartbeat");
    }
}
