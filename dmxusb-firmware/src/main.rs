//! dmxusb - DMX USB Pro compatible widget firmware
//!
//! A USB-serial bridge on UART0 carries the host protocol; UART1 drives an
//! RS-485 transceiver for the DMX512 line.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{
    BufferedInterruptHandler, InterruptHandler as UartInterruptHandler, Uart, UartTx,
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dmxusb_core::{Widget, WidgetConfig};
use dmxusb_hal::LinkConfig;
use dmxusb_protocol::{DecodePolicy, FirmwareVersion, WidgetIdentity};

use crate::channels::WIDGET;
use crate::link::{uart_config, HostLink};

mod channels;
mod link;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => UartInterruptHandler<UART1>;
});

/// Serial number reported to the host
const SERIAL_NUMBER: u32 = 0x0001_0001;

/// ESTA manufacturer ID (0x7FF0..0x7FFF is reserved for prototyping)
const MANUFACTURER_ID: u16 = 0x7FF0;
const MANUFACTURER_NAME: &str = "dmxusb";

const DEVICE_ID: u16 = 0x0001;
const DEVICE_NAME: &str = "DMX USB Pro compatible";

const FIRMWARE: FirmwareVersion = FirmwareVersion::new(1, 0);

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dmxusb firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Host link: USB-serial bridge on GPIO0 (TX) / GPIO1 (RX)
    let host_line = LinkConfig::default();
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 1024]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(&host_line));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("Host link at {} baud", host_line.baudrate);

    // DMX line: transmit-only on GPIO4, transceiver DE on GPIO2
    let dmx_line = LinkConfig::dmx512();
    let dmx_tx = UartTx::new(p.UART1, p.PIN_4, p.DMA_CH0, uart_config(&dmx_line));
    let driver_enable = Output::new(p.PIN_2, Level::Low);

    let identity = WidgetIdentity::new(SERIAL_NUMBER)
        .with_manufacturer(MANUFACTURER_ID, MANUFACTURER_NAME)
        .with_device(DEVICE_ID, DEVICE_NAME)
        .with_firmware(FIRMWARE);

    let mut widget = Widget::new(HostLink::new(rx, tx), widget_config());
    widget.set_identity(identity);
    match widget.init() {
        Ok(_) => info!("Widget ready, serial {:08x}", SERIAL_NUMBER),
        Err(e) => error!("Widget init failed: {:?}", e),
    }
    *WIDGET.lock().await = Some(widget);

    spawner.spawn(tasks::host_link_task()).unwrap();
    spawner
        .spawn(tasks::dmx_output_task(tasks::DmxPort {
            tx: dmx_tx,
            driver_enable,
            line: dmx_line,
        }))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Build-time widget configuration
fn widget_config() -> WidgetConfig {
    let policy = if cfg!(feature = "strict-decode") {
        DecodePolicy::strict()
    } else {
        DecodePolicy::default()
    };
    let config = WidgetConfig {
        policy,
        ..Default::default()
    };
    if let Err(e) = config.validate() {
        warn!("Invalid widget config ({:?}), using defaults", e);
        return WidgetConfig::default();
    }
    config
}
