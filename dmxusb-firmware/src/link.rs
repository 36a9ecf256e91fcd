//! Host link over a USB-serial bridge
//!
//! The USB side is handled by a bridge chip wired to UART0; the widget
//! engine sees it as a plain byte transport.

use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx, Config as UartConfig};
use embedded_io::{Read, ReadReady, Write};

use dmxusb_hal::{DataBits, LinkConfig, Parity, StopBits, UsbTransport};

/// Buffered UART pair implementing [`UsbTransport`]
pub struct HostLink {
    rx: BufferedUartRx<'static, UART0>,
    tx: BufferedUartTx<'static, UART0>,
}

impl HostLink {
    pub fn new(rx: BufferedUartRx<'static, UART0>, tx: BufferedUartTx<'static, UART0>) -> Self {
        Self { rx, tx }
    }
}

impl UsbTransport for HostLink {
    type Error = uart::Error;

    fn deinit(&mut self) -> Result<(), uart::Error> {
        self.tx.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, uart::Error> {
        // Never block the poll loop on an empty ring buffer
        if !self.rx.read_ready()? {
            return Ok(0);
        }
        self.rx.read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), uart::Error> {
        self.tx.write_all(data)
    }
}

/// Translate a board-agnostic line config into embassy's UART config
pub fn uart_config(link: &LinkConfig) -> UartConfig {
    let mut cfg = UartConfig::default();
    cfg.baudrate = link.baudrate;
    cfg.data_bits = match link.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        // The PL011 tops out at 8 data bits
        DataBits::Eight | DataBits::Nine => uart::DataBits::DataBits8,
    };
    cfg.parity = match link.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match link.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}
