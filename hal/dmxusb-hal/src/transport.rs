//! Host transport abstractions
//!
//! The widget talks to the host over a byte pipe: a USB CDC endpoint, an
//! FTDI-style USB-serial bridge on a UART, or an in-memory buffer in tests.

/// Size of one full-speed USB bulk transfer unit
pub const USB_PACKET_SIZE: usize = 64;

/// Byte transport to the host controller
///
/// Reads are non-blocking: the widget engine is driven by a polling loop and
/// must never stall waiting for input.
pub trait UsbTransport {
    /// Error type for transport operations
    type Error;

    /// Bring the transport up
    ///
    /// Called once when the widget is initialized.
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Shut the transport down
    fn deinit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Read whatever is pending into `buf`
    ///
    /// Returns the number of bytes copied. Zero means nothing is pending,
    /// not end-of-stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data` to the host
    ///
    /// Either the whole slice is accepted or an error is returned; the
    /// caller does not retry.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Serial line configuration
///
/// Used both for the host link (when the USB side is a bridge chip) and
/// for the DMX512 output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl LinkConfig {
    /// DMX512 line settings: 250 kbaud, 8 data bits, no parity, 2 stop bits
    pub const fn dmx512() -> Self {
        Self {
            baudrate: 250_000,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::Two,
        }
    }

    /// Duration of one character on the wire in microseconds, rounded up
    ///
    /// Start bit + data bits + parity + stop bits.
    pub fn char_time_us(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        let bits: u32 = 1 + data + parity + stop;
        (bits * 1_000_000).div_ceil(self.baudrate.max(1))
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
