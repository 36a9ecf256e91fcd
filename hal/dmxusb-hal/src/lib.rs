//! dmxusb Hardware Abstraction Layer
//!
//! This crate defines the transport boundary between the widget protocol
//! core and whatever carries bytes to and from the host. The core never
//! touches a peripheral directly; it is handed something implementing
//! [`UsbTransport`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  dmxusb-core (widget engine)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dmxusb-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ firmware UART │       │ in-memory     │
//! │ (USB bridge)  │       │ test double   │
//! └───────────────┘       └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod transport;

pub use transport::{DataBits, LinkConfig, Parity, StopBits, UsbTransport, USB_PACKET_SIZE};
