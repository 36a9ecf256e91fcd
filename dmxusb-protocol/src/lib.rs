//! DMX USB Pro widget protocol
//!
//! This crate implements the USB framing used between a lighting controller
//! (the host) and a DMX USB Pro compatible widget. The host streams DMX512
//! universes and administrative queries; the widget answers the queries and
//! hands channel updates to its DMX output.
//!
//! # Protocol Overview
//!
//! Every packet, in both directions, uses the same frame:
//! ```text
//! ┌───────┬───────┬────────┬────────┬─────────────┬─────┐
//! │ START │ LABEL │ LEN LO │ LEN HI │ PAYLOAD     │ END │
//! │ 0x7E  │ 1B    │ 1B     │ 1B     │ 0–65535B    │ 0xE7│
//! └───────┴───────┴────────┴────────┴─────────────┴─────┘
//! ```
//!
//! Bytes arrive in arbitrary chunks (typically 64-byte USB transfers), so the
//! decoder is a resumable byte-at-a-time state machine. There is no checksum;
//! a corrupted packet is dropped and the decoder resynchronizes on the next
//! start marker.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod identity;
pub mod labels;
pub mod params;
pub mod policy;
pub mod response;

pub use frame::{
    DecoderPhase, DiscardReason, FrameDecoder, Packet, Step, DMX_UNIVERSE_SIZE, END_MARKER,
    MAX_ADMIN_PAYLOAD, START_MARKER,
};
pub use identity::{FirmwareVersion, WidgetIdentity, MAX_NAME_LEN};
pub use labels::Label;
pub use params::WidgetParams;
pub use policy::{DecodePolicy, Malformed};
pub use response::{Response, ResponseError};
