//! Board-agnostic widget engine for DMX USB Pro compatible interfaces
//!
//! This crate contains everything between the host transport and the DMX
//! output that does not depend on specific hardware:
//!
//! - Double-buffered DMX universe with atomic publish
//! - Widget engine: lifecycle, ingest loop, packet dispatch, responses
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod store;
pub mod widget;

pub use config::{ConfigError, WidgetConfig};
pub use store::{ChannelStore, StoreError, Universe};
pub use widget::{Fault, IngestReport, Widget, WidgetError};
