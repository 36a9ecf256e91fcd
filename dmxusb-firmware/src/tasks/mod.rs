//! Embassy async tasks
//!
//! Tasks share the widget through [`crate::channels::WIDGET`].

pub mod dmx_output;
pub mod host_link;

pub use dmx_output::{dmx_output_task, DmxPort};
pub use host_link::host_link_task;
