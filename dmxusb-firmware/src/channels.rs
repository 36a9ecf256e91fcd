//! State shared between Embassy tasks

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use portable_atomic::{AtomicU32, Ordering};

use dmxusb_core::{IngestReport, Widget};

use crate::link::HostLink;

/// The widget engine, driven by the host link task and read by DMX output
///
/// `None` until `main` has brought the host link up.
pub static WIDGET: Mutex<CriticalSectionRawMutex, Option<Widget<HostLink>>> = Mutex::new(None);

/// Frames published by the host since boot
pub static FRAMES_RECEIVED: AtomicU32 = AtomicU32::new(0);

/// Packets dropped by the decoder since boot
pub static PACKETS_DISCARDED: AtomicU32 = AtomicU32::new(0);

/// Frames put on the DMX line since boot
pub static FRAMES_SENT: AtomicU32 = AtomicU32::new(0);

/// Fold a host-side report into the counters
pub fn count_ingest(report: &IngestReport) {
    FRAMES_RECEIVED.fetch_add(report.published as u32, Ordering::Relaxed);
    PACKETS_DISCARDED.fetch_add(report.discarded as u32, Ordering::Relaxed);
}

/// Returns the new total
pub fn count_sent() -> u32 {
    FRAMES_SENT.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}
