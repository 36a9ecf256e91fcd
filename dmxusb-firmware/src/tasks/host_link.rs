//! Host link task
//!
//! Drains the host UART into the widget engine on a fixed tick.

use defmt::*;
use embassy_time::{Duration, Ticker};

use dmxusb_core::{Fault, IngestReport};

use crate::channels::{count_ingest, WIDGET};

/// Poll interval in microseconds
///
/// At 115200 baud about 12 bytes arrive per millisecond, well inside the
/// UART ring buffer.
pub const POLL_INTERVAL_US: u64 = 500;

/// Upper bound on transfer units drained per tick
const MAX_POLLS_PER_TICK: usize = 8;

#[embassy_executor::task]
pub async fn host_link_task() {
    info!("Host link task started");

    let mut ticker = Ticker::every(Duration::from_micros(POLL_INTERVAL_US));

    loop {
        ticker.next().await;

        let mut tick = IngestReport::default();
        {
            let mut guard = WIDGET.lock().await;
            let Some(widget) = guard.as_mut() else {
                continue;
            };

            for _ in 0..MAX_POLLS_PER_TICK {
                match widget.poll() {
                    Ok(report) if report.bytes == 0 => break,
                    Ok(report) => tick.merge(report),
                    Err(e) => {
                        warn!("Host link poll failed: {:?}", e);
                        break;
                    }
                }
            }
        }

        if tick.bytes == 0 {
            continue;
        }

        trace!("Host: {} bytes, {} packets", tick.bytes, tick.packets);
        count_ingest(&tick);
        if tick.responses > 0 {
            debug!("Answered {} host queries", tick.responses);
        }
        if let Some(fault) = tick.fault {
            log_fault(fault);
        }
    }
}

fn log_fault(fault: Fault) {
    match fault {
        Fault::PacketDiscarded { label, reason } => {
            debug!("Dropped packet with label {}: {:?}", label, reason);
        }
        Fault::TransportWrite { label } => {
            warn!("Failed to send reply for label {}", label);
        }
        other => debug!("Host input fault: {:?}", other),
    }
}
