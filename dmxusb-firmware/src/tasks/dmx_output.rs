//! DMX512 output task
//!
//! Refreshes the line from the active frame: break, mark-after-break, then
//! the start code and all 512 slots. Timing follows the widget params the
//! host last set.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{Async, UartTx};
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::Ordering;

use dmxusb_hal::LinkConfig;
use dmxusb_protocol::{WidgetParams, DMX_UNIVERSE_SIZE};

use crate::channels::{count_sent, FRAMES_RECEIVED, PACKETS_DISCARDED, WIDGET};

/// Log line statistics every this many frames
const STATS_INTERVAL: u32 = 1024;

/// Back-off while the widget is not up yet
const IDLE_RETRY_MS: u64 = 10;

/// RS-485 transmitter and its driver-enable pin
pub struct DmxPort {
    pub tx: UartTx<'static, UART1, Async>,
    pub driver_enable: Output<'static>,
    pub line: LinkConfig,
}

#[embassy_executor::task]
pub async fn dmx_output_task(mut port: DmxPort) {
    info!("DMX output task started at {} baud", port.line.baudrate);

    port.driver_enable.set_high();
    let char_us = port.line.char_time_us();

    loop {
        let started = Instant::now();

        let snapshot = {
            let guard = WIDGET.lock().await;
            guard
                .as_ref()
                .map(|widget| (*widget.active_frame(), widget.params()))
        };
        let Some((frame, params)) = snapshot else {
            Timer::after(Duration::from_millis(IDLE_RETRY_MS)).await;
            continue;
        };

        port.tx.send_break(break_bits(&params, &port.line)).await;
        Timer::after_micros(params.mab_us() as u64).await;

        if let Err(e) = port.tx.write(&frame).await {
            error!("DMX write failed: {:?}", e);
            continue;
        }

        let sent = count_sent();
        if sent % STATS_INTERVAL == 0 {
            debug!(
                "DMX: {} sent, {} received, {} discarded",
                sent,
                FRAMES_RECEIVED.load(Ordering::Relaxed),
                PACKETS_DISCARDED.load(Ordering::Relaxed)
            );
        }

        Timer::at(started + Duration::from_micros(frame_period_us(&params, char_us) as u64)).await;
    }
}

/// Break length expressed in bit times of the DMX line
fn break_bits(params: &WidgetParams, line: &LinkConfig) -> u32 {
    (params.break_us() as u64 * line.baudrate as u64).div_ceil(1_000_000) as u32
}

/// Time from one frame start to the next
///
/// A free-running line still cannot go faster than the frame takes to send.
fn frame_period_us(params: &WidgetParams, char_us: u32) -> u32 {
    let on_wire = params.break_us() + params.mab_us() + char_us * DMX_UNIVERSE_SIZE as u32;
    params.frame_period_us().map_or(on_wire, |period| period.max(on_wire))
}
