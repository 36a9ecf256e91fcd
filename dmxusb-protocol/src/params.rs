//! DMX output timing parameters
//!
//! Reported by the get-widget-params reply and changed by the host with a
//! set-widget-params request. Times are in the API's native 10.67 us units.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Valid break time range (10.67 us units)
pub const BREAK_TIME_RANGE: core::ops::RangeInclusive<u8> = 9..=127;

/// Valid mark-after-break range (10.67 us units)
pub const MAB_TIME_RANGE: core::ops::RangeInclusive<u8> = 1..=127;

/// Highest selectable output rate in packets per second
pub const MAX_OUTPUT_RATE: u8 = 40;

/// Offset of the timing fields inside a set-params payload
///
/// The payload starts with a two-byte user configuration size.
const SET_PARAMS_TIMING_OFFSET: usize = 2;

/// Length of the timing section of a set-params payload
pub const SET_PARAMS_MIN_LEN: usize = SET_PARAMS_TIMING_OFFSET + 3;

/// DMX output timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WidgetParams {
    /// Break time in 10.67 us units
    pub break_time: u8,
    /// Mark-after-break time in 10.67 us units
    pub mab_time: u8,
    /// Output rate in packets per second (0 = as fast as possible)
    pub output_rate: u8,
}

impl Default for WidgetParams {
    fn default() -> Self {
        Self {
            break_time: 9,
            mab_time: 1,
            output_rate: 40,
        }
    }
}

impl WidgetParams {
    /// Parse the timing section of a set-params payload
    ///
    /// Returns `None` if the payload is too short or any value is outside
    /// the range the API allows.
    pub fn from_set_request(payload: &[u8]) -> Option<Self> {
        let timing = payload.get(SET_PARAMS_TIMING_OFFSET..SET_PARAMS_MIN_LEN)?;
        let params = Self {
            break_time: timing[0],
            mab_time: timing[1],
            output_rate: timing[2],
        };
        params.is_valid().then_some(params)
    }

    pub fn is_valid(&self) -> bool {
        BREAK_TIME_RANGE.contains(&self.break_time)
            && MAB_TIME_RANGE.contains(&self.mab_time)
            && self.output_rate <= MAX_OUTPUT_RATE
    }

    /// Break duration in microseconds
    pub fn break_us(&self) -> u32 {
        ticks_to_us(self.break_time)
    }

    /// Mark-after-break duration in microseconds
    pub fn mab_us(&self) -> u32 {
        ticks_to_us(self.mab_time)
    }

    /// Interval between frame starts, or `None` for free-running output
    pub fn frame_period_us(&self) -> Option<u32> {
        match self.output_rate {
            0 => None,
            rate => Some(1_000_000 / rate as u32),
        }
    }
}

/// Convert 10.67 us API units to whole microseconds, rounding up
fn ticks_to_us(ticks: u8) -> u32 {
    (ticks as u32 * 1067).div_ceil(100)
}
