//! Response packets sent from the widget to the host

use heapless::Vec;

use crate::frame::{END_MARKER, START_MARKER};
use crate::identity::{WidgetIdentity, MAX_NAME_LEN};
use crate::labels::{Label, GET_DEVICE_NAME, GET_MANUFACTURER, GET_SERIAL_NUMBER, GET_WIDGET_PARAMS};
use crate::params::WidgetParams;

/// Largest reply payload: a 2-byte ID followed by a full-length name
pub const MAX_RESPONSE_PAYLOAD: usize = 2 + MAX_NAME_LEN;

/// Header length: START + LABEL + LENGTH
pub const HEADER_LEN: usize = 4;

/// Largest complete reply frame
pub const MAX_RESPONSE_FRAME: usize = HEADER_LEN + MAX_RESPONSE_PAYLOAD + 1;

/// Errors from encoding or parsing a response frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Bytes do not form a response frame
    InvalidFrame,
}

/// A reply to an administrative query
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    label: u8,
    payload: Vec<u8, MAX_RESPONSE_PAYLOAD>,
}

impl Response {
    /// Build the reply for a query label, if the label is a query
    pub fn for_query(label: u8, identity: &WidgetIdentity, params: &WidgetParams) -> Option<Self> {
        match Label::from_u8(label)? {
            Label::GetSerialNumber => Some(Self::serial_number(identity)),
            Label::GetWidgetParams => Some(Self::widget_params(identity, params)),
            Label::GetManufacturer => Some(Self::manufacturer(identity)),
            Label::GetDeviceName => Some(Self::device_name(identity)),
            _ => None,
        }
    }

    /// Serial number, 4 bytes little-endian
    pub fn serial_number(identity: &WidgetIdentity) -> Self {
        Self::from_parts(GET_SERIAL_NUMBER, &[&identity.serial_number().to_le_bytes()])
    }

    /// Firmware version followed by the DMX output timing
    pub fn widget_params(identity: &WidgetIdentity, params: &WidgetParams) -> Self {
        let [fw_lo, fw_hi] = identity.firmware().packed().to_le_bytes();
        Self::from_parts(
            GET_WIDGET_PARAMS,
            &[&[
                fw_lo,
                fw_hi,
                params.break_time,
                params.mab_time,
                params.output_rate,
            ]],
        )
    }

    /// ESTA manufacturer ID followed by the manufacturer name
    pub fn manufacturer(identity: &WidgetIdentity) -> Self {
        Self::from_parts(
            GET_MANUFACTURER,
            &[
                &identity.manufacturer_id().to_le_bytes(),
                identity.manufacturer_name().as_bytes(),
            ],
        )
    }

    /// Device ID followed by the device name
    pub fn device_name(identity: &WidgetIdentity) -> Self {
        Self::from_parts(
            GET_DEVICE_NAME,
            &[
                &identity.device_id().to_le_bytes(),
                identity.device_name().as_bytes(),
            ],
        )
    }

    fn from_parts(label: u8, parts: &[&[u8]]) -> Self {
        let mut payload = Vec::new();
        for part in parts {
            // Every reply fits MAX_RESPONSE_PAYLOAD: names are bounded by
            // the identity type
            let _ = payload.extend_from_slice(part);
        }
        Self { label, payload }
    }

    pub fn label(&self) -> u8 {
        self.label
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// `[START, label, len lo, len hi]`
    pub fn header(&self) -> [u8; HEADER_LEN] {
        let [lo, hi] = (self.payload.len() as u16).to_le_bytes();
        [START_MARKER, self.label, lo, hi]
    }

    pub fn footer(&self) -> [u8; 1] {
        [END_MARKER]
    }

    /// Total size of the encoded frame
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len() + 1
    }

    /// Encode the whole frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ResponseError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(ResponseError::BufferTooSmall);
        }

        let end = HEADER_LEN + self.payload.len();
        buffer[..HEADER_LEN].copy_from_slice(&self.header());
        buffer[HEADER_LEN..end].copy_from_slice(&self.payload);
        buffer[end] = END_MARKER;

        Ok(frame_len)
    }

    /// Parse a complete response frame, as a host would
    pub fn decode(frame: &[u8]) -> Result<Self, ResponseError> {
        let (header, rest) = frame
            .split_first_chunk::<HEADER_LEN>()
            .ok_or(ResponseError::InvalidFrame)?;
        let [start, label, lo, hi] = *header;
        if start != START_MARKER {
            return Err(ResponseError::InvalidFrame);
        }

        let length = u16::from_le_bytes([lo, hi]) as usize;
        if rest.len() != length + 1 || rest[length] != END_MARKER {
            return Err(ResponseError::InvalidFrame);
        }

        let mut payload = Vec::new();
        payload
            .extend_from_slice(&rest[..length])
            .map_err(|_| ResponseError::InvalidFrame)?;

        Ok(Self { label, payload })
    }

    /// Serial number carried by a get-serial-number reply
    pub fn as_serial_number(&self) -> Option<u32> {
        if self.label != GET_SERIAL_NUMBER {
            return None;
        }
        let bytes: [u8; 4] = self.payload.as_slice().try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }
}
