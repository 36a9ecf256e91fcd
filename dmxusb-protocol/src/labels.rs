//! Packet labels
//!
//! The label byte selects what a packet means. Values 1-11 and 77/78 are the
//! standard DMX USB Pro API; the diff label is a vendor extension for sparse
//! channel updates.

// Standard API labels
pub const REPROGRAM_FIRMWARE: u8 = 1;
pub const PROGRAM_FLASH_PAGE: u8 = 2;
pub const GET_WIDGET_PARAMS: u8 = 3;
pub const SET_WIDGET_PARAMS: u8 = 4;
pub const RECEIVED_DMX_PACKET: u8 = 5;
pub const SEND_DMX: u8 = 6;
pub const SEND_RDM: u8 = 7;
pub const RECEIVE_DMX_ON_CHANGE: u8 = 8;
pub const RECEIVED_DMX_CHANGE_OF_STATE: u8 = 9;
pub const GET_SERIAL_NUMBER: u8 = 10;
pub const SEND_RDM_DISCOVERY: u8 = 11;
pub const GET_MANUFACTURER: u8 = 77;
pub const GET_DEVICE_NAME: u8 = 78;

// Vendor extension
pub const SEND_DMX_DIFF: u8 = 100;

/// Known packet labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Label {
    ReprogramFirmware = REPROGRAM_FIRMWARE,
    ProgramFlashPage = PROGRAM_FLASH_PAGE,
    GetWidgetParams = GET_WIDGET_PARAMS,
    SetWidgetParams = SET_WIDGET_PARAMS,
    ReceivedDmxPacket = RECEIVED_DMX_PACKET,
    SendDmx = SEND_DMX,
    SendRdm = SEND_RDM,
    ReceiveDmxOnChange = RECEIVE_DMX_ON_CHANGE,
    ReceivedDmxChangeOfState = RECEIVED_DMX_CHANGE_OF_STATE,
    GetSerialNumber = GET_SERIAL_NUMBER,
    SendRdmDiscovery = SEND_RDM_DISCOVERY,
    GetManufacturer = GET_MANUFACTURER,
    GetDeviceName = GET_DEVICE_NAME,
    SendDmxDiff = SEND_DMX_DIFF,
}

impl Label {
    /// Get the label as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a label from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            REPROGRAM_FIRMWARE => Some(Label::ReprogramFirmware),
            PROGRAM_FLASH_PAGE => Some(Label::ProgramFlashPage),
            GET_WIDGET_PARAMS => Some(Label::GetWidgetParams),
            SET_WIDGET_PARAMS => Some(Label::SetWidgetParams),
            RECEIVED_DMX_PACKET => Some(Label::ReceivedDmxPacket),
            SEND_DMX => Some(Label::SendDmx),
            SEND_RDM => Some(Label::SendRdm),
            RECEIVE_DMX_ON_CHANGE => Some(Label::ReceiveDmxOnChange),
            RECEIVED_DMX_CHANGE_OF_STATE => Some(Label::ReceivedDmxChangeOfState),
            GET_SERIAL_NUMBER => Some(Label::GetSerialNumber),
            SEND_RDM_DISCOVERY => Some(Label::SendRdmDiscovery),
            GET_MANUFACTURER => Some(Label::GetManufacturer),
            GET_DEVICE_NAME => Some(Label::GetDeviceName),
            SEND_DMX_DIFF => Some(Label::SendDmxDiff),
            _ => None,
        }
    }

    /// Whether packets with this label carry DMX channel data
    pub fn is_dmx(self) -> bool {
        matches!(self, Label::SendDmx | Label::SendDmxDiff)
    }

    /// Whether the decoder reads the length field and payload of this label
    ///
    /// Every other label is treated as header-only: the decoder skips ahead
    /// to the end marker.
    pub fn has_payload(self) -> bool {
        matches!(
            self,
            Label::SendDmx | Label::SendDmxDiff | Label::SetWidgetParams
        )
    }

    /// Whether the widget answers this label with a response packet
    pub fn is_query(self) -> bool {
        matches!(
            self,
            Label::GetWidgetParams
                | Label::GetSerialNumber
                | Label::GetManufacturer
                | Label::GetDeviceName
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_byte_roundtrip() {
        for byte in 0..=u8::MAX {
            if let Some(label) = Label::from_u8(byte) {
                assert_eq!(label.as_u8(), byte);
            }
        }
    }

    #[test]
    fn test_unknown_labels() {
        assert_eq!(Label::from_u8(0), None);
        assert_eq!(Label::from_u8(12), None);
        assert_eq!(Label::from_u8(0xFF), None);
    }

    #[test]
    fn test_payload_labels() {
        assert!(Label::SendDmx.has_payload());
        assert!(Label::SendDmxDiff.has_payload());
        assert!(Label::SetWidgetParams.has_payload());
        assert!(!Label::GetSerialNumber.has_payload());
        assert!(!Label::SendRdm.has_payload());
    }

    #[test]
    fn test_query_labels() {
        assert!(Label::GetSerialNumber.is_query());
        assert!(Label::GetDeviceName.is_query());
        assert!(!Label::SendDmx.is_query());
        assert!(!Label::SetWidgetParams.is_query());
    }
}
