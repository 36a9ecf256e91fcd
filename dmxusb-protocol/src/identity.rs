//! Widget identity
//!
//! The identity record answers the host's serial-number, manufacturer and
//! device-name queries. It is built once and never mutated; replacing the
//! identity means installing a whole new record.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of the manufacturer and device name strings in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Firmware version as reported in the widget parameters reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl FirmwareVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Pack as `u16` with the major number in the high byte
    pub const fn packed(self) -> u16 {
        u16::from_be_bytes([self.major, self.minor])
    }

    pub const fn from_packed(packed: u16) -> Self {
        let [major, minor] = packed.to_be_bytes();
        Self { major, minor }
    }
}

/// Device identity reported to the host
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WidgetIdentity {
    serial_number: u32,
    manufacturer_id: u16,
    device_id: u16,
    firmware: FirmwareVersion,
    manufacturer_name: String<MAX_NAME_LEN>,
    device_name: String<MAX_NAME_LEN>,
}

impl Default for WidgetIdentity {
    fn default() -> Self {
        Self::new(u32::MAX)
    }
}

impl WidgetIdentity {
    /// Create an identity with the given serial number
    ///
    /// Firmware version defaults to 1.0, IDs to zero and names to empty.
    pub fn new(serial_number: u32) -> Self {
        Self {
            serial_number,
            manufacturer_id: 0,
            device_id: 0,
            firmware: FirmwareVersion::new(1, 0),
            manufacturer_name: String::new(),
            device_name: String::new(),
        }
    }

    /// Set the ESTA manufacturer ID and name
    ///
    /// Names longer than [`MAX_NAME_LEN`] bytes are truncated.
    pub fn with_manufacturer(mut self, esta_id: u16, name: &str) -> Self {
        self.manufacturer_id = esta_id;
        self.manufacturer_name = bounded(name);
        self
    }

    /// Set the device ID and name
    ///
    /// Names longer than [`MAX_NAME_LEN`] bytes are truncated.
    pub fn with_device(mut self, device_id: u16, name: &str) -> Self {
        self.device_id = device_id;
        self.device_name = bounded(name);
        self
    }

    pub fn with_firmware(mut self, firmware: FirmwareVersion) -> Self {
        self.firmware = firmware;
        self
    }

    pub fn serial_number(&self) -> u32 {
        self.serial_number
    }

    pub fn manufacturer_id(&self) -> u16 {
        self.manufacturer_id
    }

    pub fn device_id(&self) -> u16 {
        self.device_id
    }

    pub fn firmware(&self) -> FirmwareVersion {
        self.firmware
    }

    pub fn manufacturer_name(&self) -> &str {
        &self.manufacturer_name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

/// Copy at most `MAX_NAME_LEN` bytes, backing off to a char boundary
fn bounded(name: &str) -> String<MAX_NAME_LEN> {
    let mut end = name.len().min(MAX_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    let mut out = String::new();
    // Cannot fail: end <= MAX_NAME_LEN
    let _ = out.push_str(&name[..end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_packing() {
        let fw = FirmwareVersion::new(2, 7);
        assert_eq!(fw.packed(), 0x0207);
        assert_eq!(FirmwareVersion::from_packed(0x0207), fw);
    }

    #[test]
    fn test_default_identity() {
        let id = WidgetIdentity::default();
        assert_eq!(id.serial_number(), 0xFFFF_FFFF);
        assert_eq!(id.firmware(), FirmwareVersion::new(1, 0));
        assert_eq!(id.manufacturer_name(), "");
    }

    #[test]
    fn test_builder_fields() {
        let id = WidgetIdentity::new(0x1234_5678)
            .with_manufacturer(0x454E, "Acme Lighting")
            .with_device(0x0042, "USB DMX")
            .with_firmware(FirmwareVersion::new(1, 4));

        assert_eq!(id.serial_number(), 0x1234_5678);
        assert_eq!(id.manufacturer_id(), 0x454E);
        assert_eq!(id.manufacturer_name(), "Acme Lighting");
        assert_eq!(id.device_id(), 0x0042);
        assert_eq!(id.device_name(), "USB DMX");
        assert_eq!(id.firmware().packed(), 0x0104);
    }

    #[test]
    fn test_long_name_truncated() {
        let long = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        let id = WidgetIdentity::new(1).with_device(1, long);
        assert_eq!(id.device_name().len(), MAX_NAME_LEN);
        assert_eq!(id.device_name(), &long[..MAX_NAME_LEN]);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // 31 ASCII bytes followed by a 2-byte character straddling the limit
        let mut name = heapless::String::<40>::new();
        for _ in 0..31 {
            name.push('a').unwrap();
        }
        name.push('é').unwrap();

        let id = WidgetIdentity::new(1).with_manufacturer(1, &name);
        assert_eq!(id.manufacturer_name().len(), 31);
    }
}
