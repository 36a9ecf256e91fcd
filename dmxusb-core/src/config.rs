//! Widget configuration
//!
//! Board-agnostic settings for the widget engine. With the `serde` feature
//! the config round-trips through postcard; that path is for host tools and
//! boards with config storage. The RP2040 firmware builds without it and
//! compiles its config in.

use dmxusb_protocol::{DecodePolicy, WidgetParams};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Config version mismatch
    VersionMismatch,
    /// Stored timing is outside the allowed range
    InvalidParams,
}

/// Widget engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WidgetConfig {
    /// Format version, must equal [`CONFIG_VERSION`]
    pub version: u8,
    /// Handling of malformed DMX payloads
    pub policy: DecodePolicy,
    /// DMX output timing applied at init
    pub params: WidgetParams,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            policy: DecodePolicy::default(),
            params: WidgetParams::default(),
        }
    }
}

impl WidgetConfig {
    /// Check version and timing ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if !self.params.is_valid() {
            return Err(ConfigError::InvalidParams);
        }
        Ok(())
    }

    /// Serialize into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate a stored configuration
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }
}
