//! Handling of malformed DMX payloads
//!
//! The wire protocol has no way to signal an error back to the host, so a
//! widget either tolerates bad payloads (applies what it can) or rejects the
//! whole packet. Both are selectable per fault class.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do with a packet containing a given kind of malformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Malformed {
    /// Apply the well-formed part, skip the rest
    #[default]
    Tolerate,
    /// Drop the whole packet without publishing anything from it
    Reject,
}

/// Decoder policy for malformed DMX payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodePolicy {
    /// Diff payload whose length is not a multiple of three
    pub truncated_diff: Malformed,
    /// Full frame longer than the universe, or a diff index past its end
    pub out_of_range: Malformed,
}

impl DecodePolicy {
    /// Reject every malformed packet
    pub const fn strict() -> Self {
        Self {
            truncated_diff: Malformed::Reject,
            out_of_range: Malformed::Reject,
        }
    }
}
