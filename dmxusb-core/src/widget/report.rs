//! Per-call ingest summary

use dmxusb_protocol::DiscardReason;

/// A non-fatal problem met while processing input
///
/// None of these stop ingestion; the decoder resynchronizes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// A DMX write addressed a slot past the universe and was skipped
    ChannelIndexOutOfRange { index: u16 },
    /// A diff payload ended with a partial group
    TruncatedDiffGroup { dropped: u8 },
    /// A packet was abandoned without being dispatched
    PacketDiscarded { label: u8, reason: DiscardReason },
    /// A set-params request was too short or out of range
    InvalidParams,
    /// The transport refused a response write
    TransportWrite { label: u8 },
}

/// What one `ingest` or `poll` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IngestReport {
    /// Bytes fed to the decoder
    pub bytes: usize,
    /// Packets completed with a valid end marker
    pub packets: u16,
    /// Frames published to the active buffer
    pub published: u16,
    /// Packets dropped before dispatch
    pub discarded: u16,
    /// Response packets written
    pub responses: u16,
    /// DMX writes skipped as out of range
    pub skipped_writes: u32,
    /// First fault seen during the call
    pub fault: Option<Fault>,
}

impl IngestReport {
    pub(crate) fn record(&mut self, fault: Fault) {
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
    }

    /// Whether anything reached the channel store or the host
    pub fn is_idle(&self) -> bool {
        self.packets == 0 && self.discarded == 0
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: IngestReport) {
        self.bytes += other.bytes;
        self.packets = self.packets.saturating_add(other.packets);
        self.published = self.published.saturating_add(other.published);
        self.discarded = self.discarded.saturating_add(other.discarded);
        self.responses = self.responses.saturating_add(other.responses);
        self.skipped_writes = self.skipped_writes.saturating_add(other.skipped_writes);
        if let Some(fault) = other.fault {
            self.record(fault);
        }
    }
}
