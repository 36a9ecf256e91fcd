//! Frame decoding for the DMX USB Pro protocol.
//!
//! Frame format:
//! - START (1 byte): 0x7E
//! - LABEL (1 byte): packet type, see [`crate::labels`]
//! - LENGTH (2 bytes): payload length, least significant byte first
//! - PAYLOAD (LENGTH bytes)
//! - END (1 byte): 0xE7
//!
//! DMX payloads are never buffered. The decoder turns each payload byte into
//! a channel write as it arrives, so a 513-byte universe costs no more memory
//! than a one-byte query.

use heapless::Vec;

use crate::labels::{Label, SEND_DMX, SEND_DMX_DIFF};
use crate::policy::{DecodePolicy, Malformed};

/// Frame start marker
pub const START_MARKER: u8 = 0x7E;

/// Frame end marker
pub const END_MARKER: u8 = 0xE7;

/// Slots in a DMX universe: start code plus 512 channels
pub const DMX_UNIVERSE_SIZE: usize = 513;

/// Bytes of an administrative payload kept for dispatch
///
/// Only set-widget-params is buffered, and only its timing section matters.
pub const MAX_ADMIN_PAYLOAD: usize = 8;

/// Why a packet was dropped without being dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscardReason {
    /// Something other than the end marker followed the payload
    MissingEnd,
    /// Full frame longer than the universe (rejecting policy)
    LengthOutOfRange,
    /// Diff payload not a multiple of three bytes (rejecting policy)
    TruncatedDiffGroup,
    /// Diff entry addressed a slot past the universe (rejecting policy)
    ChannelIndexOutOfRange,
}

/// Externally visible decoder phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderPhase {
    Idle,
    LabelWait,
    LengthLow,
    LengthHigh,
    Data,
    EndWait,
}

/// A completed packet
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Raw label byte, known or not
    pub label: u8,
    /// Declared payload length (zero for header-only labels)
    pub length: u16,
    /// Buffered administrative payload, empty for DMX labels
    pub payload: Vec<u8, MAX_ADMIN_PAYLOAD>,
    /// Bytes of a trailing partial diff group that produced no write
    pub dropped_tail: u8,
    /// Number of writes skipped because they fell outside the universe
    pub skipped_writes: u16,
}

impl Packet {
    pub fn kind(&self) -> Option<Label> {
        Label::from_u8(self.label)
    }
}

/// Result of feeding one byte
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Byte consumed, nothing to act on yet
    Pending,
    /// Write `value` to slot `index` of the staging universe
    Channel { index: u16, value: u8 },
    /// A write to `index` was dropped because it is out of range
    Skipped { index: u16 },
    /// A packet ended with a valid end marker
    Complete(Packet),
    /// A packet was abandoned; nothing written for it should be published
    Discarded { label: u8, reason: DiscardReason },
}

/// Position inside a diff triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffPhase {
    IndexLow,
    IndexHigh { low: u8 },
    Value { index: u16 },
}

impl DiffPhase {
    /// Bytes of the current group already consumed
    fn pending_bytes(self) -> u8 {
        match self {
            DiffPhase::IndexLow => 0,
            DiffPhase::IndexHigh { .. } => 1,
            DiffPhase::Value { .. } => 2,
        }
    }
}

/// How payload bytes are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    /// Byte `n` goes to slot `n`
    Full,
    /// Repeating `[index lo][index hi][value]`
    Diff(DiffPhase),
    /// Kept in the admin buffer
    Buffered,
}

/// Packet being received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Body {
    label: u8,
    length: u16,
    received: u16,
    payload: Payload,
    skipped_writes: u16,
}

/// What the decoder expects at the end of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tail {
    /// Length was parsed; the very next byte must be END
    Strict {
        label: u8,
        length: u16,
        dropped_tail: u8,
        skipped_writes: u16,
    },
    /// Header-only label; skip bytes until END
    Scan { label: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    LabelWait,
    LengthLow { label: u8 },
    LengthHigh { label: u8, low: u8 },
    Data(Body),
    EndWait(Tail),
}

/// Resumable byte-at-a-time decoder
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: State,
    policy: DecodePolicy,
    admin: Vec<u8, MAX_ADMIN_PAYLOAD>,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DecodePolicy::default())
    }
}

impl FrameDecoder {
    /// Create a new decoder
    pub fn new(policy: DecodePolicy) -> Self {
        Self {
            state: State::Idle,
            policy,
            admin: Vec::new(),
        }
    }

    /// Drop any packet in progress and wait for a start marker
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.admin.clear();
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DecodePolicy) {
        self.policy = policy;
    }

    pub fn phase(&self) -> DecoderPhase {
        match self.state {
            State::Idle => DecoderPhase::Idle,
            State::LabelWait => DecoderPhase::LabelWait,
            State::LengthLow { .. } => DecoderPhase::LengthLow,
            State::LengthHigh { .. } => DecoderPhase::LengthHigh,
            State::Data(_) => DecoderPhase::Data,
            State::EndWait(_) => DecoderPhase::EndWait,
        }
    }

    /// Feed a single byte to the decoder
    pub fn feed(&mut self, byte: u8) -> Step {
        let (next, step) = match self.state {
            State::Idle => {
                // Silently ignore anything that isn't a start marker
                let next = if byte == START_MARKER {
                    State::LabelWait
                } else {
                    State::Idle
                };
                (next, Step::Pending)
            }
            State::LabelWait => {
                let next = match Label::from_u8(byte) {
                    Some(label) if label.has_payload() => State::LengthLow { label: byte },
                    _ => State::EndWait(Tail::Scan { label: byte }),
                };
                (next, Step::Pending)
            }
            State::LengthLow { label } => (State::LengthHigh { label, low: byte }, Step::Pending),
            State::LengthHigh { label, low } => {
                self.begin_payload(label, u16::from_le_bytes([low, byte]))
            }
            State::Data(body) => self.payload_byte(body, byte),
            State::EndWait(tail) => self.finish(tail, byte),
        };

        self.state = next;
        step
    }

    fn begin_payload(&mut self, label: u8, length: u16) -> (State, Step) {
        if label == SEND_DMX
            && length as usize > DMX_UNIVERSE_SIZE
            && self.policy.out_of_range == Malformed::Reject
        {
            return (
                State::Idle,
                Step::Discarded {
                    label,
                    reason: DiscardReason::LengthOutOfRange,
                },
            );
        }

        self.admin.clear();

        if length == 0 {
            let tail = Tail::Strict {
                label,
                length,
                dropped_tail: 0,
                skipped_writes: 0,
            };
            return (State::EndWait(tail), Step::Pending);
        }

        let payload = match label {
            SEND_DMX => Payload::Full,
            SEND_DMX_DIFF => Payload::Diff(DiffPhase::IndexLow),
            _ => Payload::Buffered,
        };

        let body = Body {
            label,
            length,
            received: 0,
            payload,
            skipped_writes: 0,
        };
        (State::Data(body), Step::Pending)
    }

    fn payload_byte(&mut self, mut body: Body, byte: u8) -> (State, Step) {
        let step = match body.payload {
            Payload::Full => {
                let index = body.received;
                channel_write(&mut body, index, byte)
            }
            Payload::Diff(DiffPhase::IndexLow) => {
                body.payload = Payload::Diff(DiffPhase::IndexHigh { low: byte });
                Step::Pending
            }
            Payload::Diff(DiffPhase::IndexHigh { low }) => {
                let index = u16::from_le_bytes([low, byte]);
                body.payload = Payload::Diff(DiffPhase::Value { index });
                Step::Pending
            }
            Payload::Diff(DiffPhase::Value { index }) => {
                body.payload = Payload::Diff(DiffPhase::IndexLow);
                channel_write(&mut body, index, byte)
            }
            Payload::Buffered => {
                // Bytes past the buffer are counted but not kept
                let _ = self.admin.push(byte);
                Step::Pending
            }
        };

        // received < length <= u16::MAX, so this cannot overflow
        body.received += 1;

        if body.received < body.length {
            return (State::Data(body), step);
        }

        let dropped_tail = match body.payload {
            Payload::Diff(phase) => phase.pending_bytes(),
            _ => 0,
        };
        let tail = Tail::Strict {
            label: body.label,
            length: body.length,
            dropped_tail,
            skipped_writes: body.skipped_writes,
        };
        (State::EndWait(tail), step)
    }

    fn finish(&mut self, tail: Tail, byte: u8) -> (State, Step) {
        match tail {
            Tail::Scan { label } => {
                if byte != END_MARKER {
                    return (State::EndWait(tail), Step::Pending);
                }
                let packet = Packet {
                    label,
                    length: 0,
                    payload: Vec::new(),
                    dropped_tail: 0,
                    skipped_writes: 0,
                };
                (State::Idle, Step::Complete(packet))
            }
            Tail::Strict {
                label,
                length,
                dropped_tail,
                skipped_writes,
            } => {
                if byte != END_MARKER {
                    self.admin.clear();
                    // A start marker here most likely begins the next packet
                    let next = if byte == START_MARKER {
                        State::LabelWait
                    } else {
                        State::Idle
                    };
                    let step = Step::Discarded {
                        label,
                        reason: DiscardReason::MissingEnd,
                    };
                    return (next, step);
                }

                if let Some(reason) = self.rejection(dropped_tail, skipped_writes) {
                    self.admin.clear();
                    return (State::Idle, Step::Discarded { label, reason });
                }

                let packet = Packet {
                    label,
                    length,
                    payload: core::mem::take(&mut self.admin),
                    dropped_tail,
                    skipped_writes,
                };
                (State::Idle, Step::Complete(packet))
            }
        }
    }

    fn rejection(&self, dropped_tail: u8, skipped_writes: u16) -> Option<DiscardReason> {
        if dropped_tail > 0 && self.policy.truncated_diff == Malformed::Reject {
            return Some(DiscardReason::TruncatedDiffGroup);
        }
        if skipped_writes > 0 && self.policy.out_of_range == Malformed::Reject {
            return Some(DiscardReason::ChannelIndexOutOfRange);
        }
        None
    }
}

/// Bounds-check a channel write against the universe
fn channel_write(body: &mut Body, index: u16, value: u8) -> Step {
    if (index as usize) < DMX_UNIVERSE_SIZE {
        Step::Channel { index, value }
    } else {
        body.skipped_writes = body.skipped_writes.saturating_add(1);
        Step::Skipped { index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{GET_SERIAL_NUMBER, SET_WIDGET_PARAMS};

    /// Feed bytes and collect every non-pending step
    fn run(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<Step, 64> {
        let mut steps = Vec::new();
        for &byte in bytes {
            match decoder.feed(byte) {
                Step::Pending => {}
                step => {
                    let _ = steps.push(step);
                }
            }
        }
        steps
    }

    fn complete(label: u8, length: u16) -> Step {
        Step::Complete(Packet {
            label,
            length,
            payload: Vec::new(),
            dropped_tail: 0,
            skipped_writes: 0,
        })
    }

    #[test]
    fn test_full_frame_writes_in_order() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x7E, SEND_DMX, 3, 0, 0x00, 0x10, 0x20, 0xE7]);

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0], Step::Channel { index: 0, value: 0x00 });
        assert_eq!(steps[1], Step::Channel { index: 1, value: 0x10 });
        assert_eq!(steps[2], Step::Channel { index: 2, value: 0x20 });
        assert_eq!(steps[3], complete(SEND_DMX, 3));
        assert_eq!(decoder.phase(), DecoderPhase::Idle);
    }

    #[test]
    fn test_zero_length_frame() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x7E, SEND_DMX, 0, 0, 0xE7]);
        assert_eq!(steps.as_slice(), &[complete(SEND_DMX, 0)]);
    }

    #[test]
    fn test_diff_triple() {
        let mut decoder = FrameDecoder::default();
        let steps = run(
            &mut decoder,
            &[0x7E, SEND_DMX_DIFF, 6, 0, 0x05, 0x00, 0x2A, 0x00, 0x02, 0xFF, 0xE7],
        );

        assert_eq!(steps[0], Step::Channel { index: 5, value: 0x2A });
        assert_eq!(steps[1], Step::Channel { index: 512, value: 0xFF });
        assert_eq!(steps[2], complete(SEND_DMX_DIFF, 6));
    }

    #[test]
    fn test_diff_truncated_group_tolerated() {
        let mut decoder = FrameDecoder::default();
        let steps = run(
            &mut decoder,
            &[0x7E, SEND_DMX_DIFF, 5, 0, 0x01, 0x00, 0x11, 0x02, 0x00, 0xE7],
        );

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0], Step::Channel { index: 1, value: 0x11 });
        match &steps[1] {
            Step::Complete(packet) => assert_eq!(packet.dropped_tail, 2),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_diff_truncated_group_rejected() {
        let mut decoder = FrameDecoder::new(DecodePolicy::strict());
        let steps = run(&mut decoder, &[0x7E, SEND_DMX_DIFF, 4, 0, 0x01, 0x00, 0x11, 0x02, 0xE7]);

        assert_eq!(
            steps.last(),
            Some(&Step::Discarded {
                label: SEND_DMX_DIFF,
                reason: DiscardReason::TruncatedDiffGroup,
            })
        );
    }

    #[test]
    fn test_diff_index_out_of_range() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x7E, SEND_DMX_DIFF, 3, 0, 0x01, 0x02, 0x99, 0xE7]);

        assert_eq!(steps[0], Step::Skipped { index: 513 });
        match &steps[1] {
            Step::Complete(packet) => assert_eq!(packet.skipped_writes, 1),
            other => panic!("unexpected step {:?}", other),
        }

        let mut strict = FrameDecoder::new(DecodePolicy::strict());
        let steps = run(&mut strict, &[0x7E, SEND_DMX_DIFF, 3, 0, 0x01, 0x02, 0x99, 0xE7]);
        assert_eq!(
            steps.last(),
            Some(&Step::Discarded {
                label: SEND_DMX_DIFF,
                reason: DiscardReason::ChannelIndexOutOfRange,
            })
        );
    }

    #[test]
    fn test_oversized_frame_rejected_at_header() {
        let mut decoder = FrameDecoder::new(DecodePolicy::strict());
        let steps = run(&mut decoder, &[0x7E, SEND_DMX, 0xFF, 0xFF]);

        assert_eq!(
            steps.as_slice(),
            &[Step::Discarded {
                label: SEND_DMX,
                reason: DiscardReason::LengthOutOfRange,
            }]
        );
        assert_eq!(decoder.phase(), DecoderPhase::Idle);
    }

    #[test]
    fn test_oversized_frame_tolerated_skips_tail() {
        let mut decoder = FrameDecoder::default();
        for &byte in &[0x7E, SEND_DMX, 0x03, 0x02] {
            assert_eq!(decoder.feed(byte), Step::Pending);
        }
        // 515 bytes declared: slots 0..=512 written, then two skipped
        for i in 0..DMX_UNIVERSE_SIZE as u16 {
            assert_eq!(decoder.feed(1), Step::Channel { index: i, value: 1 });
        }
        assert_eq!(decoder.feed(1), Step::Skipped { index: 513 });
        assert_eq!(decoder.feed(1), Step::Skipped { index: 514 });
        match decoder.feed(END_MARKER) {
            Step::Complete(packet) => assert_eq!(packet.skipped_writes, 2),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_query_skips_length_field() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x7E, GET_SERIAL_NUMBER, 0x00, 0x00, 0xE7]);
        assert_eq!(steps.as_slice(), &[complete(GET_SERIAL_NUMBER, 0)]);
    }

    #[test]
    fn test_unknown_label_header_only() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x7E, 0x02, 0xE7]);
        assert_eq!(steps.as_slice(), &[complete(0x02, 0)]);
    }

    #[test]
    fn test_set_params_payload_buffered() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x7E, SET_WIDGET_PARAMS, 5, 0, 0, 0, 20, 4, 30, 0xE7]);

        match &steps[0] {
            Step::Complete(packet) => {
                assert_eq!(packet.label, SET_WIDGET_PARAMS);
                assert_eq!(packet.payload.as_slice(), &[0, 0, 20, 4, 30]);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_missing_end_discards() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x7E, SEND_DMX, 1, 0, 0x00, 0x55]);

        assert_eq!(steps[0], Step::Channel { index: 0, value: 0 });
        assert_eq!(
            steps[1],
            Step::Discarded {
                label: SEND_DMX,
                reason: DiscardReason::MissingEnd,
            }
        );
        assert_eq!(decoder.phase(), DecoderPhase::Idle);
    }

    #[test]
    fn test_start_marker_in_place_of_end_begins_next_packet() {
        let mut decoder = FrameDecoder::default();
        let steps = run(
            &mut decoder,
            &[0x7E, SEND_DMX, 1, 0, 0x00, 0x7E, GET_SERIAL_NUMBER, 0xE7],
        );

        assert_eq!(
            steps[1],
            Step::Discarded {
                label: SEND_DMX,
                reason: DiscardReason::MissingEnd,
            }
        );
        assert_eq!(steps[2], complete(GET_SERIAL_NUMBER, 0));
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut decoder = FrameDecoder::default();
        let steps = run(&mut decoder, &[0x00, 0xFF, 0x12, 0xE7, 0x7E, 0x03, 0xE7]);
        assert_eq!(steps.as_slice(), &[complete(0x03, 0)]);
    }

    #[test]
    fn test_reset_mid_packet() {
        let mut decoder = FrameDecoder::default();
        run(&mut decoder, &[0x7E, SEND_DMX, 10, 0, 1, 2]);
        assert_eq!(decoder.phase(), DecoderPhase::Data);

        decoder.reset();
        assert_eq!(decoder.phase(), DecoderPhase::Idle);
        // The tail of the old packet is ignored
        assert!(run(&mut decoder, &[3, 4, 5, 0xE7]).is_empty());
    }

    #[test]
    fn test_max_length_full_frame() {
        let mut decoder = FrameDecoder::new(DecodePolicy::strict());
        let [lo, hi] = (DMX_UNIVERSE_SIZE as u16).to_le_bytes();
        for &byte in &[0x7E, SEND_DMX, lo, hi] {
            assert_eq!(decoder.feed(byte), Step::Pending);
        }
        for i in 0..DMX_UNIVERSE_SIZE as u16 {
            assert_eq!(decoder.feed(0xAB), Step::Channel { index: i, value: 0xAB });
        }
        assert_eq!(
            decoder.feed(END_MARKER),
            complete(SEND_DMX, DMX_UNIVERSE_SIZE as u16)
        );
    }
}
