//! Double-buffered DMX universe
//!
//! Two 513-byte buffers: one is *active* and only ever read by the DMX
//! output, the other is *staging* and receives writes for the packet in
//! flight. Publishing flips a one-bit selector, so the output sees either
//! the previous frame or the new one, never a mix, and then copies the new
//! active frame into the new staging buffer so the next diff update starts
//! from what was just published.

use core::sync::atomic::{AtomicBool, Ordering};

use dmxusb_protocol::DMX_UNIVERSE_SIZE;

/// One DMX universe: start code in slot 0, channels 1-512
pub type Universe = [u8; DMX_UNIVERSE_SIZE];

/// Errors from channel store access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Slot index past the end of the universe
    ChannelIndexOutOfRange { index: u16 },
}

/// Double-buffered channel store
#[derive(Debug)]
pub struct ChannelStore {
    buffers: [Universe; 2],
    /// `false`: buffers[0] is active, `true`: buffers[1] is active
    selector: AtomicBool,
    frames: u32,
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelStore {
    /// Create a store with both buffers zeroed
    pub const fn new() -> Self {
        Self {
            buffers: [[0; DMX_UNIVERSE_SIZE]; 2],
            selector: AtomicBool::new(false),
            frames: 0,
        }
    }

    fn active_index(&self) -> usize {
        self.selector.load(Ordering::Acquire) as usize
    }

    /// The last published frame
    pub fn active(&self) -> &Universe {
        &self.buffers[self.active_index()]
    }

    /// The frame being assembled
    pub fn staging(&self) -> &Universe {
        &self.buffers[1 - self.active_index()]
    }

    /// Number of frames published since the store was cleared (wrapping)
    pub fn frame_count(&self) -> u32 {
        self.frames
    }

    /// Write one slot of the staging buffer
    pub fn stage(&mut self, index: u16, value: u8) -> Result<(), StoreError> {
        let staging = 1 - self.active_index();
        let slot = self.buffers[staging]
            .get_mut(index as usize)
            .ok_or(StoreError::ChannelIndexOutOfRange { index })?;
        *slot = value;
        Ok(())
    }

    /// Promote staging to active
    pub fn publish(&mut self) {
        let now_second = !self.selector.load(Ordering::Acquire);
        self.selector.store(now_second, Ordering::Release);

        let [first, second] = &mut self.buffers;
        let (active, staging) = if now_second {
            (second, first)
        } else {
            (first, second)
        };
        *staging = *active;

        self.frames = self.frames.wrapping_add(1);
    }

    /// Throw away unpublished writes
    pub fn discard(&mut self) {
        let [first, second] = &mut self.buffers;
        let (active, staging) = if self.selector.load(Ordering::Acquire) {
            (second, first)
        } else {
            (first, second)
        };
        *staging = *active;
    }

    /// Read a slot of the published frame
    pub fn read(&self, index: u16) -> Result<u8, StoreError> {
        self.active()
            .get(index as usize)
            .copied()
            .ok_or(StoreError::ChannelIndexOutOfRange { index })
    }

    /// Set a single slot and publish immediately
    pub fn write(&mut self, index: u16, value: u8) -> Result<(), StoreError> {
        self.stage(index, value)?;
        self.publish();
        Ok(())
    }

    /// Zero both buffers and reset the frame counter
    pub fn clear(&mut self) {
        self.buffers = [[0; DMX_UNIVERSE_SIZE]; 2];
        self.selector.store(false, Ordering::Release);
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_zeroed() {
        let store = ChannelStore::new();
        assert!(store.active().iter().all(|&b| b == 0));
        assert!(store.staging().iter().all(|&b| b == 0));
        assert_eq!(store.frame_count(), 0);
    }

    #[test]
    fn test_staged_writes_hidden_until_publish() {
        let mut store = ChannelStore::new();
        store.stage(1, 0xFF).unwrap();
        store.stage(512, 0x80).unwrap();

        assert_eq!(store.read(1), Ok(0));
        assert_eq!(store.read(512), Ok(0));

        store.publish();
        assert_eq!(store.read(1), Ok(0xFF));
        assert_eq!(store.read(512), Ok(0x80));
        assert_eq!(store.frame_count(), 1);
    }

    #[test]
    fn test_publish_resyncs_staging() {
        let mut store = ChannelStore::new();
        store.stage(10, 42).unwrap();
        store.publish();

        // New staging starts from the published frame
        assert_eq!(store.staging()[10], 42);

        store.stage(11, 7).unwrap();
        store.publish();
        assert_eq!(store.read(10), Ok(42));
        assert_eq!(store.read(11), Ok(7));
    }

    #[test]
    fn test_publish_swaps_buffers() {
        let mut store = ChannelStore::new();
        let before = store.active().as_ptr();
        store.publish();
        let after = store.active().as_ptr();
        assert_ne!(before, after);
        store.publish();
        assert_eq!(store.active().as_ptr(), before);
    }

    #[test]
    fn test_discard_drops_staged_writes() {
        let mut store = ChannelStore::new();
        store.write(3, 33).unwrap();
        store.stage(3, 99).unwrap();
        store.stage(4, 44).unwrap();

        store.discard();
        assert_eq!(store.staging()[3], 33);
        assert_eq!(store.staging()[4], 0);

        store.publish();
        assert_eq!(store.read(3), Ok(33));
        assert_eq!(store.read(4), Ok(0));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut store = ChannelStore::new();
        assert_eq!(
            store.read(513),
            Err(StoreError::ChannelIndexOutOfRange { index: 513 })
        );
        assert_eq!(
            store.write(600, 1),
            Err(StoreError::ChannelIndexOutOfRange { index: 600 })
        );
        assert_eq!(store.frame_count(), 0);
    }

    #[test]
    fn test_write_publishes() {
        let mut store = ChannelStore::new();
        store.write(0, 0xCC).unwrap();
        assert_eq!(store.read(0), Ok(0xCC));
        assert_eq!(store.frame_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut store = ChannelStore::new();
        store.write(5, 5).unwrap();
        store.publish();
        store.clear();
        assert_eq!(store.read(5), Ok(0));
        assert_eq!(store.staging()[5], 0);
        assert_eq!(store.frame_count(), 0);
    }
}
