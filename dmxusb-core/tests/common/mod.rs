//! Shared fixtures for widget integration tests

#![allow(dead_code)]

use dmxusb_core::{Widget, WidgetConfig};
use dmxusb_hal::UsbTransport;

/// In-memory transport double
#[derive(Debug, Default)]
pub struct MockTransport {
    pub input: Vec<u8>,
    pub written: Vec<u8>,
    pub write_calls: usize,
}

impl UsbTransport for MockTransport {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let len = self.input.len().min(buf.len());
        buf[..len].copy_from_slice(&self.input[..len]);
        self.input.drain(..len);
        Ok(len)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ()> {
        self.write_calls += 1;
        self.written.extend_from_slice(data);
        Ok(())
    }
}

pub fn widget(config: WidgetConfig) -> Widget<MockTransport> {
    let mut widget = Widget::new(MockTransport::default(), config);
    widget.init().expect("mock transport init");
    widget
}

/// Wrap a payload in a complete packet
pub fn packet(label: u8, payload: &[u8]) -> Vec<u8> {
    let [lo, hi] = (payload.len() as u16).to_le_bytes();
    let mut out = vec![0x7E, label, lo, hi];
    out.extend_from_slice(payload);
    out.push(0xE7);
    out
}

/// Encode `(index, value)` pairs as a diff payload
pub fn diff_payload(entries: &[(u16, u8)]) -> Vec<u8> {
    entries
        .iter()
        .flat_map(|&(index, value)| {
            let [lo, hi] = index.to_le_bytes();
            [lo, hi, value]
        })
        .collect()
}

/// Feed `bytes` split at the given cut points
pub fn ingest_split(widget: &mut Widget<MockTransport>, bytes: &[u8], cuts: &[usize]) {
    let mut points: Vec<usize> = cuts.iter().map(|&c| c % (bytes.len() + 1)).collect();
    points.sort_unstable();

    let mut start = 0;
    for point in points {
        widget.ingest(&bytes[start..point]).expect("initialized");
        start = point;
    }
    widget.ingest(&bytes[start..]).expect("initialized");
}
