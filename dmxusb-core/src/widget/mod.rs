//! Widget engine
//!
//! Ties the frame decoder, the channel store and the host transport
//! together. The engine is driven from outside: a polling loop calls
//! [`Widget::poll`] (or hands chunks to [`Widget::ingest`]) and everything
//! the resulting bytes cause (channel writes, publishes, response packets)
//! happens synchronously inside that call.

mod report;

pub use report::{Fault, IngestReport};

use dmxusb_hal::{UsbTransport, USB_PACKET_SIZE};
use dmxusb_protocol::{
    DecoderPhase, FrameDecoder, Label, Packet, Response, Step, WidgetIdentity, WidgetParams,
};

use crate::config::WidgetConfig;
use crate::store::{ChannelStore, StoreError, Universe};

/// Errors returned by the widget API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WidgetError {
    /// `init` has not been called (or `deinit` was)
    NotInitialized,
    /// The transport failed to start, stop or read
    Transport,
    /// A host packet is half received; its writes sit in staging
    Busy,
    /// Channel store access failed
    Store(StoreError),
}

impl From<StoreError> for WidgetError {
    fn from(e: StoreError) -> Self {
        WidgetError::Store(e)
    }
}

/// DMX USB Pro widget protocol instance
pub struct Widget<T> {
    transport: T,
    decoder: FrameDecoder,
    store: ChannelStore,
    identity: WidgetIdentity,
    params: WidgetParams,
    config: WidgetConfig,
    initialized: bool,
}

impl<T: UsbTransport> Widget<T> {
    /// Create an uninitialized widget around a transport
    pub fn new(transport: T, config: WidgetConfig) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(config.policy),
            store: ChannelStore::new(),
            identity: WidgetIdentity::default(),
            params: config.params,
            config,
            initialized: false,
        }
    }

    /// Bring up the transport and reset all protocol state
    ///
    /// Returns `Ok(false)` without touching anything if already initialized.
    pub fn init(&mut self) -> Result<bool, WidgetError> {
        if self.initialized {
            return Ok(false);
        }

        self.transport.init().map_err(|_| WidgetError::Transport)?;

        self.decoder = FrameDecoder::new(self.config.policy);
        self.store.clear();
        self.params = self.config.params;
        self.initialized = true;
        Ok(true)
    }

    /// Shut the transport down; a no-op if not initialized
    pub fn deinit(&mut self) -> Result<(), WidgetError> {
        if !self.initialized {
            return Ok(());
        }

        self.initialized = false;
        self.transport.deinit().map_err(|_| WidgetError::Transport)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Install the identity reported to the host
    pub fn set_identity(&mut self, identity: WidgetIdentity) {
        self.identity = identity;
    }

    pub fn identity(&self) -> &WidgetIdentity {
        &self.identity
    }

    /// Current DMX output timing
    pub fn params(&self) -> WidgetParams {
        self.params
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Read-only view of the channel store for the DMX output
    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    /// The last published universe
    pub fn active_frame(&self) -> &Universe {
        self.store.active()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Read one USB transfer unit from the transport and process it
    pub fn poll(&mut self) -> Result<IngestReport, WidgetError> {
        if !self.initialized {
            return Err(WidgetError::NotInitialized);
        }

        let mut buf = [0u8; USB_PACKET_SIZE];
        let len = self
            .transport
            .read(&mut buf)
            .map_err(|_| WidgetError::Transport)?;

        self.ingest(&buf[..len.min(USB_PACKET_SIZE)])
    }

    /// Process a chunk of raw bytes from the host
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<IngestReport, WidgetError> {
        if !self.initialized {
            return Err(WidgetError::NotInitialized);
        }

        let mut report = IngestReport {
            bytes: bytes.len(),
            ..Default::default()
        };

        for &byte in bytes {
            match self.decoder.feed(byte) {
                Step::Pending => {}
                Step::Channel { index, value } => {
                    if let Err(StoreError::ChannelIndexOutOfRange { index }) =
                        self.store.stage(index, value)
                    {
                        report.skipped_writes = report.skipped_writes.saturating_add(1);
                        report.record(Fault::ChannelIndexOutOfRange { index });
                    }
                }
                Step::Skipped { index } => {
                    report.skipped_writes = report.skipped_writes.saturating_add(1);
                    report.record(Fault::ChannelIndexOutOfRange { index });
                }
                Step::Complete(packet) => self.dispatch(packet, &mut report),
                Step::Discarded { label, reason } => {
                    self.store.discard();
                    report.discarded = report.discarded.saturating_add(1);
                    report.record(Fault::PacketDiscarded { label, reason });
                }
            }
        }

        Ok(report)
    }

    /// Read a slot of the published frame
    pub fn read_channel(&self, index: u16) -> Result<u8, WidgetError> {
        if !self.initialized {
            return Err(WidgetError::NotInitialized);
        }
        Ok(self.store.read(index)?)
    }

    /// Set a single slot outside the wire protocol and publish it
    ///
    /// Refused with [`WidgetError::Busy`] while a host packet is in flight,
    /// since publishing would expose that packet's partial writes.
    pub fn write_channel(&mut self, index: u16, value: u8) -> Result<(), WidgetError> {
        if !self.initialized {
            return Err(WidgetError::NotInitialized);
        }
        if self.decoder.phase() != DecoderPhase::Idle {
            return Err(WidgetError::Busy);
        }
        Ok(self.store.write(index, value)?)
    }

    fn dispatch(&mut self, packet: Packet, report: &mut IngestReport) {
        report.packets = report.packets.saturating_add(1);

        match packet.kind() {
            Some(label) if label.is_dmx() => {
                if packet.dropped_tail > 0 {
                    report.record(Fault::TruncatedDiffGroup {
                        dropped: packet.dropped_tail,
                    });
                }
                self.store.publish();
                report.published = report.published.saturating_add(1);
            }
            Some(Label::SetWidgetParams) => {
                match WidgetParams::from_set_request(&packet.payload) {
                    Some(params) => self.params = params,
                    None => report.record(Fault::InvalidParams),
                }
            }
            Some(label) if label.is_query() => self.respond(packet.label, report),
            // Valid framing, nothing to do
            _ => {}
        }
    }

    fn respond(&mut self, label: u8, report: &mut IngestReport) {
        let Some(response) = Response::for_query(label, &self.identity, &self.params) else {
            return;
        };

        let written = self
            .transport
            .write(&response.header())
            .and_then(|()| self.transport.write(response.payload()))
            .and_then(|()| self.transport.write(&response.footer()));

        match written {
            Ok(()) => report.responses = report.responses.saturating_add(1),
            Err(_) => report.record(Fault::TransportWrite { label }),
        }
    }
}
