//! Device seam for mesh radio backends
//!
//! The radio protocol, packet framing, and key derivation are external
//! collaborators; this module defines the narrow interface the session
//! logic consumes. Concrete backends (the serial radio in
//! `meshchat-serial`, the deterministic mock in `meshchat-harness`)
//! implement [`MeshDevice`] and hand the caller a bounded event queue at
//! construction time, so inbound delivery is dependency-injected rather
//! than routed through any process-wide subscription.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{ConfigurationError, ConnectionError, SendError};

// ----------------------------------------------------------------------------
// Inbound Events
// ----------------------------------------------------------------------------

/// One inbound event as relayed by the radio.
///
/// Shape mirrors what the transceiver reports: an optional sender
/// identifier and an optional decoded section. Events with no decoded
/// section, or whose decoded section carries no text, are ignored by the
/// dispatcher without error.
#[derive(Debug, Clone, Default)]
pub struct RadioEvent {
    /// Identifier of the sending node, when the radio reported one.
    pub from_id: Option<String>,
    /// Decoded packet contents, absent for undecodable or empty events.
    pub decoded: Option<DecodedPayload>,
}

/// Decoded contents of an inbound packet.
#[derive(Debug, Clone, Default)]
pub struct DecodedPayload {
    /// Text payload, present only for text-message packets.
    pub text: Option<String>,
}

impl RadioEvent {
    /// An event carrying a text message.
    pub fn text(from_id: Option<&str>, text: &str) -> Self {
        Self {
            from_id: from_id.map(str::to_string),
            decoded: Some(DecodedPayload {
                text: Some(text.to_string()),
            }),
        }
    }
}

/// Receiving half of the bounded inbound event queue.
///
/// The device backend pushes [`RadioEvent`] values from its own execution
/// context; the receive dispatcher drains them at presentation pace.
pub type EventReceiver = mpsc::Receiver<RadioEvent>;

// ----------------------------------------------------------------------------
// Channel Slots
// ----------------------------------------------------------------------------

/// Mutable view of one channel slot on the device's local node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSlot {
    /// Short channel label.
    pub name: String,
    /// Preshared key bytes, empty for an unconfigured slot.
    pub psk: Vec<u8>,
    /// Whether the slot uses a built-in modem preset.
    pub use_preset: bool,
}

// ----------------------------------------------------------------------------
// Device Trait
// ----------------------------------------------------------------------------

/// Interface to one mesh radio, owned exclusively by the connection.
///
/// Provisioning follows the device's persistence model: read a slot, stage
/// the modified slot, persist that single channel, then persist the node's
/// overall configuration.
#[async_trait]
pub trait MeshDevice: Send {
    /// Locate and read the channel slot at `index` on the local node.
    fn channel(&self, index: u32) -> Result<ChannelSlot, ConfigurationError>;

    /// Stage new settings for the slot at `index` without persisting them.
    fn stage_channel(&mut self, index: u32, slot: ChannelSlot) -> Result<(), ConfigurationError>;

    /// Persist the staged settings of the single channel at `index`.
    async fn write_channel(&mut self, index: u32) -> Result<(), ConfigurationError>;

    /// Persist the node's overall configuration.
    async fn write_config(&mut self) -> Result<(), ConfigurationError>;

    /// Transmit a text message on the given channel.
    async fn send_text(&mut self, text: &str, channel_index: u32) -> Result<(), SendError>;

    /// Release the underlying link. Called at most once by the connection.
    async fn close(&mut self) -> Result<(), ConnectionError>;
}
