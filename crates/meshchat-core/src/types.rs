//! Message types exchanged through the chat session
//!
//! Both types are transient, single-owner values: an `IncomingMessage` is
//! created by the receive dispatcher and consumed once by the display sink,
//! an `OutgoingMessage` is created from one line of user input and consumed
//! once by the connection's send operation.

/// Sender identifier used when an inbound packet carries no `from_id`.
pub const UNKNOWN_SENDER: &str = "unknown";

/// A text message received from the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Identifier of the sending node, `"unknown"` when the packet had none.
    pub sender: String,
    /// The decoded message text.
    pub text: String,
    /// Monotonic arrival sequence assigned by the dispatcher.
    pub arrival_order: u64,
}

impl IncomingMessage {
    /// Render the message the way the display sink shows it.
    pub fn display_line(&self) -> String {
        format!("{}: {}", self.sender, self.text)
    }
}

/// A text message queued for transmission on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub channel_index: u32,
}

impl OutgoingMessage {
    /// Build an outgoing message from one line of user input.
    ///
    /// Empty lines are discarded before construction, so an
    /// `OutgoingMessage` is never empty.
    pub fn from_input(line: &str, channel_index: u32) -> Option<Self> {
        let text = line.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            channel_index,
        })
    }
}
