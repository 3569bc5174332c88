//! Inbound receive dispatcher
//!
//! Drains the bounded event queue fed by the device backend and routes
//! text messages to the display sink, decoupling arrival timing from
//! presentation timing. The dispatcher runs for the lifetime of the
//! connection, never blocks on user input, and never touches the
//! connection itself.

use tokio::sync::mpsc;

use crate::device::RadioEvent;
use crate::types::{IncomingMessage, UNKNOWN_SENDER};

// ----------------------------------------------------------------------------
// Display Sink
// ----------------------------------------------------------------------------

/// Where dispatched messages are shown.
///
/// After each message the current input prompt is re-emitted so the screen
/// stays consistent with the interactive loop that also writes the prompt.
pub trait MessageSink: Send {
    /// Show one formatted inbound message line.
    fn message(&mut self, line: &str);

    /// Re-emit the input prompt after an inbound message.
    fn prompt(&mut self, prompt: &str);
}

// ----------------------------------------------------------------------------
// Receive Dispatcher
// ----------------------------------------------------------------------------

/// Consumes radio events and presents qualifying text messages.
pub struct ReceiveDispatcher<S: MessageSink> {
    events: mpsc::Receiver<RadioEvent>,
    sink: S,
    prompt: String,
    next_arrival: u64,
}

impl<S: MessageSink> ReceiveDispatcher<S> {
    pub fn new(events: mpsc::Receiver<RadioEvent>, sink: S, prompt: String) -> Self {
        Self {
            events,
            sink,
            prompt,
            next_arrival: 0,
        }
    }

    /// Drain events until the device backend drops its sender.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.dispatch(event);
        }
    }

    /// Process one event: text messages are shown, everything else is
    /// ignored silently (a malformed event is not an error).
    pub fn dispatch(&mut self, event: RadioEvent) {
        if let Some(message) = self.accept(event) {
            self.sink.message(&message.display_line());
            self.sink.prompt(&self.prompt);
        }
    }

    /// Turn a qualifying event into an `IncomingMessage`, assigning the
    /// monotonic arrival order.
    pub fn accept(&mut self, event: RadioEvent) -> Option<IncomingMessage> {
        let decoded = event.decoded?;
        let text = decoded.text?;
        let sender = event
            .from_id
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        let arrival_order = self.next_arrival;
        self.next_arrival += 1;
        Some(IncomingMessage {
            sender,
            text,
            arrival_order,
        })
    }
}
