//! Interactive chat session
//!
//! Orchestrates the whole lifecycle: settle the connection, provision the
//! secure channel (non-fatally), arm the receive dispatcher, then run the
//! foreground send loop until the input source ends or an interrupt
//! arrives. Teardown closes the connection exactly once on every path.
//!
//! Waiting for a line of input is the session's suspension point: the
//! blocking read runs off the scheduler's main execution path (the CLI
//! backend uses `spawn_blocking`), so the dispatcher keeps printing while
//! the user thinks.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{channel_prompt, ChannelRequest, SEND_PACING, SETTLE_DELAY};
use crate::connection::Connection;
use crate::device::{EventReceiver, MeshDevice};
use crate::dispatch::{MessageSink, ReceiveDispatcher};
use crate::error::ConnectionError;
use crate::provision::provision_channel;
use crate::types::OutgoingMessage;

// ----------------------------------------------------------------------------
// Input Source
// ----------------------------------------------------------------------------

/// One-line-at-a-time input for the send loop.
#[async_trait]
pub trait LineSource: Send {
    /// Display the prompt and yield the next input line, or `None` when the
    /// source is exhausted (end of input terminates the loop like an
    /// interrupt does).
    async fn read_line(&mut self, prompt: &str) -> Option<String>;
}

// ----------------------------------------------------------------------------
// Session Options
// ----------------------------------------------------------------------------

/// Tunables for one chat session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Channel slot to provision and chat on.
    pub channel: ChannelRequest,
    /// Input prompt; defaults to one derived from the channel index.
    pub prompt: Option<String>,
    /// Pause after connecting before the link is considered usable.
    pub settle_delay: Duration,
    /// Pause after each successful send, bounding the outbound rate.
    pub send_pacing: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            channel: ChannelRequest::default(),
            prompt: None,
            settle_delay: SETTLE_DELAY,
            send_pacing: SEND_PACING,
        }
    }
}

impl SessionOptions {
    /// The prompt this session will display.
    pub fn effective_prompt(&self) -> String {
        self.prompt
            .clone()
            .unwrap_or_else(|| channel_prompt(self.channel.index))
    }
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

/// Run one interactive chat session to completion.
///
/// `shutdown` is the external interrupt (the CLI passes `ctrl_c`); it
/// aborts a pending input wait immediately. Provisioning and send failures
/// are logged and do not end the session; the connection is closed exactly
/// once before this returns.
pub async fn run_session<D, S, I, F>(
    device: D,
    events: EventReceiver,
    sink: S,
    mut input: I,
    shutdown: F,
    options: SessionOptions,
) -> Result<(), ConnectionError>
where
    D: MeshDevice,
    S: MessageSink + 'static,
    I: LineSource,
    F: Future<Output = ()> + Send,
{
    let mut conn = Connection::establish(device, options.settle_delay).await?;
    let prompt = options.effective_prompt();

    // Arm the dispatcher before the send loop starts; it runs for the
    // lifetime of the connection and is torn down with it.
    let dispatcher = ReceiveDispatcher::new(events, sink, prompt.clone());
    let dispatcher_task = tokio::spawn(dispatcher.run());

    // A misconfigured channel degrades security but does not prevent chat;
    // only a broken transport is fatal.
    match options.channel.resolve() {
        Ok(config) => {
            if let Err(err) = provision_channel(&mut conn, &config).await {
                warn!(%err, "channel provisioning failed, continuing with existing channel state");
            }
        }
        Err(err) => {
            warn!(%err, "invalid channel configuration, continuing with existing channel state");
        }
    }

    tokio::pin!(shutdown);
    tokio::select! {
        _ = send_loop(&mut conn, &mut input, &prompt, &options) => {
            debug!("input source ended");
        }
        _ = &mut shutdown => {
            info!("interrupt received, shutting down");
        }
    }

    dispatcher_task.abort();
    if let Err(err) = conn.close().await {
        warn!(%err, "device reported an error while closing");
    }
    Ok(())
}

/// Foreground send loop: prompt, read one line, transmit if non-empty.
async fn send_loop<D: MeshDevice, I: LineSource>(
    conn: &mut Connection<D>,
    input: &mut I,
    prompt: &str,
    options: &SessionOptions,
) {
    while let Some(line) = input.read_line(prompt).await {
        // Empty lines are discarded before an OutgoingMessage exists.
        let Some(message) = OutgoingMessage::from_input(&line, options.channel.index) else {
            continue;
        };
        match conn.send(&message).await {
            Ok(()) => {
                debug!(channel = message.channel_index, "message sent");
                tokio::time::sleep(options.send_pacing).await;
            }
            Err(err) => warn!(%err, "send failed"),
        }
    }
}
