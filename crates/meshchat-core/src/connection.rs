//! Connection lifecycle for the single device link
//!
//! At most one live connection exists per process. State transitions are
//! monotonic; `Connected -> Closed` is terminal and `close` is idempotent,
//! so teardown can run unconditionally on every exit path and still touch
//! the device exactly once.

use std::time::Duration;

use tracing::{debug, info};

use crate::device::MeshDevice;
use crate::error::{ConnectionError, SendError};
use crate::types::OutgoingMessage;

/// State of the device connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Closed => "closed",
        }
    }
}

/// Exclusive owner of one mesh device handle.
pub struct Connection<D: MeshDevice> {
    device: D,
    state: ConnectionState,
}

impl<D: MeshDevice> Connection<D> {
    /// Take ownership of a freshly opened device and wait out the settle
    /// delay before reporting the link usable.
    ///
    /// Callers must not issue provisioning or send operations before this
    /// returns; the state only becomes `Connected` once the delay elapses.
    pub async fn establish(device: D, settle_delay: Duration) -> Result<Self, ConnectionError> {
        let mut conn = Self {
            device,
            state: ConnectionState::Connecting,
        };
        debug!(settle_ms = settle_delay.as_millis() as u64, "waiting for link to settle");
        tokio::time::sleep(settle_delay).await;
        conn.state = ConnectionState::Connected;
        Ok(conn)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Exclusive access to the device, for provisioning.
    pub(crate) fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Transmit one outbound message. Only valid while connected.
    pub async fn send(&mut self, message: &OutgoingMessage) -> Result<(), SendError> {
        if self.state != ConnectionState::Connected {
            return Err(SendError::ConnectionClosed);
        }
        self.device
            .send_text(&message.text, message.channel_index)
            .await
    }

    /// Release the device link.
    ///
    /// Idempotent: repeated calls, or a call on a connection that never
    /// fully opened, do nothing after the first.
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        if self.state == ConnectionState::Closed {
            return Ok(());
        }
        self.state = ConnectionState::Closed;
        info!("closing device connection");
        self.device.close().await
    }
}
