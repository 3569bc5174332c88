//! Mock mesh device
//!
//! Implements `MeshDevice` over in-memory state shared with a probe, so a
//! test can hand the device to a session and still inspect (or sabotage)
//! it afterwards. The radio ships with eight channel slots, like the real
//! hardware.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use meshchat_core::{ChannelSlot, ConfigurationError, ConnectionError, MeshDevice, SendError};

/// Number of channel slots on the mock radio.
const CHANNEL_SLOTS: u32 = 8;

#[derive(Debug, Default)]
struct MockState {
    channels: HashMap<u32, ChannelSlot>,
    staged: HashMap<u32, ChannelSlot>,
    written_channels: Vec<u32>,
    config_writes: usize,
    sent: Vec<(String, u32)>,
    close_count: usize,
    fail_channel_write: Option<String>,
    fail_send: Option<String>,
}

/// Deterministic in-memory `MeshDevice`.
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

/// Inspection and fault-injection handle for a [`MockDevice`].
#[derive(Clone)]
pub struct MockDeviceProbe {
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    /// A device with default (unconfigured) channel slots and its probe.
    pub fn new() -> (Self, MockDeviceProbe) {
        let mut channels = HashMap::new();
        for index in 0..CHANNEL_SLOTS {
            channels.insert(index, ChannelSlot::default());
        }
        let state = Arc::new(Mutex::new(MockState {
            channels,
            ..MockState::default()
        }));
        let probe = MockDeviceProbe {
            state: state.clone(),
        };
        (Self { state }, probe)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock device state poisoned")
    }
}

#[async_trait]
impl MeshDevice for MockDevice {
    fn channel(&self, index: u32) -> Result<ChannelSlot, ConfigurationError> {
        self.lock()
            .channels
            .get(&index)
            .cloned()
            .ok_or(ConfigurationError::NoSuchChannel { index })
    }

    fn stage_channel(&mut self, index: u32, slot: ChannelSlot) -> Result<(), ConfigurationError> {
        let mut state = self.lock();
        if !state.channels.contains_key(&index) {
            return Err(ConfigurationError::NoSuchChannel { index });
        }
        state.staged.insert(index, slot);
        Ok(())
    }

    async fn write_channel(&mut self, index: u32) -> Result<(), ConfigurationError> {
        let mut state = self.lock();
        if let Some(reason) = state.fail_channel_write.clone() {
            return Err(ConfigurationError::ChannelWrite { index, reason });
        }
        let staged = state
            .staged
            .remove(&index)
            .ok_or(ConfigurationError::NoSuchChannel { index })?;
        state.channels.insert(index, staged);
        state.written_channels.push(index);
        Ok(())
    }

    async fn write_config(&mut self) -> Result<(), ConfigurationError> {
        self.lock().config_writes += 1;
        Ok(())
    }

    async fn send_text(&mut self, text: &str, channel_index: u32) -> Result<(), SendError> {
        let mut state = self.lock();
        if let Some(reason) = state.fail_send.clone() {
            return Err(SendError::Transmit {
                channel_index,
                reason,
            });
        }
        state.sent.push((text.to_string(), channel_index));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        self.lock().close_count += 1;
        Ok(())
    }
}

impl MockDeviceProbe {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock device state poisoned")
    }

    /// Persisted state of one channel slot.
    pub fn channel(&self, index: u32) -> Option<ChannelSlot> {
        self.lock().channels.get(&index).cloned()
    }

    /// Indices persisted via `write_channel`, in call order.
    pub fn written_channels(&self) -> Vec<u32> {
        self.lock().written_channels.clone()
    }

    /// Number of `write_config` calls.
    pub fn config_writes(&self) -> usize {
        self.lock().config_writes
    }

    /// Messages transmitted via `send_text`, in call order.
    pub fn sent_messages(&self) -> Vec<(String, u32)> {
        self.lock().sent.clone()
    }

    /// Number of `close` calls that reached the device.
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    /// Make every subsequent `write_channel` fail with `reason`.
    pub fn fail_channel_writes(&self, reason: &str) {
        self.lock().fail_channel_write = Some(reason.to_string());
    }

    /// Make every subsequent `send_text` fail with `reason`.
    pub fn fail_sends(&self, reason: &str) {
        self.lock().fail_send = Some(reason.to_string());
    }
}
